use std::collections::BTreeSet;
use std::fs;

use mustfn::config::Config;
use mustfn::registry;
use mustfn::report::Report;
use tempfile::TempDir;

const CHECK_FILE: &str = r#"
[logging]
level = "debug"

[[tree]]
path = ["interfaces", "dataplane/tagnode+dp0xe22", "speed+25g"]

[[tree]]
path = ["interfaces", "dataplane/tagnode+dp0xe23", "speed+auto"]

[[tree]]
path = ["interfaces", "dataplane/tagnode+dp0s1", "mtu+1500"]

[[tree]]
path = ["interfaces", "dataplane/tagnode+dp0s1", "oper-status+up"]
state = true

[[tree]]
path = ["interfaces", "switch/name+sw1"]

[[tree]]
path = ["interfaces", "bonding/tagnode+dp0bond1", "vif/tagnode+10", "vlan+100"]

[[tree]]
path = ["interfaces", "bonding/tagnode+dp0bond1", "vif/tagnode+20", "vlan+200"]

[[tree]]
path = ["feature", "intf-ref+sw1"]

[[tree]]
path = ["policy", "qos", "profile/name+prof1", "queue/id+1", "traffic-class+tc1"]

[[tree]]
path = ["policy", "qos", "profile/name+prof1", "map", "dscp-group/group-name+high", "to+4"]

[[tree]]
path = ["policy", "qos", "name/name+pol1", "shaper", "profile/name+profA", "queue/id+1", "traffic-class+tc1"]

[[tree]]
path = ["policy", "qos", "name/name+pol1", "shaper", "profile/name+profA", "map", "dscp-group/group-name+high", "to+4"]

[[check]]
name = "switch is an interface"
function = "is-interface-leafref"
node = "/feature/intf-ref"
expect = true

[[check]]
name = "switch is not layer 3"
function = "is-l3-interface-leafref"
node = "/feature/intf-ref"
expect = false

[[check]]
name = "switch excluded from original list"
function = "is-interface-leafref-original"
node = "/feature/intf-ref"
expect = false

[[check]]
name = "queue matches local profile"
function = "verify-queue-id-and-traffic-class"
node = "/policy/qos/profile/queue"
expect = true

[[check]]
name = "dscp group matches local profile"
function = "verify-dscp-group-to-queue-mappings"
node = "/policy/qos/profile/map/dscp-group"
expect = true

[[check]]
name = "peer speed auto"
function = "verify-siad-link-speed"
numbers = [20, 23]
node = "/interfaces/dataplane/speed"
expect = true

[[check]]
name = "bond vlans"
function = "validate-vif-vlan-settings"
node = "/interfaces/bonding"
expect = true

[[check]]
name = "vif vlan unique"
function = "check-vlan-values-do-not-conflict"
node = "/interfaces/bonding/vif"
expect = true

[[check]]
name = "vif explicit vlan"
function = "check-implicit-vlan-id-unique"
node = "/interfaces/bonding/vif"
expect = true

[[check]]
name = "bond name length"
function = "parent-interface-string-length"
node = "/interfaces/bonding/vif"
expect = 8
"#;

fn load(contents: &str) -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("checks.toml");
    fs::write(&path, contents).unwrap();
    let config = Config::from_file(&path).unwrap();
    (temp_dir, config)
}

#[test]
fn test_every_function_from_check_file() {
    let (_temp_dir, config) = load(CHECK_FILE);
    let tree = config.build_tree().unwrap();
    let report = Report::evaluate(&config.checks, &tree);

    let failed: Vec<&str> = report
        .outcomes
        .iter()
        .filter(|o| !o.passed)
        .map(|o| o.name.as_str())
        .collect();
    assert!(failed.is_empty(), "failed checks: {:?}", failed);

    let checked: BTreeSet<&str> = config.checks.iter().map(|c| c.function.as_str()).collect();
    let registered: BTreeSet<&str> = registry::functions().iter().map(|f| f.name).collect();
    assert_eq!(checked, registered);
}

#[test]
fn test_failing_check_is_reported() {
    let (_temp_dir, config) = load(
        r#"
[[tree]]
path = ["interfaces", "bonding/tagnode+dp0bond1", "vif/tagnode+44"]

[[tree]]
path = ["interfaces", "bonding/tagnode+dp0bond1", "vif/tagnode+55", "vlan+44"]

[[check]]
name = "implicit vlan clash"
function = "validate-vif-vlan-settings"
node = "/interfaces/bonding"
expect = true
"#,
    );
    let tree = config.build_tree().unwrap();
    let report = Report::evaluate(&config.checks, &tree);

    assert!(!report.passed());
    insta::assert_snapshot!(report.to_json().unwrap(), @r#"
    {
      "outcomes": [
        {
          "name": "implicit vlan clash",
          "function": "validate-vif-vlan-settings",
          "expected": true,
          "actual": false,
          "passed": false
        }
      ]
    }
    "#);
}
