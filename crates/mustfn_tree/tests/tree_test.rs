use mustfn_tree::query;
use mustfn_tree::ChildOrder;
use mustfn_tree::Filter;
use mustfn_tree::Node;
use mustfn_tree::PathError;
use mustfn_tree::RequiredValues;
use mustfn_tree::Scope;
use mustfn_tree::Tree;

/// Render a subtree as indented `name [value]` lines in sorted order.
fn render(node: &Node, depth: usize, out: &mut String) {
    for child in node.children(&Filter::any().with_scope(Scope::All), ChildOrder::Sorted) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(child.name());
        if !child.value().is_empty() {
            out.push_str(&format!(" [{}]", child.value()));
        }
        out.push('\n');
        render(&child, depth + 1, out);
    }
}

fn dump(tree: &Tree) -> String {
    let mut out = String::new();
    render(&tree.root(), 0, &mut out);
    out
}

#[test]
fn test_paths_merge_on_shared_prefix() {
    let paths: &[&[&str]] = &[
        &["interfaces", "dataplane/tagnode+dp0s1", "vif/tagnode+10", "vlan+100"],
        &["interfaces", "dataplane/tagnode+dp0s1", "vif/tagnode+20"],
        &["interfaces", "dataplane/tagnode+dp0s1", "disable%"],
        &["interfaces", "switch/name+sw1"],
    ];
    let tree = Tree::from_paths(paths).unwrap();

    insta::assert_snapshot!(dump(&tree), @r"
    interfaces
      dataplane [dp0s1]
        disable
        tagnode [dp0s1]
        vif [10]
          tagnode [10]
          vlan [100]
        vif [20]
          tagnode [20]
      switch [sw1]
        name [sw1]
    ");
}

#[test]
fn test_leaf_list_entries_are_siblings() {
    let paths: &[&[&str]] = &[
        &["interfaces", "dataplane/tagnode+dp0s2", "address@2222"],
        &["interfaces", "dataplane/tagnode+dp0s2", "address@2223"],
    ];
    let tree = Tree::from_paths(paths).unwrap();
    let addresses = tree.find_all("/interfaces/dataplane/address");
    let values: Vec<&str> = addresses.iter().map(|n| n.value()).collect();
    assert_eq!(values, vec!["2222", "2223"]);
}

#[test]
fn test_parent_and_root() {
    let paths: &[&[&str]] = &[&["interfaces", "dataplane/tagnode+dp0xe20", "speed+10g"]];
    let tree = Tree::from_paths(paths).unwrap();

    let speed = tree.find_first("/interfaces/dataplane/speed").unwrap();
    let dataplane = speed.parent().unwrap();
    assert_eq!(dataplane.name(), "dataplane");
    assert_eq!(dataplane.value(), "dp0xe20");

    let root = speed.root();
    assert!(root.parent().is_none());
    assert_eq!(root.children(&Filter::config_only("interfaces"), ChildOrder::Sorted).len(), 1);
}

#[test]
fn test_config_filters_skip_state_nodes() {
    let mut builder = Tree::builder();
    builder
        .path(&["interfaces", "dataplane/tagnode+dp0s1", "speed+auto"])
        .unwrap()
        .state_path(&["interfaces", "dataplane/tagnode+dp0s1", "oper-status+up"])
        .unwrap();
    let tree = builder.build();

    let dataplane = tree.find_first("/interfaces/dataplane").unwrap();
    let config = dataplane.children(&Filter::any(), ChildOrder::AsConfigured);
    let names: Vec<&str> = config.iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["tagnode", "speed"]);

    let all = dataplane.children(&Filter::any().with_scope(Scope::All), ChildOrder::AsConfigured);
    assert_eq!(all.len(), 3);

    assert!(query::single_child(&*dataplane, &Filter::config_only("oper-status")).is_none());
}

#[test]
fn test_sorted_children() {
    let paths: &[&[&str]] = &[
        &["interfaces", "vhost/name+vhost3"],
        &["interfaces", "dataplane/tagnode+dp0s2"],
        &["interfaces", "dataplane/tagnode+dp0s1"],
    ];
    let tree = Tree::from_paths(paths).unwrap();
    let interfaces = tree.find_first("/interfaces").unwrap();

    let configured: Vec<String> = interfaces
        .children(&Filter::any(), ChildOrder::AsConfigured)
        .iter()
        .map(|n| n.value().to_string())
        .collect();
    assert_eq!(configured, vec!["vhost3", "dp0s2", "dp0s1"]);

    let sorted: Vec<String> = interfaces
        .children(&Filter::any(), ChildOrder::Sorted)
        .iter()
        .map(|n| n.value().to_string())
        .collect();
    assert_eq!(sorted, vec!["dp0s1", "dp0s2", "vhost3"]);
}

#[test]
fn test_empty_tree() {
    let empty = Tree::builder().build();
    assert!(empty.is_empty());
    assert_eq!(empty.len(), 1);

    let tree = Tree::from_paths(&[["interfaces", "dataplane/tagnode+dp0s1"]]).unwrap();
    assert!(!tree.is_empty());
    // root, interfaces, dataplane and its tagnode key leaf
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_find_first_missing() {
    let paths: &[&[&str]] = &[&["policy", "qos"]];
    let tree = Tree::from_paths(paths).unwrap();
    assert!(tree.find_first("/policy/ingress-map").is_none());
    assert_eq!(tree.find_first("/").unwrap().name(), "");
}

#[test]
fn test_bad_path_element() {
    let paths: &[&[&str]] = &[&["interfaces", "dataplane/tagnode"]];
    let err = Tree::from_paths(paths).unwrap_err();
    assert_eq!(err, PathError::MissingKeyValue("dataplane/tagnode".into()));
    assert_eq!(
        err.to_string(),
        "list entry 'dataplane/tagnode' must be written as list/key+value"
    );
}

#[test]
fn test_count_matching_is_order_independent() {
    let paths: Vec<Vec<&str>> = vec![
        vec!["policy", "qos", "profile/name+p1", "queue/id+1", "traffic-class+tc1"],
        vec!["policy", "qos", "profile/name+p2", "queue/id+1", "traffic-class+tc1"],
        vec!["policy", "qos", "profile/name+p3", "queue/id+1", "traffic-class+tc2"],
        vec!["policy", "qos", "profile/name+p4", "queue/id+2", "traffic-class+tc1"],
    ];
    let required = RequiredValues::new()
        .with(Filter::config_only("id"), "1")
        .with(Filter::config_only("traffic-class"), "tc1");
    let path = [
        Filter::config_only("policy"),
        Filter::config_only("qos"),
        Filter::config_only("profile"),
        Filter::config_only("queue"),
    ];

    for rotation in 0..paths.len() {
        let mut shuffled = paths.clone();
        shuffled.rotate_left(rotation);
        for reversed in [false, true] {
            if reversed {
                shuffled.reverse();
            }
            let tree = Tree::from_paths(&shuffled[..]).unwrap();
            let queues = query::descendants(&tree.root(), &path);
            assert_eq!(queues.len(), 4);
            assert_eq!(query::count_matching(&queues, &required), 2);
        }
    }
}
