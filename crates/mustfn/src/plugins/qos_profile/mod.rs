//! QoS profile cross-consistency functions.
//!
//! Both functions replace `must` statements of the form
//!
//! ```text
//! count(name/shaper/profile/X) + count(profile/X)
//!   = count(name/shaper/profile/X/Y[a = current()/a and b = current()/b])
//!   + count(profile/X/Y[a = current()/a and b = current()/b])
//! ```
//!
//! evaluated relative to `/policy/qos`. Every local profile (under a named
//! policy's shaper) and every global profile must carry exactly one entry
//! matching the current node's key fields; a profile with none, or with more
//! than one, breaks the equality.

use linkme::distributed_slice;
use mustfn_tree::query;
use mustfn_tree::query::RequiredValues;
use mustfn_tree::Filter;
use mustfn_tree::Node;
use tracing::debug;
use tracing::trace;

use crate::registry::CustomFunction;
use crate::registry::FUNCTIONS;
use crate::Datum;
use crate::DatumType;


const POLICY: Filter = Filter::config_only("policy");
const QOS: Filter = Filter::config_only("qos");
const INGRESS_MAP: Filter = Filter::config_only("ingress-map");
const NAME: Filter = Filter::config_only("name");
const SHAPER: Filter = Filter::config_only("shaper");
const PROFILE: Filter = Filter::config_only("profile");
const MAP: Filter = Filter::config_only("map");
const QUEUE: Filter = Filter::config_only("queue");
const DSCP_GROUP: Filter = Filter::config_only("dscp-group");
const ID: Filter = Filter::config_only("id");
const TRAFFIC_CLASS: Filter = Filter::config_only("traffic-class");
const GROUP_NAME: Filter = Filter::config_only("group-name");
const TO: Filter = Filter::config_only("to");

#[distributed_slice(FUNCTIONS)]
static VERIFY_QUEUE_ID_AND_TRAFFIC_CLASS: CustomFunction = CustomFunction {
    name: "verify-queue-id-and-traffic-class",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: verify_queue_id_and_traffic_class,
};

#[distributed_slice(FUNCTIONS)]
static VERIFY_DSCP_GROUP_TO_QUEUE_MAPPINGS: CustomFunction = CustomFunction {
    name: "verify-dscp-group-to-queue-mappings",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: verify_dscp_group_to_queue_mappings,
};

/// Which profile entries to reconcile, and the key fields that must match.
struct Consistency {
    function: &'static str,
    /// Local profile containers, relative to `/policy/qos`.
    local: &'static [Filter],
    /// Global profile containers, relative to `/policy/qos`.
    global: &'static [Filter],
    /// Entries counted under each container.
    entry: Filter,
    /// Key fields copied from the current node.
    keys: [Filter; 2],
}

static QUEUE_CONSISTENCY: Consistency = Consistency {
    function: "verify-queue-id-and-traffic-class",
    local: &[NAME, SHAPER, PROFILE],
    global: &[PROFILE],
    entry: QUEUE,
    keys: [ID, TRAFFIC_CLASS],
};

static DSCP_CONSISTENCY: Consistency = Consistency {
    function: "verify-dscp-group-to-queue-mappings",
    local: &[NAME, SHAPER, PROFILE, MAP],
    global: &[PROFILE, MAP],
    entry: DSCP_GROUP,
    keys: [GROUP_NAME, TO],
};

/// `verify-queue-id-and-traffic-class(<nodeset>)`, applied to a queue.
///
/// Always true once any `/policy/ingress-map` exists: ingress maps replace
/// queue/traffic-class classification.
pub fn verify_queue_id_and_traffic_class(args: &[Datum]) -> Datum {
    let Some(src) = args.first().and_then(Datum::single_node) else {
        debug!("verify-queue-id-and-traffic-class needs exactly one node");
        return Datum::Bool(false);
    };

    let ingress_maps = query::descendants(&src.root(), &[POLICY, INGRESS_MAP]);
    if !ingress_maps.is_empty() {
        trace!("ingress-map configured, queue check bypassed");
        return Datum::Bool(true);
    }

    Datum::Bool(QUEUE_CONSISTENCY.holds_for(src))
}

/// `verify-dscp-group-to-queue-mappings(<nodeset>)`, applied to a
/// dscp-group entry of a profile map.
pub fn verify_dscp_group_to_queue_mappings(args: &[Datum]) -> Datum {
    let Some(src) = args.first().and_then(Datum::single_node) else {
        debug!("verify-dscp-group-to-queue-mappings needs exactly one node");
        return Datum::Bool(false);
    };

    Datum::Bool(DSCP_CONSISTENCY.holds_for(src))
}

impl Consistency {
    fn holds_for(&self, src: &Node) -> bool {
        let mut required = RequiredValues::new();
        for key in &self.keys {
            let Some(value) = query::single_child_value(&**src, key) else {
                debug!(function = self.function, field = %key, "no unique key field");
                return false;
            };
            required = required.with(key.clone(), value);
        }

        let qos_nodes = query::descendants(&src.root(), &[POLICY, QOS]);
        let [qos] = qos_nodes.as_slice() else {
            debug!(
                function = self.function,
                matches = qos_nodes.len(),
                "no unique /policy/qos container"
            );
            return false;
        };

        let (local_profiles, local_matches) = self.count(qos, self.local, &required);
        let (global_profiles, global_matches) = self.count(qos, self.global, &required);

        let consistent = local_profiles + global_profiles == local_matches + global_matches;
        if !consistent {
            debug!(
                function = self.function,
                local_profiles,
                global_profiles,
                local_matches,
                global_matches,
                "profiles do not all carry exactly one matching entry"
            );
        }
        consistent
    }

    /// Number of containers under `path`, and number of their entries that
    /// match `required`.
    fn count(&self, qos: &Node, path: &[Filter], required: &RequiredValues) -> (usize, usize) {
        let containers = query::descendants(qos, path);
        let entries = query::resolve_descendants(&containers, std::slice::from_ref(&self.entry));
        (containers.len(), query::count_matching(&entries, required))
    }
}
