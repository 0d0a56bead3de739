//! SIAD link speed function.
//!
//! Ports in a block of `dp0xe<N>` interfaces share a clock: once one enabled
//! port in the block runs at a fixed speed, every other enabled port in the
//! block must run at that speed or autonegotiate.
//!
//! This function only fails when it is certain the configuration is wrong.
//! Missing or ambiguous data, or anything outside the block, passes.

use linkme::distributed_slice;
use mustfn_tree::query;
use mustfn_tree::ChildOrder;
use mustfn_tree::Filter;
use mustfn_tree::XpathNode;
use tracing::debug;
use tracing::trace;

use crate::registry::CustomFunction;
use crate::registry::FUNCTIONS;
use crate::Datum;
use crate::DatumType;


/// Interface name prefix for the ports this rule covers.
const DP0XE_PREFIX: &str = "dp0xe";

const AUTO: &str = "auto";
const FIXED_SPEEDS: &[&str] = &["10g", "25g"];

static INTERFACES: Filter = Filter::config_only("interfaces");
static DATAPLANE: Filter = Filter::config_only("dataplane");
static TAGNODE: Filter = Filter::config_only("tagnode");
static DISABLE: Filter = Filter::config_only("disable");
static SPEED: Filter = Filter::config_only("speed");

#[distributed_slice(FUNCTIONS)]
static VERIFY_SIAD_LINK_SPEED: CustomFunction = CustomFunction {
    name: "verify-siad-link-speed",
    args: &[DatumType::Number, DatumType::Number, DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: verify_siad_link_speed,
};

/// Index of a `dp0xe<N>` dataplane interface, read from its `tagnode`.
/// `None` for any other interface.
fn dp0xe_index(intf: &dyn XpathNode) -> Option<i64> {
    let name = query::single_child_value(intf, &TAGNODE)?;
    let suffix = name.strip_prefix(DP0XE_PREFIX)?;
    suffix.parse().ok()
}

fn is_disabled(intf: &dyn XpathNode) -> bool {
    query::single_child(intf, &DISABLE).is_some()
}

/// `verify-siad-link-speed(start, end, <nodeset>)`, applied to the `speed`
/// leaf of a dataplane interface. `start` and `end` bound the block of
/// `dp0xe` ports inclusively.
pub fn verify_siad_link_speed(args: &[Datum]) -> Datum {
    let (Some(start), Some(end)) = (
        args.first().and_then(Datum::as_number),
        args.get(1).and_then(Datum::as_number),
    ) else {
        debug!("verify-siad-link-speed needs a start and end index");
        return Datum::Bool(false);
    };
    // XPath numbers truncate to interface indices
    let (start, end) = (start as i64, end as i64);

    // A single port cannot disagree with itself
    if end <= start {
        return Datum::Bool(true);
    }

    let Some(speed_node) = args.get(2).and_then(Datum::single_node) else {
        debug!("verify-siad-link-speed needs exactly one node");
        return Datum::Bool(false);
    };

    Datum::Bool(speed_is_consistent(start, end, &**speed_node))
}

fn speed_is_consistent(start: i64, end: i64, speed_node: &dyn XpathNode) -> bool {
    let in_block = |index: i64| (start..=end).contains(&index);

    let Some(intf) = speed_node.parent() else {
        return true;
    };
    let Some(index) = dp0xe_index(&*intf).filter(|&i| in_block(i)) else {
        return true;
    };
    if is_disabled(&*intf) {
        return true;
    }

    let speed = speed_node.value();
    if speed == AUTO {
        return true;
    }
    if !FIXED_SPEEDS.contains(&speed) {
        debug!(interface = index, speed, "unsupported fixed speed in block");
        return false;
    }

    let Some(interfaces) = query::single_child(&*speed_node.root(), &INTERFACES) else {
        return true;
    };

    for peer in interfaces.children(&DATAPLANE, ChildOrder::Sorted) {
        let Some(peer_index) = dp0xe_index(&*peer) else {
            continue;
        };
        if peer_index == index || !in_block(peer_index) {
            continue;
        }

        // One disabled peer exempts the whole block for this evaluation
        if is_disabled(&*peer) {
            trace!(peer = peer_index, "disabled peer in block");
            return true;
        }
        let Some(peer_speed) = query::single_child_value(&*peer, &SPEED) else {
            return true;
        };
        if peer_speed != AUTO && peer_speed != speed {
            debug!(
                interface = index,
                speed,
                peer = peer_index,
                peer_speed = peer_speed.as_str(),
                "speed mismatch in block"
            );
            return false;
        }
    }

    true
}
