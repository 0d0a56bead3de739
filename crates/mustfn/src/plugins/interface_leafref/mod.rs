//! Interface reference functions.
//!
//! Replace the `must` statements that check an interface-name leaf refers to
//! a configured interface, or to a VIF of one. A reference is `base` or
//! `base.vif-id`.
//!
//! Interface names are assumed unique across all interface types: the scan
//! settles on the first interface whose name matches.

use linkme::distributed_slice;
use mustfn_tree::query;
use mustfn_tree::ChildOrder;
use mustfn_tree::Filter;
use tracing::debug;
use tracing::trace;

use crate::registry::CustomFunction;
use crate::registry::FUNCTIONS;
use crate::Datum;
use crate::DatumType;


static INTERFACES: Filter = Filter::config_only("interfaces");
static INTERFACE_TYPES: Filter = Filter::any();
static VIF: Filter = Filter::config_only("vif");

/// Layer 2 interface types that `is-l3-interface-leafref` rejects.
const L3_EXCLUDED: &[&str] = &["switch", "backplane"];

/// Types excluded by the original `interface leafref` must statement.
const ORIGINAL_EXCLUDED: &[&str] = &["switch", "vhost", "backplane"];

#[distributed_slice(FUNCTIONS)]
static IS_INTERFACE_LEAFREF: CustomFunction = CustomFunction {
    name: "is-interface-leafref",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: is_interface_leafref,
};

#[distributed_slice(FUNCTIONS)]
static IS_L3_INTERFACE_LEAFREF: CustomFunction = CustomFunction {
    name: "is-l3-interface-leafref",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: is_l3_interface_leafref,
};

#[distributed_slice(FUNCTIONS)]
static IS_INTERFACE_LEAFREF_ORIGINAL: CustomFunction = CustomFunction {
    name: "is-interface-leafref-original",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: is_interface_leafref_original,
};

/// `is-interface-leafref(<nodeset>)`: any interface, including VIFs.
pub fn is_interface_leafref(args: &[Datum]) -> Datum {
    Datum::Bool(references_interface(args, &[]))
}

/// `is-l3-interface-leafref(<nodeset>)`: any VIF, and any base interface
/// except switch and backplane. Unlike the original must statement this
/// accepts vhost interfaces.
pub fn is_l3_interface_leafref(args: &[Datum]) -> Datum {
    Datum::Bool(references_interface(args, L3_EXCLUDED))
}

/// `is-interface-leafref-original(<nodeset>)`: any VIF, and any base
/// interface except switch, vhost and backplane.
pub fn is_interface_leafref_original(args: &[Datum]) -> Datum {
    Datum::Bool(references_interface(args, ORIGINAL_EXCLUDED))
}

/// Parsed interface reference.
#[derive(Debug, PartialEq, Eq)]
struct InterfaceRef<'a> {
    base: &'a str,
    vif: Option<&'a str>,
}

impl<'a> InterfaceRef<'a> {
    fn parse(reference: &'a str) -> Self {
        match reference.split_once('.') {
            Some((base, vif)) => Self {
                base,
                vif: Some(vif),
            },
            None => Self {
                base: reference,
                vif: None,
            },
        }
    }
}

fn references_interface(args: &[Datum], excluded: &[&str]) -> bool {
    let Some(src) = args.first().and_then(Datum::single_node) else {
        debug!("interface reference check needs exactly one node");
        return false;
    };
    let reference = InterfaceRef::parse(src.value());

    let Some(interfaces) = query::single_child(&*src.root(), &INTERFACES) else {
        debug!("no unique interfaces container");
        return false;
    };

    // One flat list of every interface list entry, whatever its type; each
    // entry's value is its name.
    for intf in interfaces.children(&INTERFACE_TYPES, ChildOrder::Sorted) {
        if intf.value() != reference.base {
            continue;
        }

        let Some(vif_id) = reference.vif else {
            if excluded.contains(&intf.name()) {
                // VIFs on an excluded type are still accepted
                trace!(
                    interface = reference.base,
                    kind = intf.name(),
                    "skipping excluded interface type"
                );
                continue;
            }
            return true;
        };

        let found = intf
            .children(&VIF, ChildOrder::Sorted)
            .iter()
            .any(|vif| vif.value() == vif_id);
        if !found {
            debug!(interface = reference.base, vif = vif_id, "no such vif");
        }
        return found;
    }

    debug!(interface = reference.base, "no such interface");
    false
}
