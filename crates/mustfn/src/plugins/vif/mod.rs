//! VIF (sub-interface) functions.
//!
//! The VLAN checks replace two per-VIF must statements:
//!
//! ```text
//! not(vlan) or count(../vif[vlan = current()/vlan]) = 1
//!   or count(../vif[vlan = current()/vlan]/inner-vlan)
//!      = count(../vif[vlan = current()/vlan])
//!
//! vlan or inner-vlan or not(../vif[vlan = current()/tagnode])
//! ```
//!
//! Evaluated per VIF these walk every sibling several times. Here the
//! siblings are read once into a [`VifTable`] and each VIF is checked
//! against it.

use std::collections::BTreeMap;

use linkme::distributed_slice;
use mustfn_tree::query;
use mustfn_tree::ChildOrder;
use mustfn_tree::Filter;
use mustfn_tree::XpathNode;
use tracing::debug;

use crate::registry::CustomFunction;
use crate::registry::FUNCTIONS;
use crate::Datum;
use crate::DatumType;


static TAGNODE: Filter = Filter::config_only("tagnode");
static IFNAME: Filter = Filter::config_only("ifname");
static NAME: Filter = Filter::config_only("name");
static VIF: Filter = Filter::config_only("vif");
static VLAN: Filter = Filter::config_only("vlan");
static INNER_VLAN: Filter = Filter::config_only("inner-vlan");

#[distributed_slice(FUNCTIONS)]
static PARENT_INTERFACE_STRING_LENGTH: CustomFunction = CustomFunction {
    name: "parent-interface-string-length",
    args: &[DatumType::Nodeset],
    ret: DatumType::Number,
    default: Datum::Number(0.0),
    func: parent_interface_string_length,
};

#[distributed_slice(FUNCTIONS)]
static VALIDATE_VIF_VLAN_SETTINGS: CustomFunction = CustomFunction {
    name: "validate-vif-vlan-settings",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: validate_vif_vlan_settings,
};

#[distributed_slice(FUNCTIONS)]
static CHECK_VLAN_VALUES_DO_NOT_CONFLICT: CustomFunction = CustomFunction {
    name: "check-vlan-values-do-not-conflict",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: check_vlan_values_do_not_conflict,
};

#[distributed_slice(FUNCTIONS)]
static CHECK_IMPLICIT_VLAN_ID_UNIQUE: CustomFunction = CustomFunction {
    name: "check-implicit-vlan-id-unique",
    args: &[DatumType::Nodeset],
    ret: DatumType::Bool,
    default: Datum::Bool(false),
    func: check_implicit_vlan_id_unique,
};

/// `parent-interface-string-length(<nodeset>)`
///
/// Length of the name of the node's parent interface, whichever of `tagnode`,
/// `ifname` or `name` carries it; 0 if none does. Used as
/// `parent-interface-string-length(.) + string-length(tagnode) < 15`.
pub fn parent_interface_string_length(args: &[Datum]) -> Datum {
    let Some(src) = args.first().and_then(Datum::single_node) else {
        return Datum::Number(0.0);
    };
    let Some(parent) = src.parent() else {
        return Datum::Number(0.0);
    };

    let len = [&TAGNODE, &IFNAME, &NAME]
        .into_iter()
        .find_map(|filter| query::single_child_value(&*parent, filter))
        .map_or(0, |name| name.chars().count());
    Datum::Number(len as f64)
}

/// One VIF's VLAN settings. Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
struct VifRecord {
    id: String,
    vlan: String,
    inner_vlan: String,
}

impl VifRecord {
    fn read(vif: &dyn XpathNode) -> Self {
        let value = |filter: &Filter| query::single_child_value(vif, filter).unwrap_or_default();
        Self {
            id: value(&TAGNODE),
            vlan: value(&VLAN),
            inner_vlan: value(&INNER_VLAN),
        }
    }

    fn has_vlan(&self) -> bool {
        !self.vlan.is_empty()
    }

    fn has_inner_vlan(&self) -> bool {
        !self.inner_vlan.is_empty()
    }
}

/// VLAN settings of every VIF on one interface, keyed by VIF id.
///
/// Built fresh for each call. Checks only count over the table, so the
/// order VIFs were configured in never affects a verdict.
#[derive(Debug, Default)]
struct VifTable {
    vifs: BTreeMap<String, VifRecord>,
}

impl VifTable {
    fn read(intf: &dyn XpathNode) -> Self {
        let vifs = intf
            .children(&VIF, ChildOrder::AsConfigured)
            .iter()
            .map(|vif| {
                let record = VifRecord::read(&**vif);
                (record.id.clone(), record)
            })
            .collect();
        Self { vifs }
    }

    fn get(&self, id: &str) -> Option<&VifRecord> {
        self.vifs.get(id)
    }

    /// A VIF with an explicit VLAN may share it with other VIFs only if
    /// inner VLANs tell them apart: the number of VIFs with that VLAN must
    /// equal the number of VIFs with an inner VLAN.
    fn vlans_do_not_conflict(&self, vif: &VifRecord) -> bool {
        if !vif.has_vlan() {
            return true;
        }

        let sharing = self.vifs.values().filter(|v| v.vlan == vif.vlan).count();
        if sharing == 1 {
            return true;
        }
        let inner = self.vifs.values().filter(|v| v.has_inner_vlan()).count();
        sharing == inner
    }

    /// A VIF with neither VLAN nor inner VLAN uses its id as an implicit
    /// VLAN, which must not be any VIF's explicit VLAN.
    fn implicit_vlan_is_unique(&self, vif: &VifRecord) -> bool {
        if vif.has_vlan() || vif.has_inner_vlan() {
            return true;
        }
        !self
            .vifs
            .values()
            .any(|v| v.has_vlan() && v.vlan == vif.id)
    }
}

/// `validate-vif-vlan-settings(<nodeset>)`, applied to an interface.
///
/// True iff every VIF on the interface passes both VLAN checks.
pub fn validate_vif_vlan_settings(args: &[Datum]) -> Datum {
    let Some(intf) = args.first().and_then(Datum::single_node) else {
        debug!("validate-vif-vlan-settings needs exactly one node");
        return Datum::Bool(false);
    };

    let table = VifTable::read(&**intf);
    for vif in table.vifs.values() {
        if !table.vlans_do_not_conflict(vif) {
            debug!(interface = intf.value(), vif = %vif.id, vlan = %vif.vlan, "conflicting vlan");
            return Datum::Bool(false);
        }
        if !table.implicit_vlan_is_unique(vif) {
            debug!(
                interface = intf.value(),
                vif = %vif.id,
                "implicit vlan clashes with explicit vlan"
            );
            return Datum::Bool(false);
        }
    }
    Datum::Bool(true)
}

/// `check-vlan-values-do-not-conflict(<nodeset>)`, applied to one VIF.
pub fn check_vlan_values_do_not_conflict(args: &[Datum]) -> Datum {
    let Some(vif) = args.first().and_then(Datum::single_node) else {
        debug!("check-vlan-values-do-not-conflict needs exactly one node");
        return Datum::Bool(false);
    };

    // Skip reading the siblings when there is no VLAN to conflict
    if !VifRecord::read(&**vif).has_vlan() {
        return Datum::Bool(true);
    }

    Datum::Bool(check_against_siblings(&**vif, VifTable::vlans_do_not_conflict))
}

/// `check-implicit-vlan-id-unique(<nodeset>)`, applied to one VIF.
pub fn check_implicit_vlan_id_unique(args: &[Datum]) -> Datum {
    let Some(vif) = args.first().and_then(Datum::single_node) else {
        debug!("check-implicit-vlan-id-unique needs exactly one node");
        return Datum::Bool(false);
    };

    let record = VifRecord::read(&**vif);
    if record.has_vlan() || record.has_inner_vlan() {
        return Datum::Bool(true);
    }

    Datum::Bool(check_against_siblings(&**vif, VifTable::implicit_vlan_is_unique))
}

/// Run `check` for `vif` against a table of its parent's VIFs. Passes when
/// the VIF cannot be identified.
fn check_against_siblings(vif: &dyn XpathNode, check: fn(&VifTable, &VifRecord) -> bool) -> bool {
    let Some(intf) = vif.parent() else {
        return true;
    };
    let Some(id) = query::single_child_value(vif, &TAGNODE) else {
        return true;
    };

    let table = VifTable::read(&*intf);
    table.get(&id).is_none_or(|record| check(&table, record))
}
