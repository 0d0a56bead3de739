//! Custom function families.
//!
//! Every module registers its functions in [`crate::registry::FUNCTIONS`].
//! Functions never fail: malformed calls and ambiguous configuration resolve
//! to the family's safe default.

pub mod interface_leafref;
pub mod link_speed;
pub mod qos_profile;
pub mod vif;
