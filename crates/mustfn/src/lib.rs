//! Custom XPath functions for YANG `must` constraints.
//!
//! Each function replaces a `must` expression that is too slow, or too hard
//! to express, in plain XPath. Functions are published in
//! [`registry::FUNCTIONS`] with a fixed signature and a default return value
//! that the host evaluator uses when a call cannot be made.

pub mod config;
pub mod datum;
pub mod plugins;
pub mod registry;
pub mod report;

pub use datum::Datum;
pub use datum::DatumType;
pub use registry::CallError;
pub use registry::CustomFunction;
