//! Registration table for custom functions.
//!
//! Each plugin module adds its functions to [`FUNCTIONS`] with
//! `#[distributed_slice(FUNCTIONS)]`, so the host sees every function linked
//! into the binary without a central list.

use std::fmt;

use linkme::distributed_slice;
use tracing::warn;

use crate::Datum;
use crate::DatumType;

/// Signature of a custom function implementation.
pub type FunctionPtr = fn(&[Datum]) -> Datum;

/// A named custom function with its fixed signature.
pub struct CustomFunction {
    pub name: &'static str,
    pub args: &'static [DatumType],
    pub ret: DatumType,
    /// Returned by the host if the function cannot be invoked.
    pub default: Datum,
    pub func: FunctionPtr,
}

#[distributed_slice]
pub static FUNCTIONS: [CustomFunction];

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function}() takes {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{function}() argument {position} must be {expected}, got {actual}")]
    ArgType {
        function: &'static str,
        position: usize,
        expected: DatumType,
        actual: DatumType,
    },
}

impl CustomFunction {
    /// Check `args` against this function's signature.
    pub fn check_args(&self, args: &[Datum]) -> Result<(), CallError> {
        if args.len() != self.args.len() {
            return Err(CallError::Arity {
                function: self.name,
                expected: self.args.len(),
                actual: args.len(),
            });
        }

        for (i, (arg, expected)) in args.iter().zip(self.args).enumerate() {
            if arg.datum_type() != *expected {
                return Err(CallError::ArgType {
                    function: self.name,
                    position: i + 1,
                    expected: *expected,
                    actual: arg.datum_type(),
                });
            }
        }

        Ok(())
    }

    /// Type-check and invoke.
    pub fn call(&self, args: &[Datum]) -> Result<Datum, CallError> {
        self.check_args(args)?;
        Ok((self.func)(args))
    }

    /// Invoke, falling back to the default return value when the arguments
    /// do not fit the signature.
    pub fn call_or_default(&self, args: &[Datum]) -> Datum {
        match self.call(args) {
            Ok(datum) => datum,
            Err(e) => {
                warn!("{}; returning default {}", e, self.default);
                self.default.clone()
            }
        }
    }
}

impl fmt::Debug for CustomFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFunction")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("ret", &self.ret)
            .field("default", &self.default)
            .finish()
    }
}

/// Renders the signature, e.g. `verify-siad-link-speed(number, number, nodeset) -> bool`.
impl fmt::Display for CustomFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// Every registered function, sorted by name.
pub fn functions() -> Vec<&'static CustomFunction> {
    let mut functions: Vec<&'static CustomFunction> = FUNCTIONS.iter().collect();
    functions.sort_by_key(|f| f.name);
    functions
}

pub fn lookup(name: &str) -> Option<&'static CustomFunction> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// Look up `name` and invoke it with type-checked arguments.
pub fn call(name: &str, args: &[Datum]) -> Result<Datum, CallError> {
    lookup(name)
        .ok_or_else(|| CallError::UnknownFunction(name.to_string()))?
        .call(args)
}

/// Look up `name` and invoke it, using its default if `args` do not fit.
pub fn call_or_default(name: &str, args: &[Datum]) -> Result<Datum, CallError> {
    lookup(name)
        .map(|f| f.call_or_default(args))
        .ok_or_else(|| CallError::UnknownFunction(name.to_string()))
}
