//! Evaluation of check files.

use std::fmt::Write;

use mustfn_tree::Tree;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::config::CheckConfig;
use crate::config::Scalar;
use crate::registry;
use crate::Datum;

/// Result of evaluating one check.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub name: String,
    pub function: String,
    pub expected: Scalar,
    /// None if the function is unknown or returned a nodeset.
    pub actual: Option<Scalar>,
    /// Why the call could not be made as written, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub passed: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

/// Arguments for `check` against `tree`: its numbers in order, then the
/// context node if it names one.
pub fn check_args(check: &CheckConfig, tree: &Tree) -> Vec<Datum> {
    let mut args: Vec<Datum> = check.numbers.iter().copied().map(Datum::Number).collect();
    if let Some(path) = &check.node {
        let nodes = tree.find_first(path).into_iter().collect();
        args.push(Datum::Nodeset(nodes));
    }
    args
}

fn to_scalar(datum: &Datum) -> Option<Scalar> {
    match datum {
        Datum::Bool(b) => Some(Scalar::Bool(*b)),
        Datum::Number(n) => Some(Scalar::Number(*n)),
        Datum::Nodeset(_) => None,
    }
}

pub fn evaluate_check(check: &CheckConfig, tree: &Tree) -> Outcome {
    let Some(function) = registry::lookup(&check.function) else {
        warn!(check = %check.name, function = %check.function, "unknown function");
        return Outcome {
            name: check.name.clone(),
            function: check.function.clone(),
            expected: check.expect,
            actual: None,
            error: Some(format!("unknown function '{}'", check.function)),
            passed: false,
        };
    };

    let args = check_args(check, tree);
    let error = function.check_args(&args).err().map(|e| e.to_string());
    let actual = to_scalar(&function.call_or_default(&args));
    let passed = actual == Some(check.expect);
    debug!(check = %check.name, ?actual, passed, "evaluated");

    Outcome {
        name: check.name.clone(),
        function: check.function.clone(),
        expected: check.expect,
        actual,
        error,
        passed,
    }
}

impl Report {
    /// Evaluate every check in order.
    pub fn evaluate(checks: &[CheckConfig], tree: &Tree) -> Self {
        let outcomes = checks
            .iter()
            .map(|check| evaluate_check(check, tree))
            .collect();
        Self { outcomes }
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// One line per check followed by a summary line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let status = if outcome.passed { "PASS" } else { "FAIL" };
            let actual = outcome
                .actual
                .map_or_else(|| "-".to_string(), |a| a.to_string());
            let _ = write!(
                out,
                "{status} {}: {} = {actual}",
                outcome.name, outcome.function
            );
            if !outcome.passed {
                let _ = write!(out, " (expected {})", outcome.expected);
            }
            if let Some(error) = &outcome.error {
                let _ = write!(out, " [{error}]");
            }
            out.push('\n');
        }

        let _ = writeln!(
            out,
            "{} passed, {} failed",
            self.outcomes.len() - self.failures(),
            self.failures()
        );
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
