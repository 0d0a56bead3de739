//! Check file parsing and structures.
//!
//! A check file is TOML describing a configuration tree and a list of
//! function calls to evaluate against it, each with the expected result.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use mustfn_tree::PathError;
use mustfn_tree::Tree;
use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

/// Top-level check file structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Paths making up the configuration tree, in configured order.
    #[serde(default, rename = "tree")]
    pub tree: Vec<TreePath>,

    #[serde(default, rename = "check")]
    pub checks: Vec<CheckConfig>,
}

#[derive(
    Debug,
    Default,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,
}

/// One path into the configuration tree, in fixture notation
/// (`name`, `list/key+value`, `leaf+value`, `leaf@value`, `leaf%`).
#[derive(Debug, Deserialize)]
pub struct TreePath {
    pub path: Vec<String>,

    /// Marks the final node as operational state rather than configuration.
    #[serde(default)]
    pub state: bool,
}

/// A single function call and its expected result.
#[derive(Debug, Deserialize)]
pub struct CheckConfig {
    pub name: String,

    /// Registered function name, e.g. "is-interface-leafref"
    pub function: String,

    /// Leading number arguments, passed before the node argument.
    #[serde(default)]
    pub numbers: Vec<f64>,

    /// Path of the context node. The first node found on this path is
    /// passed as the final nodeset argument; no match passes an empty
    /// nodeset.
    #[serde(default)]
    pub node: Option<String>,

    pub expect: Scalar,
}

/// A non-nodeset function result.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Config {
    /// Load a check file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        contents.parse()
    }

    /// Build the configuration tree from the `[[tree]]` paths.
    pub fn build_tree(&self) -> Result<Tree, ConfigError> {
        let mut builder = Tree::builder();
        for (index, entry) in self.tree.iter().enumerate() {
            let added = if entry.state {
                builder.state_path(&entry.path[..])
            } else {
                builder.path(&entry.path[..])
            };
            added.map_err(|source| ConfigError::Path { index, source })?;
        }
        Ok(builder.build())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read check file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid tree path #{index}: {source}")]
    Path {
        index: usize,
        #[source]
        source: PathError,
    },
}
