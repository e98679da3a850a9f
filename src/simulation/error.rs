//! Configuration errors.
//!
//! The simulation has no fatal runtime errors: stale references are recovered
//! in place and population caps are plain backpressure. Everything that can
//! fail does so while building a [`super::game::Game`] from its parameters.

use thiserror::Error;

/// Errors raised while loading or validating simulation parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A string key does not name any entry of an enumerated kind table.
    #[error("unknown {category} kind `{key}`")]
    UnknownKind {
        /// Table the key was looked up in (`cell`, `nutrient`, `agent`, ...).
        category: &'static str,
        /// The offending key.
        key: String,
    },
    /// A kind table has no configuration record for one of its variants.
    #[error("no configuration for {category} kind `{key}`")]
    MissingKind {
        /// Table that is missing the entry.
        category: &'static str,
        /// Variant without a record.
        key: String,
    },
    /// A numeric parameter is outside its valid range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// The configuration file is not valid JSON for [`super::params::Params`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration file could not be read or written.
    #[error("configuration i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
