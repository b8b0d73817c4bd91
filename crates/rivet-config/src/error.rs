//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration error variants
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter path tried to descend through a value that is not a
    /// mapping. The final segment of a path may overwrite anything, but
    /// every intermediate segment must name a mapping.
    #[error("scalar at {segment:?} in the path {path:?}")]
    ScalarInPath {
        /// Segment that held the non-mapping value
        segment: String,
        /// Full dot-separated path that was being set
        path: String,
    },

    /// Configuration handed to the tree was not a JSON object.
    #[error("configuration must be an object, got {kind}")]
    NotAnObject {
        /// JSON kind of the rejected value
        kind: &'static str,
    },
}
