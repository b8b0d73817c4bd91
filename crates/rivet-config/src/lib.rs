//! Configuration tree and parameter store for the rivet service container.
//!
//! A [`ConfigTree`] is a plain JSON object with three well-known sections:
//! `parameters` for data, and `shared`/`multiple` for service definitions.
//! Partial trees are layered in with [`ConfigTree::merge`], and parameters
//! are addressed by dot-separated paths.
//!
//! ```
//! use rivet_config::ConfigTree;
//! use serde_json::json;
//!
//! let mut tree = ConfigTree::new();
//! tree.merge(json!({
//!     "parameters": { "db": { "dsn": "sqlite::memory:" } }
//! }))?;
//!
//! assert_eq!(tree.parameter("db.dsn"), Some(&json!("sqlite::memory:")));
//!
//! tree.set_parameter("db.pool.max", json!(8))?;
//! assert_eq!(tree.parameter("db.pool.max"), Some(&json!(8)));
//! # Ok::<(), rivet_config::ConfigError>(())
//! ```

pub mod error;
pub mod merge;
pub mod path;
pub mod tree;

pub use error::{ConfigError, Result};
pub use merge::deep_merge;
pub use tree::{value_kind, ConfigTree, MULTIPLE, PARAMETERS, SHARED};
