//! Configuration-driven service container.
//!
//! Services are described as data: a configuration tree maps service ids
//! to `[ctor-spec, arg, ...]` definitions, split into a `shared` section
//! (built once, cached) and a `multiple` section (rebuilt per request).
//! Argument strings carry their meaning in their shape. Exactly `%path%`
//! pulls the raw parameter at that dot-separated path; text with embedded
//! `%path%` occurrences interpolates them; `@id` pulls another service.
//! Nothing is built until it is first asked for.
//!
//! Constructor specs are names, connected to code through a
//! [`ConstructorRegistry`], either by registering closures on a
//! [`ContainerBuilder`] or by letting crates submit
//! [`ConstructorProvider`]s that are collected at link time.
//!
//! ```
//! use rivet_di::Container;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Logger {
//!     level: String,
//! }
//!
//! struct Repo {
//!     logger: Arc<Logger>,
//! }
//!
//! let container = Container::builder()
//!     .config(json!({
//!         "parameters": { "log": { "level": "debug" } },
//!         "shared": {
//!             "logger": ["app.logger", "%log.level%"],
//!             "repo": ["app.repo", "@logger"]
//!         }
//!     }))?
//!     .constructor::<Logger, _>("app.logger", |args| {
//!         Ok(Logger {
//!             level: args[0].as_str().unwrap_or("info").to_string(),
//!         })
//!     })
//!     .constructor::<Repo, _>("app.repo", |args| {
//!         let logger = args[0]
//!             .service_as::<Logger>()
//!             .ok_or("repo needs a logger")?;
//!         Ok(Repo { logger })
//!     })
//!     .build();
//!
//! let repo = container.get_as::<Repo>("repo")?;
//! assert_eq!(repo.logger.level, "debug");
//!
//! // "logger" is shared: the repo's logger is the cached instance.
//! let logger = container.get_as::<Logger>("logger")?;
//! assert!(Arc::ptr_eq(&repo.logger, &logger));
//! # Ok::<(), rivet_di::DiError>(())
//! ```

pub mod container;
pub mod definition;
pub mod discovery;
pub mod error;
pub mod instance;
mod placeholder;
pub mod registry;
pub mod resolved;

pub use container::{Container, ContainerBuilder, Lifetime, MAX_RESOLUTION_DEPTH};
pub use definition::{Argument, ConstructorSpec, Definition};
pub use discovery::{
    discovered_provider_count, discovered_provider_names, register_discovered_constructors,
    ConstructorProvider,
};
pub use error::{BoxedError, DiError, Result};
pub use instance::{ContainerAware, InstanceBuilder, ServiceFactory, ServiceInstance};
pub use registry::{Constructor, ConstructorRegistry};
pub use resolved::Resolved;
