//! Container error types

use thiserror::Error;

/// Boxed error carried as the source of construction and factory failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Container result type
pub type Result<T> = std::result::Result<T, DiError>;

/// Errors surfaced by service resolution
#[derive(Debug, Error)]
pub enum DiError {
    /// The id has no cached instance and no definition in either section.
    #[error("no definition found for service {id:?}")]
    DefinitionNotFound {
        /// Requested service id
        id: String,
    },

    /// The raw definition value could not be parsed.
    #[error("invalid definition for service {id:?}: {reason}")]
    InvalidDefinition {
        /// Service id the definition belongs to
        id: String,
        /// What was wrong with it
        reason: String,
    },

    /// A class constructor spec named a constructor nobody registered.
    #[error("no constructor registered for class {class:?}")]
    ConstructorNotFound {
        /// Constructor name from the definition
        class: String,
    },

    /// A registered constructor returned an error.
    #[error("construction of {class:?} failed")]
    ConstructionFailed {
        /// Constructor name from the definition
        class: String,
        /// Error returned by the constructor
        #[source]
        source: BoxedError,
    },

    /// A factory constructor spec pointed at a service without the factory
    /// capability.
    #[error("service {id:?} of type {type_name} is not a factory")]
    NotAFactory {
        /// Service id named before the colon
        id: String,
        /// Concrete type of the would-be factory
        type_name: &'static str,
    },

    /// A factory method invocation returned an error.
    #[error("factory {id:?} method {method:?} failed")]
    FactoryFailed {
        /// Factory service id
        id: String,
        /// Method named after the colon
        method: String,
        /// Error returned by the factory
        #[source]
        source: BoxedError,
    },

    /// A factory was asked for a method it does not provide.
    #[error("factory type {type_name} has no method {method:?}")]
    UnknownFactoryMethod {
        /// Concrete factory type
        type_name: &'static str,
        /// Requested method name
        method: String,
    },

    /// A typed lookup found the service, but under a different type.
    #[error("service {id:?} is {actual}, not the requested {requested}")]
    TypeMismatch {
        /// Requested service id
        id: String,
        /// Type the caller asked for
        requested: &'static str,
        /// Type the instance actually has
        actual: &'static str,
    },

    /// Nested values or `@` chains recursed past the depth limit.
    #[error("resolution exceeded the depth limit of {limit}")]
    ResolutionDepthExceeded {
        /// The limit that was hit
        limit: usize,
    },

    /// A constructor or factory rejected one of its prepared arguments.
    #[error("bad constructor argument: {0}")]
    Argument(String),

    /// Error from the configuration tree.
    #[error(transparent)]
    Config(#[from] rivet_config::ConfigError),
}

impl DiError {
    /// Convenience for constructor bodies rejecting an argument.
    pub fn argument(message: impl Into<String>) -> Self {
        DiError::Argument(message.into())
    }

    /// Convenience for factory implementations rejecting a method name.
    pub fn unknown_method<T: ?Sized>(method: &str) -> Self {
        DiError::UnknownFactoryMethod {
            type_name: std::any::type_name::<T>(),
            method: method.to_string(),
        }
    }
}
