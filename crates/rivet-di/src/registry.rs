//! Constructor registry: the names definitions may use as class specs.
//!
//! The configuration tree names constructors as strings; this registry maps
//! those names to code. Each constructor takes the prepared positional
//! arguments and returns an erased instance.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BoxedError, DiError, Result};
use crate::instance::{ContainerAware, ServiceFactory, ServiceInstance};
use crate::resolved::Resolved;

/// A registered constructor: prepared arguments in, erased instance out.
pub type Constructor = Arc<dyn Fn(&[Resolved]) -> Result<ServiceInstance> + Send + Sync>;

/// Maps constructor names to the code that builds instances.
#[derive(Default)]
pub struct ConstructorRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ConstructorRegistry {
    pub fn new() -> Self {
        ConstructorRegistry {
            constructors: HashMap::new(),
        }
    }

    /// Registers a raw constructor producing a ready [`ServiceInstance`].
    ///
    /// This is the low-level hook; most callers want
    /// [`register_class`](Self::register_class) or one of its capability
    /// variants. Re-registering a name replaces the previous constructor.
    pub fn register<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&[Resolved]) -> Result<ServiceInstance> + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .constructors
            .insert(name.clone(), Arc::new(ctor))
            .is_some()
        {
            warn!("Constructor {:?} re-registered, previous entry replaced", name);
        } else {
            debug!("Registered constructor {:?}", name);
        }
    }

    /// Registers a typed constructor for a plain service.
    ///
    /// Errors from `ctor` come back to the caller as
    /// [`DiError::ConstructionFailed`] with the constructor name attached.
    pub fn register_class<T, F>(&mut self, name: impl Into<String>, ctor: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        let name = name.into();
        let class = name.clone();
        self.register(name, move |args| {
            let value = wrap_failure(&class, ctor(args))?;
            Ok(ServiceInstance::new(Arc::new(value)))
        });
    }

    /// Registers a typed constructor for a container-aware service. The
    /// container injects itself into the instance right after construction.
    pub fn register_aware_class<T, F>(&mut self, name: impl Into<String>, ctor: F)
    where
        T: ContainerAware + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        let name = name.into();
        let class = name.clone();
        self.register(name, move |args| {
            let value = wrap_failure(&class, ctor(args))?;
            Ok(ServiceInstance::of(Arc::new(value)).container_aware().build())
        });
    }

    /// Registers a typed constructor for a factory service, one that other
    /// definitions can delegate to with `@id:method` specs.
    pub fn register_factory_class<T, F>(&mut self, name: impl Into<String>, ctor: F)
    where
        T: ServiceFactory + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        let name = name.into();
        let class = name.clone();
        self.register(name, move |args| {
            let value = wrap_failure(&class, ctor(args))?;
            Ok(ServiceInstance::of(Arc::new(value)).factory().build())
        });
    }

    /// Looks up a constructor by name.
    pub fn get(&self, name: &str) -> Option<Constructor> {
        self.constructors.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Registered names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

fn wrap_failure<T>(class: &str, outcome: std::result::Result<T, BoxedError>) -> Result<T> {
    outcome.map_err(|source| DiError::ConstructionFailed {
        class: class.to_string(),
        source,
    })
}
