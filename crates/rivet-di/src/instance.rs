//! Type-erased service instances and their capability views.
//!
//! A built service is handed around as a [`ServiceInstance`]: an `Arc` to
//! the concrete value with the type erased, plus whatever capability views
//! the creator declared. Declaring capabilities at construction time is
//! what lets the container see them again after the concrete type is gone,
//! including for instances injected directly into the cache.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::error::BoxedError;
use crate::resolved::Resolved;

/// Capability for services that want a handle to their owning container.
///
/// When a class-constructed definition produces a container-aware instance,
/// the container calls [`set_container`](ContainerAware::set_container) once,
/// right after construction and before the instance is cached or returned.
/// Factory-built and directly injected instances are not called back;
/// a factory that wants the handle can capture it itself.
pub trait ContainerAware: Send + Sync {
    /// Receives the owning container. The handle is cheap to clone and
    /// keeps the container alive for as long as it is held.
    fn set_container(&self, container: Container);
}

/// Capability for services that build other services by method name.
///
/// A definition whose constructor spec reads `@id:method` resolves `id`,
/// requires this capability on the result, and calls
/// [`invoke`](ServiceFactory::invoke) with the prepared arguments.
pub trait ServiceFactory: Send + Sync {
    /// Invokes `method` with the prepared positional arguments.
    ///
    /// Implementations should reject names they do not know with
    /// [`DiError::unknown_method`](crate::DiError::unknown_method); any
    /// error is surfaced to the caller as the source of a
    /// [`DiError::FactoryFailed`](crate::DiError::FactoryFailed).
    fn invoke(
        &self,
        method: &str,
        args: &[Resolved],
    ) -> std::result::Result<ServiceInstance, BoxedError>;
}

/// A constructed service: an erased `Arc` plus declared capability views.
///
/// Cloning is cheap and both clones point at the same underlying value.
#[derive(Clone)]
pub struct ServiceInstance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    aware: Option<Arc<dyn ContainerAware>>,
    factory: Option<Arc<dyn ServiceFactory>>,
}

impl ServiceInstance {
    /// Wraps a plain service with no capabilities.
    pub fn new<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        ServiceInstance {
            value,
            type_name: type_name::<T>(),
            aware: None,
            factory: None,
        }
    }

    /// Starts a builder that can declare capability views while the
    /// concrete type is still known.
    pub fn of<T: Send + Sync + 'static>(value: Arc<T>) -> InstanceBuilder<T> {
        InstanceBuilder {
            value,
            aware: None,
            factory: None,
        }
    }

    /// Name of the concrete type behind the erasure.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the concrete value, if `T` is what was stored.
    pub fn downcast_ref<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Recovers a typed `Arc` to the concrete value.
    pub fn downcast_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// The container-aware view, when declared.
    pub fn container_aware(&self) -> Option<&Arc<dyn ContainerAware>> {
        self.aware.as_ref()
    }

    /// The factory view, when declared.
    pub fn factory(&self) -> Option<&Arc<dyn ServiceFactory>> {
        self.factory.as_ref()
    }

    /// Whether two handles share one underlying allocation.
    pub fn same_instance(&self, other: &ServiceInstance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInstance")
            .field("type_name", &self.type_name)
            .field("container_aware", &self.aware.is_some())
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

/// Builder declaring capability views for a [`ServiceInstance`].
pub struct InstanceBuilder<T> {
    value: Arc<T>,
    aware: Option<Arc<dyn ContainerAware>>,
    factory: Option<Arc<dyn ServiceFactory>>,
}

impl<T: Send + Sync + 'static> InstanceBuilder<T> {
    /// Declares the container-aware capability.
    pub fn container_aware(mut self) -> Self
    where
        T: ContainerAware,
    {
        self.aware = Some(Arc::clone(&self.value) as Arc<dyn ContainerAware>);
        self
    }

    /// Declares the factory capability.
    pub fn factory(mut self) -> Self
    where
        T: ServiceFactory,
    {
        self.factory = Some(Arc::clone(&self.value) as Arc<dyn ServiceFactory>);
        self
    }

    /// Finishes the instance.
    pub fn build(self) -> ServiceInstance {
        ServiceInstance {
            value: self.value,
            type_name: type_name::<T>(),
            aware: self.aware,
            factory: self.factory,
        }
    }
}
