//! The container: definition lookup, placeholder resolution and the shared
//! instance cache.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Captures;
use serde_json::Value;
use tracing::debug;

use rivet_config::ConfigTree;

use crate::definition::{Argument, ConstructorSpec, Definition};
use crate::discovery;
use crate::error::{BoxedError, DiError, Result};
use crate::instance::{ContainerAware, ServiceFactory, ServiceInstance};
use crate::placeholder;
use crate::registry::ConstructorRegistry;
use crate::resolved::Resolved;

/// Upper bound on resolution recursion, nested values and `@` chains
/// combined. A definition graph deeper than this is almost certainly
/// self-referential.
pub const MAX_RESOLUTION_DEPTH: usize = 64;

/// Which configuration section a definition came from, and therefore how
/// long its instances live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Built once on first request, cached, same instance ever after.
    Shared,
    /// Rebuilt from its definition on every request.
    Multiple,
}

/// A configuration-driven service container.
///
/// Services are described as data in a [`ConfigTree`]: the `shared` and
/// `multiple` sections map service ids to `[ctor-spec, arg, ...]`
/// definitions, and the `parameters` section holds the data that `%path%`
/// placeholders pull in. Nothing is built until somebody asks; a `shared`
/// service is then built once and cached, a `multiple` service is rebuilt
/// per request.
///
/// The container is a cheap handle: clones share all state, which is what
/// lets [`ContainerAware`] services hold one without copying anything.
///
/// ```
/// use rivet_di::Container;
/// use serde_json::json;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// let container = Container::builder()
///     .config(json!({
///         "parameters": { "app": { "greeting": "hello" } },
///         "shared": { "greeter": ["app.greeter", "%app.greeting%"] }
///     }))?
///     .constructor::<Greeter, _>("app.greeter", |args| {
///         Ok(Greeter {
///             greeting: args[0].as_str().unwrap_or("").to_string(),
///         })
///     })
///     .build();
///
/// let greeter = container.get_as::<Greeter>("greeter")?;
/// assert_eq!(greeter.greeting, "hello");
/// # Ok::<(), rivet_di::DiError>(())
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    config: RwLock<ConfigTree>,
    constructors: RwLock<ConstructorRegistry>,
    /// Definitions installed through [`Container::define`]; these shadow
    /// tree definitions with the same id and survive merges.
    programmatic: RwLock<HashMap<String, (Lifetime, Arc<Definition>)>>,
    /// Definitions parsed out of the tree, memoized until the next merge.
    parsed: RwLock<HashMap<String, (Lifetime, Arc<Definition>)>>,
    /// The shared instance cache. Grows as shared services are built and
    /// injected; nothing ever evicts from it.
    shared: RwLock<HashMap<String, ServiceInstance>>,
}

impl Container {
    /// An empty container: no parameters, no definitions, no constructors.
    pub fn new() -> Container {
        Container {
            inner: Arc::new(ContainerInner {
                config: RwLock::new(ConfigTree::new()),
                constructors: RwLock::new(ConstructorRegistry::new()),
                programmatic: RwLock::new(HashMap::new()),
                parsed: RwLock::new(HashMap::new()),
                shared: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// A container seeded with one configuration value.
    pub fn with_config(partial: Value) -> Result<Container> {
        let container = Container::new();
        container.merge_config(partial)?;
        Ok(container)
    }

    /// Starts a [`ContainerBuilder`].
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    // ---- configuration ----

    /// Deep-merges a partial configuration into the tree.
    ///
    /// Definitions already parsed are re-read from the tree on their next
    /// use, so a merge can redefine a `multiple` service or a `shared`
    /// service that has not been built yet. Already cached shared instances
    /// are not touched.
    pub fn merge_config(&self, partial: Value) -> Result<()> {
        self.inner.config.write().merge(partial)?;
        self.inner.parsed.write().clear();
        debug!("Merged configuration, parsed definitions discarded");
        Ok(())
    }

    /// Reads the parameter at a dot-separated path.
    pub fn parameter(&self, path: &str) -> Option<Value> {
        self.inner.config.read().parameter(path).cloned()
    }

    /// Reads the parameter at a path, falling back to `default`.
    pub fn parameter_or(&self, path: &str, default: Value) -> Value {
        self.parameter(path).unwrap_or(default)
    }

    /// Writes a parameter, creating missing intermediate objects. Fails
    /// when the path descends through an existing non-object value.
    pub fn set_parameter(&self, path: &str, value: Value) -> Result<()> {
        self.inner.config.write().set_parameter(path, value)?;
        Ok(())
    }

    /// Snapshot of the whole configuration tree.
    pub fn tree(&self) -> ConfigTree {
        self.inner.config.read().clone()
    }

    // ---- constructors and definitions ----

    /// Registers a raw constructor under a class name.
    pub fn register_constructor<F>(&self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&[Resolved]) -> Result<ServiceInstance> + Send + Sync + 'static,
    {
        self.inner.constructors.write().register(name, ctor);
    }

    /// Registers a typed constructor for a plain service.
    pub fn register_class<T, F>(&self, name: impl Into<String>, ctor: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        self.inner.constructors.write().register_class::<T, _>(name, ctor);
    }

    /// Registers a typed constructor for a container-aware service.
    pub fn register_aware_class<T, F>(&self, name: impl Into<String>, ctor: F)
    where
        T: ContainerAware + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        self.inner
            .constructors
            .write()
            .register_aware_class::<T, _>(name, ctor);
    }

    /// Registers a typed constructor for a factory service.
    pub fn register_factory_class<T, F>(&self, name: impl Into<String>, ctor: F)
    where
        T: ServiceFactory + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        self.inner
            .constructors
            .write()
            .register_factory_class::<T, _>(name, ctor);
    }

    /// Installs a definition built in code instead of read from the tree.
    ///
    /// Programmatic definitions shadow tree definitions with the same id.
    /// They are the way to pass an [`Argument::Literal`] that string
    /// classification would otherwise treat as a placeholder or reference.
    pub fn define(&self, id: impl Into<String>, lifetime: Lifetime, definition: Definition) {
        let id = id.into();
        debug!("Installed programmatic definition {:?} ({:?})", id, lifetime);
        self.inner
            .programmatic
            .write()
            .insert(id, (lifetime, Arc::new(definition)));
    }

    // ---- services ----

    /// Resolves one configuration value.
    ///
    /// * exactly `%path%`: the raw parameter at `path`, original type
    ///   preserved, empty string when absent;
    /// * text containing `%path%` occurrences: each occurrence replaced by
    ///   the parameter's string form, the result is always a string;
    /// * `@id` (and no `%` anywhere): the service `id`, looked up through
    ///   [`get`](Container::get);
    /// * lists and mappings: resolved element by element, same shape back;
    /// * anything else: passed through untouched.
    pub fn resolve(&self, value: &Value) -> Result<Resolved> {
        let argument = Argument::classify(value);
        self.resolve_argument(&argument, 0)
    }

    /// Returns the service with this id, building it if needed.
    ///
    /// Lookup order: the shared instance cache, then the `shared` section,
    /// then `multiple`. A cache hit returns immediately, whatever section
    /// the id may also appear in; ids injected with [`set`](Container::set)
    /// behave exactly like built shared services.
    pub fn get(&self, id: &str) -> Result<ServiceInstance> {
        self.build(id, 0)
    }

    /// Returns the service with this id, downcast to its concrete type.
    pub fn get_as<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        let instance = self.get(id)?;
        instance
            .downcast_arc::<T>()
            .ok_or_else(|| DiError::TypeMismatch {
                id: id.to_string(),
                requested: std::any::type_name::<T>(),
                actual: instance.type_name(),
            })
    }

    /// Injects a ready instance into the shared cache, bypassing
    /// definitions entirely. An existing entry with the same id is
    /// replaced; later [`get`](Container::get) calls return this instance.
    pub fn set(&self, id: impl Into<String>, instance: ServiceInstance) {
        let id = id.into();
        debug!("Injected instance {:?} ({})", id, instance.type_name());
        self.inner.shared.write().insert(id, instance);
    }

    /// Wraps a plain value and injects it. Capability views need
    /// [`ServiceInstance::of`]; see [`set`](Container::set).
    pub fn set_instance<T: Send + Sync + 'static>(&self, id: impl Into<String>, value: Arc<T>) {
        self.set(id, ServiceInstance::new(value));
    }

    // ---- introspection ----

    /// Whether any definition, programmatic or from the tree, covers `id`.
    pub fn is_defined(&self, id: &str) -> bool {
        if self.inner.programmatic.read().contains_key(id) {
            return true;
        }
        let config = self.inner.config.read();
        config.shared_definition(id).is_some() || config.multiple_definition(id).is_some()
    }

    /// Whether the shared cache currently holds `id`.
    pub fn has_cached(&self, id: &str) -> bool {
        self.inner.shared.read().contains_key(id)
    }

    /// Number of instances in the shared cache.
    pub fn cached_count(&self) -> usize {
        self.inner.shared.read().len()
    }

    /// Every defined id, sorted: programmatic definitions plus both tree
    /// sections.
    pub fn definition_ids(&self) -> Vec<String> {
        let mut ids = BTreeSet::new();
        ids.extend(self.inner.programmatic.read().keys().cloned());
        let config = self.inner.config.read();
        if let Some(section) = config.shared_section() {
            ids.extend(section.keys().cloned());
        }
        if let Some(section) = config.multiple_section() {
            ids.extend(section.keys().cloned());
        }
        drop(config);
        ids.into_iter().collect()
    }

    // ---- internals ----

    /// The definition for `id`: programmatic first, then the memo, then a
    /// fresh parse out of the tree (`shared` before `multiple`).
    fn lookup_definition(&self, id: &str) -> Result<(Lifetime, Arc<Definition>)> {
        if let Some((lifetime, definition)) = self.inner.programmatic.read().get(id) {
            return Ok((*lifetime, Arc::clone(definition)));
        }
        if let Some((lifetime, definition)) = self.inner.parsed.read().get(id) {
            return Ok((*lifetime, Arc::clone(definition)));
        }

        let config = self.inner.config.read();
        let (lifetime, raw) = if let Some(raw) = config.shared_definition(id) {
            (Lifetime::Shared, raw.clone())
        } else if let Some(raw) = config.multiple_definition(id) {
            (Lifetime::Multiple, raw.clone())
        } else {
            return Err(DiError::DefinitionNotFound { id: id.to_string() });
        };
        drop(config);

        let definition = Arc::new(Definition::parse(id, &raw)?);
        self.inner
            .parsed
            .write()
            .insert(id.to_string(), (lifetime, Arc::clone(&definition)));
        Ok((lifetime, definition))
    }

    fn build(&self, id: &str, depth: usize) -> Result<ServiceInstance> {
        if depth >= MAX_RESOLUTION_DEPTH {
            return Err(DiError::ResolutionDepthExceeded {
                limit: MAX_RESOLUTION_DEPTH,
            });
        }
        if let Some(instance) = self.inner.shared.read().get(id) {
            return Ok(instance.clone());
        }

        let (lifetime, definition) = self.lookup_definition(id)?;

        // Arguments first, then the constructor; a definition sees its
        // dependencies fully resolved. No container lock is held while
        // user code runs, so constructors may call back into the
        // container freely.
        let mut prepared = Vec::with_capacity(definition.args().len());
        for argument in definition.args() {
            prepared.push(self.resolve_argument(argument, depth + 1)?);
        }

        let instance = match definition.ctor() {
            ConstructorSpec::Factory { service, method } => {
                let factory = self.build(service, depth + 1)?;
                let view = factory.factory().ok_or_else(|| DiError::NotAFactory {
                    id: service.clone(),
                    type_name: factory.type_name(),
                })?;
                view.invoke(method, &prepared)
                    .map_err(|source| DiError::FactoryFailed {
                        id: service.clone(),
                        method: method.clone(),
                        source,
                    })?
            }
            ConstructorSpec::Class(class) => {
                let ctor = self
                    .inner
                    .constructors
                    .read()
                    .get(class)
                    .ok_or_else(|| DiError::ConstructorNotFound {
                        class: class.clone(),
                    })?;
                let instance = ctor(&prepared)?;
                if let Some(aware) = instance.container_aware() {
                    aware.set_container(self.clone());
                }
                instance
            }
        };
        debug!("Built service {:?} as {}", id, instance.type_name());

        match lifetime {
            Lifetime::Shared => {
                // Two racing first builds both succeed; the cache keeps
                // whichever landed first and both callers get that one.
                let mut cache = self.inner.shared.write();
                let cached = cache
                    .entry(id.to_string())
                    .or_insert_with(|| instance.clone())
                    .clone();
                Ok(cached)
            }
            Lifetime::Multiple => Ok(instance),
        }
    }

    fn resolve_argument(&self, argument: &Argument, depth: usize) -> Result<Resolved> {
        if depth >= MAX_RESOLUTION_DEPTH {
            return Err(DiError::ResolutionDepthExceeded {
                limit: MAX_RESOLUTION_DEPTH,
            });
        }
        match argument {
            Argument::Literal(value) => Ok(Resolved::Value(value.clone())),
            Argument::ParameterRef(path) => Ok(Resolved::Value(
                self.parameter_or(path, Value::String(String::new())),
            )),
            Argument::Interpolate(template) => {
                Ok(Resolved::Value(Value::String(self.interpolate(template))))
            }
            Argument::ServiceRef(id) => Ok(Resolved::Service(self.build(id, depth + 1)?)),
            Argument::List(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_argument(item, depth + 1)?);
                }
                Ok(Resolved::List(resolved))
            }
            Argument::Map(entries) => {
                let mut resolved = Vec::with_capacity(entries.len());
                for (key, entry) in entries {
                    resolved.push((key.clone(), self.resolve_argument(entry, depth + 1)?));
                }
                Ok(Resolved::Map(resolved))
            }
        }
    }

    /// Replaces every `%path%` occurrence in one pass, so a parameter value
    /// that itself looks like a placeholder is not substituted again.
    fn interpolate(&self, template: &str) -> String {
        let config = self.inner.config.read();
        placeholder::embedded_re()
            .replace_all(template, |caps: &Captures<'_>| {
                match config.parameter(&caps[1]) {
                    Some(value) => placeholder::value_to_string(value),
                    None => String::new(),
                }
            })
            .into_owned()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.definition_ids().len())
            .field("cached", &self.cached_count())
            .field("constructors", &self.inner.constructors.read().len())
            .finish()
    }
}

/// Assembles a [`Container`] before first use.
///
/// Every method delegates to the container it is building, so the builder
/// adds nothing semantically; it just keeps wiring in one expression.
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        ContainerBuilder {
            container: Container::new(),
        }
    }

    /// Merges a partial configuration.
    pub fn config(self, partial: Value) -> Result<Self> {
        self.container.merge_config(partial)?;
        Ok(self)
    }

    /// Registers a typed constructor for a plain service.
    pub fn constructor<T, F>(self, name: impl Into<String>, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        self.container.register_class::<T, _>(name, ctor);
        self
    }

    /// Registers a typed constructor for a container-aware service.
    pub fn aware_constructor<T, F>(self, name: impl Into<String>, ctor: F) -> Self
    where
        T: ContainerAware + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        self.container.register_aware_class::<T, _>(name, ctor);
        self
    }

    /// Registers a typed constructor for a factory service.
    pub fn factory_constructor<T, F>(self, name: impl Into<String>, ctor: F) -> Self
    where
        T: ServiceFactory + 'static,
        F: Fn(&[Resolved]) -> std::result::Result<T, BoxedError> + Send + Sync + 'static,
    {
        self.container.register_factory_class::<T, _>(name, ctor);
        self
    }

    /// Registers a raw constructor.
    pub fn raw_constructor<F>(self, name: impl Into<String>, ctor: F) -> Self
    where
        F: Fn(&[Resolved]) -> Result<ServiceInstance> + Send + Sync + 'static,
    {
        self.container.register_constructor(name, ctor);
        self
    }

    /// Registers every constructor submitted through
    /// [`ConstructorProvider`](crate::ConstructorProvider), in priority
    /// order.
    pub fn discovered_constructors(self) -> Self {
        let mut registry = self.container.inner.constructors.write();
        discovery::register_discovered_constructors(&mut registry);
        drop(registry);
        self
    }

    /// Installs a programmatic definition.
    pub fn define(
        self,
        id: impl Into<String>,
        lifetime: Lifetime,
        definition: Definition,
    ) -> Self {
        self.container.define(id, lifetime, definition);
        self
    }

    /// Injects a ready instance into the shared cache.
    pub fn instance(self, id: impl Into<String>, instance: ServiceInstance) -> Self {
        self.container.set(id, instance);
        self
    }

    /// Finishes and hands over the container.
    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
