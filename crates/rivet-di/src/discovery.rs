//! Compile-time constructor discovery.
//!
//! Definitions name constructors as strings, so somebody has to connect
//! those names to code before the container can build anything. Crates that
//! provide constructible types submit a [`ConstructorProvider`] with
//! `inventory::submit!`; [`register_discovered_constructors`] then collects
//! every submission across the linked binary, no central registration list
//! required.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rivet_di::{ConstructorProvider, ConstructorRegistry};
//!
//! fn register_storage_constructors(registry: &mut ConstructorRegistry) {
//!     registry.register_class::<StorageManager, _>("storage.manager", |_| {
//!         Ok(StorageManager::new())
//!     });
//! }
//!
//! inventory::submit! {
//!     ConstructorProvider::new("storage", register_storage_constructors)
//! }
//! ```

use tracing::{debug, info};

use crate::registry::ConstructorRegistry;

/// A named block of constructor registrations, collected at link time.
pub struct ConstructorProvider {
    /// Provider name, for logs and diagnostics.
    pub name: &'static str,
    /// Registration function that fills the registry.
    pub register_fn: fn(&mut ConstructorRegistry),
    /// Registration order: lower runs earlier. Defaults to 100.
    pub priority: u32,
}

impl ConstructorProvider {
    /// A provider at the default priority.
    pub const fn new(name: &'static str, register_fn: fn(&mut ConstructorRegistry)) -> Self {
        ConstructorProvider {
            name,
            register_fn,
            priority: 100,
        }
    }

    /// A provider with an explicit priority. Lower priorities register
    /// first, so higher ones win name collisions.
    pub const fn with_priority(
        name: &'static str,
        register_fn: fn(&mut ConstructorRegistry),
        priority: u32,
    ) -> Self {
        ConstructorProvider {
            name,
            register_fn,
            priority,
        }
    }
}

inventory::collect!(ConstructorProvider);

/// Runs every collected provider against `registry`, in priority order.
pub fn register_discovered_constructors(registry: &mut ConstructorRegistry) {
    let mut providers: Vec<&ConstructorProvider> =
        inventory::iter::<ConstructorProvider>.into_iter().collect();
    providers.sort_by_key(|provider| provider.priority);

    info!("Discovered {} constructor providers", providers.len());
    for provider in providers {
        debug!(
            "Running constructor provider {:?} (priority {})",
            provider.name, provider.priority
        );
        (provider.register_fn)(registry);
    }
}

/// Number of providers discovered at link time.
pub fn discovered_provider_count() -> usize {
    inventory::iter::<ConstructorProvider>.into_iter().count()
}

/// Names of every discovered provider, unordered.
pub fn discovered_provider_names() -> Vec<&'static str> {
    inventory::iter::<ConstructorProvider>
        .into_iter()
        .map(|provider| provider.name)
        .collect()
}
