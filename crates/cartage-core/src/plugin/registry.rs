//! Plug-in registry for managing available plug-in types.

use std::sync::{LazyLock, PoisonError, RwLock};

use super::{Plugin, plugin_name};
use crate::plugins::{BuildTarball, VendorCommand};

/// A registered plug-in type: its derived name and a constructor.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    name: String,
    factory: fn() -> Box<dyn Plugin>,
}

impl PluginDescriptor {
    pub fn of<P: Plugin + Default>() -> Self {
        Self {
            name: plugin_name::<P>(),
            factory: construct::<P>,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self) -> Box<dyn Plugin> {
        (self.factory)()
    }
}

fn construct<P: Plugin + Default>() -> Box<dyn Plugin> {
    Box::<P>::default()
}

/// Ordered set of plug-in types, keyed by name.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    descriptors: Vec<PluginDescriptor>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtin_plugins()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Create a registry with the plug-ins shipped with cartage.
    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        registry.register::<BuildTarball>();
        registry.register::<VendorCommand>();
        registry
    }

    /// Register `P`. A type whose name is already registered replaces the
    /// earlier entry in place, keeping its position.
    pub fn register<P: Plugin + Default>(&mut self) {
        self.insert(PluginDescriptor::of::<P>());
    }

    pub fn insert(&mut self, descriptor: PluginDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn descriptors(&self) -> &[PluginDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }
}

static REGISTRY: LazyLock<RwLock<PluginRegistry>> =
    LazyLock::new(|| RwLock::new(PluginRegistry::with_builtin_plugins()));

/// Register `P` with the process-wide registry. Runs created afterwards
/// include it.
pub fn register<P: Plugin + Default>() {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register::<P>();
}

/// A snapshot of the process-wide registry.
pub fn registered() -> PluginRegistry {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
