//! Per-run plug-in instances and feature dispatch.

use std::cell::OnceCell;

use super::registry::{PluginDescriptor, PluginRegistry};
use super::{Feature, Plugin};
use crate::cartage::Cartage;
use crate::config::CartageConfig;
use crate::error::{Error, Result};

/// A constructed plug-in and its run state.
#[derive(Debug)]
pub struct PluginInstance {
    name: String,
    enabled: bool,
    plugin: Box<dyn Plugin>,
}

impl PluginInstance {
    fn new(descriptor: &PluginDescriptor) -> Self {
        Self {
            name: descriptor.name().to_string(),
            enabled: true,
            plugin: descriptor.construct(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    /// Whether this instance takes part in a `feature` broadcast.
    pub fn offers(&self, feature: Feature) -> bool {
        self.enabled && self.plugin.offer_feature(feature)
    }
}

#[derive(Debug)]
struct Slot {
    descriptor: PluginDescriptor,
    instance: OnceCell<PluginInstance>,
}

impl Slot {
    fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            descriptor,
            instance: OnceCell::new(),
        }
    }

    fn instance(&self) -> &PluginInstance {
        self.instance
            .get_or_init(|| PluginInstance::new(&self.descriptor))
    }
}

/// The plug-ins of a single run, one lazily constructed instance per
/// registered type. The set is frozen once configuration is resolved.
#[derive(Debug)]
pub struct Plugins {
    slots: Vec<Slot>,
    frozen: bool,
}

impl Plugins {
    pub fn from_registry(registry: &PluginRegistry) -> Self {
        Self {
            slots: registry
                .descriptors()
                .iter()
                .cloned()
                .map(Slot::new)
                .collect(),
            frozen: false,
        }
    }

    /// Add `P` to this run. Fails once configuration has been resolved.
    pub fn add<P: Plugin + Default>(&mut self) -> Result<()> {
        let descriptor = PluginDescriptor::of::<P>();
        if self.frozen {
            return Err(Error::RegistryFrozen(descriptor.name().to_string()));
        }
        match self
            .slots
            .iter_mut()
            .find(|slot| slot.descriptor.name() == descriptor.name())
        {
            Some(slot) => *slot = Slot::new(descriptor),
            None => self.slots.push(Slot::new(descriptor)),
        }
        Ok(())
    }

    /// Apply per-plug-in configuration to every instance and freeze the set.
    pub fn resolve_config(&mut self, config: &CartageConfig) -> Result<()> {
        for slot in &mut self.slots {
            slot.instance();
            let Some(instance) = slot.instance.get_mut() else {
                continue;
            };
            let plugin_config = config.for_plugin(&instance.name);
            instance.enabled = !plugin_config.disabled;
            instance.plugin.resolve_plugin_config(&plugin_config)?;
            tracing::debug!(
                plugin = %instance.name,
                enabled = instance.enabled,
                "Resolved plug-in configuration"
            );
        }
        self.frozen = true;
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The instance named `name`, constructed on first access.
    pub fn get(&self, name: &str) -> Option<&PluginInstance> {
        self.slots
            .iter()
            .find(|slot| slot.descriptor.name() == name)
            .map(Slot::instance)
    }

    /// The instance of type `P`, if registered.
    pub fn typed<P: Plugin>(&self) -> Option<&P> {
        self.get(&super::plugin_name::<P>())
            .and_then(|instance| instance.plugin.as_any().downcast_ref::<P>())
    }

    /// Every instance, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginInstance> {
        self.slots.iter().map(Slot::instance)
    }

    /// Enabled instances, in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = &PluginInstance> {
        self.iter().filter(|instance| instance.enabled)
    }

    /// Invoke `feature` on every offering instance in registration order.
    /// The first failure stops the broadcast.
    pub fn request(&self, feature: Feature, cx: &Cartage) -> Result<()> {
        for instance in self.offering(feature)? {
            tracing::debug!(plugin = %instance.name, %feature, "Requesting feature");
            instance.plugin.invoke(feature, cx)?;
        }
        Ok(())
    }

    /// Collect `accessor` over every instance offering `feature`, in
    /// registration order.
    pub fn request_map<T, F>(&self, feature: Feature, cx: &Cartage, accessor: F) -> Result<Vec<T>>
    where
        F: Fn(&dyn Plugin, &Cartage) -> T,
    {
        Ok(self
            .offering(feature)?
            .map(|instance| accessor(instance.plugin(), cx))
            .collect())
    }

    fn offering(&self, feature: Feature) -> Result<impl Iterator<Item = &PluginInstance>> {
        if !self.frozen {
            return Err(Error::PluginsUnresolved);
        }
        Ok(self.iter().filter(move |instance| instance.offers(feature)))
    }
}
