use std::collections::HashSet;
use std::sync::Arc;

use super::plugin::NotifierPlugin;
use crate::error::{AppError, AppResult};

/// Plugins available to the host, in registration order.
///
/// Built once at startup; there is no global registration.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn NotifierPlugin>>,
}

impl PluginRegistry {
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn NotifierPlugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Like [`get`](Self::get), but reports unknown names as `NotFound`.
    pub fn require(&self, name: &str) -> AppResult<Arc<dyn NotifierPlugin>> {
        self.get(name).ok_or_else(|| AppError::NotFound {
            entity: "notifier".to_string(),
            field: "name".to_string(),
            value: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn NotifierPlugin>> {
        self.plugins.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[derive(Default)]
pub struct PluginRegistryBuilder {
    plugins: Vec<Arc<dyn NotifierPlugin>>,
}

impl PluginRegistryBuilder {
    pub fn register<P>(mut self, plugin: P) -> Self
    where
        P: NotifierPlugin + 'static,
    {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// # Errors
    ///
    /// `AppError::Duplicate` when two plugins share a name.
    pub fn build(self) -> AppResult<PluginRegistry> {
        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.name()) {
                return Err(AppError::Duplicate {
                    entity: "notifier".to_string(),
                    field: "name".to_string(),
                    value: plugin.name().to_string(),
                });
            }
        }

        Ok(PluginRegistry {
            plugins: self.plugins,
        })
    }
}
