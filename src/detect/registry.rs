use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::config::VisionConfig;
use crate::error::VisionError;

use super::backend::{DetectionCapability, VisionBackend};
use super::backends::{HeuristicBackend, NullBackend};

/// Registry of vision backends keyed by name.
///
/// Backends are stateless, so they are shared as `Arc<dyn VisionBackend>`.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn VisionBackend>>,
    default_name: Option<String>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            default_name: None,
        }
    }

    /// Registry with the built-in backends, default chosen by `config.driver`.
    pub fn from_config(config: &VisionConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(HeuristicBackend::new(&config.scan, &config.motion));
        registry.register(NullBackend::new());
        registry.set_default(&config.driver)?;
        log::info!("vision backend selected: {}", config.driver);
        Ok(registry)
    }

    /// Register a backend. The first registered backend becomes the default.
    pub fn register<B: VisionBackend + 'static>(&mut self, backend: B) {
        let name = backend.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.backends.insert(name, Arc::new(backend));
    }

    /// Set default backend by name.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.backends.contains_key(name) {
            return Err(VisionError::BackendUnavailable(format!(
                "backend '{}' not registered",
                name
            ))
            .into());
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    /// Get backend by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn VisionBackend>> {
        self.backends.get(name).cloned()
    }

    /// Get default backend.
    pub fn default_backend(&self) -> Option<Arc<dyn VisionBackend>> {
        self.default_name.as_ref().and_then(|name| self.get(name))
    }

    /// List registered backends, sorted by name.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Select a backend that supports the requested capability.
    ///
    /// Prefers the default backend when it supports the capability; otherwise
    /// falls back to the first supporting backend by name.
    pub fn backend_for_capability(
        &self,
        capability: DetectionCapability,
    ) -> Result<Arc<dyn VisionBackend>> {
        if let Some(default_backend) = self.default_backend() {
            if default_backend.supports(capability) {
                return Ok(default_backend);
            }
        }

        for name in self.list() {
            if let Some(backend) = self.get(&name) {
                if backend.supports(capability) {
                    log::debug!("falling back to backend '{}' for {:?}", name, capability);
                    return Ok(backend);
                }
            }
        }

        Err(VisionError::BackendUnavailable(format!(
            "no registered backend supports capability {:?}",
            capability
        ))
        .into())
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
