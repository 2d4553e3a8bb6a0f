// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Named catalogue of the rig models a backend knows.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{RigError, RigResult};
use crate::rig::caps::CapabilitySet;
use crate::rig::native::NativeRig;
use crate::rig::types::ModelId;

/// Capability sets keyed by model name, kept sorted.
///
/// Names are not unique across manufacturers; a repeated name is stored
/// under `name_2`, `name_3` and so on, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RigRegistry {
    rigs: BTreeMap<String, Arc<CapabilitySet>>,
}

impl RigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `caps` and return the name it was stored under.
    pub fn add(&mut self, caps: CapabilitySet) -> String {
        let mut name = caps.model_name.clone();
        let mut suffix = 2;
        while self.rigs.contains_key(&name) {
            name = format!("{}_{}", caps.model_name, suffix);
            suffix += 1;
        }
        debug!("Registered model {} as {:?}", caps.model, name);
        self.rigs.insert(name.clone(), Arc::new(caps));
        name
    }

    pub fn lookup(&self, name: &str) -> RigResult<Arc<CapabilitySet>> {
        self.rigs
            .get(name)
            .cloned()
            .ok_or_else(|| RigError::DeviceNotFound(name.to_string()))
    }

    /// First registered entry for a numeric model id.
    pub fn lookup_model(&self, model: ModelId) -> RigResult<Arc<CapabilitySet>> {
        self.rigs
            .values()
            .find(|caps| caps.model == model)
            .cloned()
            .ok_or_else(|| RigError::DeviceNotFound(format!("model {model}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rigs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CapabilitySet>)> {
        self.rigs.iter().map(|(name, caps)| (name.as_str(), caps))
    }

    pub fn len(&self) -> usize {
        self.rigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
    }
}

/// A loaded native library: its model catalogue and a way to get handles.
pub trait RigProvider: Send + Sync {
    fn registry(&self) -> &RigRegistry;

    /// New, unopened native handle for the model described by `caps`.
    fn create(&self, caps: &CapabilitySet) -> RigResult<Box<dyn NativeRig>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(model: ModelId, name: &str) -> CapabilitySet {
        CapabilitySet {
            model,
            model_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let mut registry = RigRegistry::new();
        assert_eq!(registry.add(caps(1, "Dummy")), "Dummy");
        assert_eq!(registry.add(caps(2, "FT-817")), "FT-817");
        assert_eq!(registry.add(caps(3, "Dummy")), "Dummy_2");
        assert_eq!(registry.add(caps(4, "Dummy")), "Dummy_3");

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.lookup("Dummy_2").unwrap().model, 3);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["Dummy", "Dummy_2", "Dummy_3", "FT-817"]
        );
    }

    #[test]
    fn test_lookup_misses() {
        let mut registry = RigRegistry::new();
        registry.add(caps(1, "Dummy"));
        assert_eq!(
            registry.lookup("IC-7300"),
            Err(RigError::DeviceNotFound("IC-7300".into()))
        );
        assert_eq!(registry.lookup_model(1).unwrap().model_name, "Dummy");
        assert!(registry.lookup_model(2029).is_err());
    }
}
