// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::collections::HashMap;
use std::path::PathBuf;

use hamrig_core::{RigError, RigProvider, RigResult};

mod dummy;
#[cfg(feature = "hamlib")]
pub mod hamlib;

pub use dummy::{DummyProvider, DummyRig};
#[cfg(feature = "hamlib")]
pub use hamlib::HamlibProvider;

/// Settings handed to a backend factory.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    /// Explicit native library to load instead of the default search.
    pub library_path: Option<PathBuf>,
}

pub type BackendFactory = fn(&BackendOptions) -> RigResult<Box<dyn RigProvider>>;

/// Context for registering and instantiating rig providers.
#[derive(Clone)]
pub struct RegistrationContext {
    factories: HashMap<String, BackendFactory>,
}

impl RegistrationContext {
    /// Create a new empty registration context.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory under a stable name (e.g. "hamlib").
    pub fn register_backend(&mut self, name: &str, factory: BackendFactory) {
        let key = normalize_name(name);
        self.factories.insert(key, factory);
    }

    pub fn is_backend_registered(&self, name: &str) -> bool {
        let key = normalize_name(name);
        self.factories.contains_key(&key)
    }

    /// List registered backend names.
    pub fn registered_backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Instantiate the provider registered under `name`.
    pub fn build_provider(
        &self,
        name: &str,
        options: &BackendOptions,
    ) -> RigResult<Box<dyn RigProvider>> {
        let key = normalize_name(name);
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| RigError::library(format!("Unknown rig backend: {}", name)))?;
        factory(options)
    }
}

impl Default for RegistrationContext {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_name(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Register all built-in backends enabled by features on a context.
pub fn register_builtin_backends_on(context: &mut RegistrationContext) {
    context.register_backend("dummy", dummy_factory);
    #[cfg(feature = "hamlib")]
    context.register_backend("hamlib", hamlib_factory);
}

fn dummy_factory(_options: &BackendOptions) -> RigResult<Box<dyn RigProvider>> {
    Ok(Box::new(DummyProvider::new()))
}

#[cfg(feature = "hamlib")]
fn hamlib_factory(options: &BackendOptions) -> RigResult<Box<dyn RigProvider>> {
    Ok(Box::new(HamlibProvider::load(options.library_path.as_deref())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration() {
        let mut context = RegistrationContext::new();
        register_builtin_backends_on(&mut context);
        assert!(context.is_backend_registered("Dummy"));
        assert!(context.registered_backends().contains(&"dummy".to_string()));
        #[cfg(feature = "hamlib")]
        assert!(context.is_backend_registered("HamLib"));
    }

    #[test]
    fn test_unknown_backend() {
        let context = RegistrationContext::default();
        let err = context
            .build_provider("ft-817", &BackendOptions::default())
            .err();
        assert_eq!(
            err,
            Some(RigError::Library("Unknown rig backend: ft-817".into()))
        );
    }

    #[test]
    fn test_build_dummy_provider() {
        let mut context = RegistrationContext::new();
        register_builtin_backends_on(&mut context);
        let provider = context
            .build_provider("dummy", &BackendOptions::default())
            .unwrap();
        assert!(provider.registry().lookup("Dummy").is_ok());
    }
}
