// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigFile, HamrigConfig, SessionSection};
pub use logging::init_logging;

use hamrig_backend::{register_builtin_backends_on, RegistrationContext};
use hamrig_core::{RigProvider, RigResult, RigSession};
use tracing::info;

/// Instantiate the backend named in `config`.
pub fn build_provider(config: &HamrigConfig) -> RigResult<Box<dyn RigProvider>> {
    let mut context = RegistrationContext::new();
    register_builtin_backends_on(&mut context);
    let provider = context.build_provider(&config.backend, &config.backend_options())?;
    info!(
        "Backend {} ready with {} models",
        config.backend,
        provider.registry().len()
    );
    Ok(provider)
}

/// Create a closed session for the registered model `model`.
pub fn open_session(
    provider: &dyn RigProvider,
    model: &str,
    config: &HamrigConfig,
) -> RigResult<RigSession> {
    RigSession::from_provider(provider, model, config.to_session_config())
}

#[cfg(test)]
mod tests {
    use hamrig_core::RigError;

    use super::*;

    fn dummy_config() -> HamrigConfig {
        HamrigConfig {
            backend: "Dummy".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dummy_backend_from_config() {
        let config = dummy_config();
        let provider = build_provider(&config).unwrap();
        let session = open_session(provider.as_ref(), "Dummy", &config).unwrap();
        assert!(!session.is_open());
        session.open_default().unwrap();
        assert_eq!(session.get_frequency().unwrap(), 144_300_000.0);
        session.close().unwrap();
    }

    #[test]
    fn test_unknown_model() {
        let config = dummy_config();
        let provider = build_provider(&config).unwrap();
        let err = open_session(provider.as_ref(), "IC-7300", &config).err();
        assert_eq!(err, Some(RigError::DeviceNotFound("IC-7300".into())));
    }
}
