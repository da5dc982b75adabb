use std::sync::Arc;

use assert2::let_assert;

use super::{WalletCoreBuildError, WalletCoreBuilder};
use crate::config::ConfigValidationError;
use crate::config::core_config::CoreConfig;
use crate::provider::vault::MockVault;
use crate::repository::credential_repository::MockCredentialRepository;
use crate::repository::deferred_credential_repository::MockDeferredCredentialRepository;

fn complete_builder(config: CoreConfig) -> WalletCoreBuilder {
    WalletCoreBuilder::new(config)
        .with_credential_repository(Arc::new(MockCredentialRepository::new()))
        .with_deferred_credential_repository(Arc::new(MockDeferredCredentialRepository::new()))
        .with_vault(Arc::new(MockVault::new()))
}

#[test]
fn test_build_with_defaults() {
    let core = complete_builder(CoreConfig::default()).build().unwrap();

    core.shutdown();
}

#[test]
fn test_build_without_vault() {
    let result = WalletCoreBuilder::new(CoreConfig::default())
        .with_credential_repository(Arc::new(MockCredentialRepository::new()))
        .with_deferred_credential_repository(Arc::new(MockDeferredCredentialRepository::new()))
        .build();

    let_assert!(Some(WalletCoreBuildError::MissingDependency("vault")) = result.err());
}

#[test]
fn test_build_rejects_invalid_config() {
    let mut config = CoreConfig::default();
    config.issuance.redirect_uri = "not a url".to_string();

    let result = complete_builder(config).build();

    let_assert!(
        Some(WalletCoreBuildError::Config(ConfigValidationError::InvalidValue { key, .. })) =
            result.err()
    );
    assert_eq!(key, "issuance.redirectUri");
}
