use secrecy::SecretString;
use shared_types::DidValue;
use strum::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Secret not found for `{0}`")]
    NotFound(DidValue),
    #[error("Vault failure: `{0}`")]
    Failed(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum SecretKeyType {
    /// Serialized private EC JWK
    #[strum(serialize = "PRIVATE_JWK")]
    PrivateJwk,
}

/// External secret store holding holder private keys, keyed by DID
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait Vault: Send + Sync {
    async fn get_secret(
        &self,
        did: &DidValue,
        key_type: SecretKeyType,
    ) -> Result<SecretString, VaultError>;

    async fn save_secret(
        &self,
        did: &DidValue,
        key_type: SecretKeyType,
        secret: SecretString,
    ) -> Result<(), VaultError>;

    async fn delete_secret(&self, did: &DidValue, key_type: SecretKeyType)
    -> Result<(), VaultError>;
}
