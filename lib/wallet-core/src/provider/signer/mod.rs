use std::sync::Arc;

use secrecy::SecretString;
use shared_types::DidValue;
use strum::Display;
use thiserror::Error;

use crate::provider::vault::{SecretKeyType, Vault, VaultError};
use crate::util::jwt::JwtError;

pub mod claims;
pub mod local;


#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum SigningPurpose {
    #[strum(serialize = "PROOF_OF_POSSESSION")]
    ProofOfPossession,
    #[strum(serialize = "ID_TOKEN")]
    IdToken,
    #[strum(serialize = "VP_TOKEN")]
    VpToken,
}

impl SigningPurpose {
    /// JOSE `typ` header value
    pub fn token_type(&self) -> &'static str {
        match self {
            SigningPurpose::ProofOfPossession => "openid4vci-proof+jwt",
            SigningPurpose::IdToken | SigningPurpose::VpToken => "JWT",
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtSignerError {
    #[error("Missing private key")]
    MissingKey,
    #[error("Invalid private key: `{0}`")]
    InvalidKey(String),
    #[error("Invalid claims: `{0}`")]
    InvalidClaims(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Produces a compact JWS over the given claims on behalf of `did`
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait JwtSigner: Send + Sync {
    async fn sign(
        &self,
        claims: serde_json::Value,
        did: &DidValue,
        purpose: SigningPurpose,
        private_key: Option<SecretString>,
    ) -> Result<String, JwtSignerError>;
}

/// Signs with the holder key, loaded from the vault right before every signature
pub struct HolderSigner {
    jwt_signer: Arc<dyn JwtSigner>,
    vault: Arc<dyn Vault>,
}

impl HolderSigner {
    pub fn new(jwt_signer: Arc<dyn JwtSigner>, vault: Arc<dyn Vault>) -> Self {
        Self { jwt_signer, vault }
    }

    pub async fn sign(
        &self,
        claims: serde_json::Value,
        did: &DidValue,
        purpose: SigningPurpose,
    ) -> Result<String, JwtSignerError> {
        let private_key = self
            .vault
            .get_secret(did, SecretKeyType::PrivateJwk)
            .await?;

        tracing::debug!(%did, %purpose, "Signing JWT");
        self.jwt_signer
            .sign(claims, did, purpose, Some(private_key))
            .await
    }
}
