//! Cryptographic primitives used by the wallet engine: P-256 ECDSA signing, SHA-256 hashing
//! and random value generation.

use secrecy::SecretSlice;
use thiserror::Error;

pub mod hasher;
pub mod signer;
pub mod utilities;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("Could not sign: `{0}`")]
    CouldNotSign(String),
    #[error("Could not extract keypair")]
    CouldNotExtractKeyPair,
    #[error("Could not extract public key: `{0}`")]
    CouldNotExtractPublicKey(String),
    #[error("Invalid signature")]
    InvalidSignature,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum HasherError {
    #[error("Could not hash")]
    CouldNotHash,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        input: &[u8],
        public_key: &[u8],
        private_key: &SecretSlice<u8>,
    ) -> Result<Vec<u8>, SignerError>;

    fn verify(&self, input: &[u8], signature: &[u8], public_key: &[u8])
    -> Result<(), SignerError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Hasher: Send + Sync {
    fn hash_base64_url(&self, input: &[u8]) -> Result<String, HasherError>;
    fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError>;
}
