//! `did:key` for P-256 keys, <https://w3c-ccg.github.io/did-method-key/>

use secrecy::{ExposeSecret, SecretString};
use shared_types::{DidValue, DidValueError};
use wallet_crypto::signer::es256::ES256Signer;

use self::mapper::{
    BASE58_BTC_PREFIX, DID_KEY_PREFIX, MULTICODEC_JWK_JCS_PUB, MULTICODEC_P256_PUB,
    decode_multibase, encode_coordinate, encode_multibase, jwk_to_public_key, public_key_to_jwk,
};
use super::DidMethodError;
use crate::config::core_config::DidKeyMode;
use crate::model::key::{PrivateKeyJwkEllipticData, PublicKeyJwk};

mod mapper;


pub struct GeneratedDidKey {
    pub did: DidValue,
    pub public_jwk: PublicKeyJwk,
    /// Serialized private JWK, to be handed over to the vault right away
    pub private_jwk: SecretString,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDidKey {
    /// SEC1 compressed point
    pub public_key: Vec<u8>,
    pub public_jwk: PublicKeyJwk,
}

#[derive(Debug, Default)]
pub struct KeyDidMethod;

impl KeyDidMethod {
    pub fn generate(&self, mode: DidKeyMode) -> Result<GeneratedDidKey, DidMethodError> {
        let key_pair = ES256Signer::generate_key_pair();
        let did = self.did_from_public_key(&key_pair.public, mode)?;
        let public_jwk = public_key_to_jwk(&key_pair.public)?;

        let PublicKeyJwk::Ec(public_data) = &public_jwk;
        let private_jwk = PrivateKeyJwkEllipticData {
            kty: "EC".to_string(),
            crv: public_data.crv.to_owned(),
            x: public_data.x.to_owned(),
            y: public_data
                .y
                .to_owned()
                .ok_or_else(|| DidMethodError::CouldNotCreate("Y is missing".to_string()))?,
            d: encode_coordinate(key_pair.private.expose_secret())?,
        };
        let private_jwk = serde_json::to_string(&private_jwk)
            .map_err(|e| DidMethodError::CouldNotCreate(e.to_string()))?;

        Ok(GeneratedDidKey {
            did,
            public_jwk,
            private_jwk: SecretString::from(private_jwk),
        })
    }

    pub fn did_from_public_key(
        &self,
        public_key: &[u8],
        mode: DidKeyMode,
    ) -> Result<DidValue, DidMethodError> {
        let multibase = match mode {
            DidKeyMode::Standard => {
                let compressed = ES256Signer::parse_public_key(public_key, true)
                    .map_err(|e| DidMethodError::CouldNotCreate(e.to_string()))?;
                encode_multibase(&MULTICODEC_P256_PUB, &compressed)
            }
            DidKeyMode::JwkJcsPub => {
                let jwk = public_key_to_jwk(public_key)?;
                let canonical = serde_json_canonicalizer::to_vec(&jwk)
                    .map_err(|e| DidMethodError::CouldNotCreate(e.to_string()))?;
                encode_multibase(&MULTICODEC_JWK_JCS_PUB, &canonical)
            }
        };

        format!("{DID_KEY_PREFIX}{multibase}")
            .parse()
            .map_err(|e: DidValueError| DidMethodError::CouldNotCreate(e.to_string()))
    }

    /// Decodes the public key embedded in a `did:key` value, a DID URL fragment is ignored
    pub fn resolve(&self, did: &str) -> Result<ResolvedDidKey, DidMethodError> {
        let did = did.split('#').next().unwrap_or_default();
        let multibase = did
            .strip_prefix(DID_KEY_PREFIX)
            .filter(|value| value.starts_with(BASE58_BTC_PREFIX))
            .ok_or_else(|| DidMethodError::ResolutionError(format!("Not a did:key: {did}")))?;

        let decoded = decode_multibase(multibase)?;

        if let Some(point) = decoded.strip_prefix(MULTICODEC_P256_PUB.as_slice()) {
            let public_key = ES256Signer::parse_public_key(point, true)
                .map_err(|e| DidMethodError::ResolutionError(e.to_string()))?;
            let public_jwk = public_key_to_jwk(&public_key)?;

            return Ok(ResolvedDidKey {
                public_key,
                public_jwk,
            });
        }

        if let Some(canonical_jwk) = decoded.strip_prefix(MULTICODEC_JWK_JCS_PUB.as_slice()) {
            let public_jwk: PublicKeyJwk = serde_json::from_slice(canonical_jwk)
                .map_err(|e| DidMethodError::ResolutionError(e.to_string()))?;
            let public_key = jwk_to_public_key(&public_jwk)?;

            return Ok(ResolvedDidKey {
                public_key,
                public_jwk,
            });
        }

        Err(DidMethodError::ResolutionError(
            "Unsupported multicodec".to_string(),
        ))
    }

    /// `did:key:z...#z...`, the single verification method of a `did:key` document
    pub fn verification_method_id(&self, did: &DidValue) -> String {
        format!("{did}#{}", did.method_specific_id())
    }
}
