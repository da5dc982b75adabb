use ct_codecs::{Base64UrlSafeNoPadding, Decoder};
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use serde_json::{Map, Value};
use shared_types::DidValue;
use wallet_crypto::Signer;
use wallet_crypto::signer::es256::ES256Signer;

use super::{JwtSigner, JwtSignerError, SigningPurpose};
use crate::model::key::PrivateKeyJwkEllipticData;
use crate::provider::did_method::key::KeyDidMethod;
use crate::util::jwt::Jwt;
use crate::util::jwt::model::JWTPayload;

const ALGORITHM: &str = "ES256";

/// In-process ES256 signer operating on a private JWK
#[derive(Default)]
pub struct LocalJwtSigner {
    did_method: KeyDidMethod,
}

#[async_trait::async_trait]
impl JwtSigner for LocalJwtSigner {
    async fn sign(
        &self,
        claims: Value,
        did: &DidValue,
        purpose: SigningPurpose,
        private_key: Option<SecretString>,
    ) -> Result<String, JwtSignerError> {
        let private_key = private_key.ok_or(JwtSignerError::MissingKey)?;
        let private_jwk: PrivateKeyJwkEllipticData =
            serde_json::from_str(private_key.expose_secret())
                .map_err(|e| JwtSignerError::InvalidKey(e.to_string()))?;
        if private_jwk.kty != "EC" || private_jwk.crv != "P-256" {
            return Err(JwtSignerError::InvalidKey(format!(
                "Unsupported key {}/{}",
                private_jwk.kty, private_jwk.crv
            )));
        }

        let private_key: SecretSlice<u8> =
            Base64UrlSafeNoPadding::decode_to_vec(&private_jwk.d, None)
                .map_err(|e| JwtSignerError::InvalidKey(e.to_string()))?
                .into();
        let key_pair = ES256Signer::parse_private_key(&private_key)
            .map_err(|e| JwtSignerError::InvalidKey(e.to_string()))?;

        let payload: JWTPayload<Map<String, Value>> = serde_json::from_value(claims)?;
        let jwt = Jwt::new(
            purpose.token_type().to_string(),
            ALGORITHM.to_string(),
            Some(self.did_method.verification_method_id(did)),
            payload,
        );

        Ok(jwt.tokenize(Box::new(move |input| {
            ES256Signer.sign(input, &key_pair.public, &key_pair.private)
        }))?)
    }
}
