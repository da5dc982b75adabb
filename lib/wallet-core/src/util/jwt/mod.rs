use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use wallet_crypto::SignerError;

use self::mapper::{b64url_to_bin, bin_to_b64url_string, string_to_b64url_string};
use self::model::{DecomposedToken, JWTHeader, JWTPayload};

pub mod mapper;
pub mod model;

#[cfg(test)]
mod test;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Could not format: `{0}`")]
    CouldNotFormat(String),
    #[error("Could not extract token: `{0}`")]
    CouldNotExtract(String),
    #[error("Could not sign: `{0}`")]
    CouldNotSign(String),
}

pub type AuthenticationFn<'a> = Box<dyn FnOnce(&[u8]) -> Result<Vec<u8>, SignerError> + Send + 'a>;

#[derive(Debug)]
pub struct Jwt<Payload> {
    pub header: JWTHeader,
    pub payload: JWTPayload<Payload>,
}

impl<Payload: Serialize + DeserializeOwned + Debug> Jwt<Payload> {
    pub fn new(
        signature_type: String,
        algorithm: String,
        key_id: Option<String>,
        payload: JWTPayload<Payload>,
    ) -> Jwt<Payload> {
        let header = JWTHeader {
            algorithm,
            key_id,
            r#type: Some(signature_type),
            jwk: None,
        };

        Jwt { header, payload }
    }

    pub fn tokenize(&self, auth_fn: AuthenticationFn) -> Result<String, JwtError> {
        let jwt_header_json = serde_json::to_string(&self.header)
            .map_err(|e| JwtError::CouldNotFormat(e.to_string()))?;
        let payload_json = serde_json::to_string(&self.payload)
            .map_err(|e| JwtError::CouldNotFormat(e.to_string()))?;
        let mut token = format!(
            "{}.{}",
            string_to_b64url_string(&jwt_header_json)?,
            string_to_b64url_string(&payload_json)?,
        );

        let signature =
            auth_fn(token.as_bytes()).map_err(|e| JwtError::CouldNotSign(e.to_string()))?;

        if !signature.is_empty() {
            let signature_encoded = bin_to_b64url_string(&signature)?;

            token.push('.');
            token.push_str(&signature_encoded);
        }

        Ok(token)
    }

    pub fn decompose_token(token: &str) -> Result<DecomposedToken<Payload>, JwtError> {
        let token = token.trim_matches(|c: char| c == '.' || c.is_whitespace());
        let mut jwt_parts = token.splitn(3, '.');

        let (Some(header), Some(payload), Some(signature)) =
            (jwt_parts.next(), jwt_parts.next(), jwt_parts.next())
        else {
            return Err(JwtError::CouldNotExtract("Missing token part".to_owned()));
        };

        let header_decoded = b64url_to_bin(header)?;
        let header_parsed: JWTHeader = serde_json::from_slice(&header_decoded)
            .map_err(|e| JwtError::CouldNotExtract(e.to_string()))?;

        let payload_decoded = b64url_to_bin(payload)?;
        let payload_parsed: JWTPayload<Payload> = serde_json::from_slice(&payload_decoded)
            .map_err(|e| JwtError::CouldNotExtract(e.to_string()))?;

        let signature = b64url_to_bin(signature)?;

        Ok(DecomposedToken {
            header: header_parsed,
            payload: payload_parsed,
            signature,
            unverified_jwt: format!("{header}.{payload}"),
        })
    }
}

/// Decodes the payload of a compact JWT into raw JSON without checking the signature
pub fn decode_payload_json(token: &str) -> Result<serde_json::Value, JwtError> {
    let payload = token
        .trim()
        .split('.')
        .nth(1)
        .ok_or_else(|| JwtError::CouldNotExtract("Missing token part".to_owned()))?;

    serde_json::from_slice(&b64url_to_bin(payload)?)
        .map_err(|e| JwtError::CouldNotExtract(e.to_string()))
}
