//! Validation of signed OpenID4VP authorization requests (JAR, RFC 9101) issued by verifiers
//! identified with `did:key`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use wallet_crypto::signer::es256::ES256Signer;
use wallet_crypto::{Signer, SignerError};

use crate::error::{ErrorCategory, ErrorCategoryMixin};
use crate::provider::did_method::DidMethodError;
use crate::provider::did_method::key::KeyDidMethod;
use crate::provider::presentation::model::PresentationDefinition;
use crate::util::jwt::{Jwt, JwtError};

#[cfg(test)]
mod test;

pub const AUTHORIZATION_REQUEST_TOKEN_TYPE: &str = "oauth-authz-req+jwt";
const DID_KEY_BASE58_PREFIX: &str = "did:key:z";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Malformed authorization request: `{0}`")]
    MalformedRequest(#[from] JwtError),
    #[error("Invalid token type: `{0:?}`")]
    InvalidTokenType(Option<String>),
    #[error("client_id `{client_id:?}` does not match iss `{issuer:?}`")]
    ClientIdMismatch {
        client_id: Option<String>,
        issuer: Option<String>,
    },
    #[error("Missing key id")]
    MissingKeyId,
    #[error("Unsupported key id: `{0}`")]
    UnsupportedKeyId(String),
    #[error("Key resolution error: `{0}`")]
    KeyResolution(#[from] DidMethodError),
    #[error("Invalid presentation definition: `{0}`")]
    InvalidPresentationDefinition(serde_json::Error),
    #[error("Invalid signature: `{0}`")]
    InvalidSignature(SignerError),
}

impl ErrorCategoryMixin for ValidationError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::MalformedRequest(_)
            | Self::MissingKeyId
            | Self::UnsupportedKeyId(_)
            | Self::KeyResolution(_) => ErrorCategory::ParseError,
            Self::InvalidPresentationDefinition(_) => ErrorCategory::DeserializationFailure,
            Self::InvalidTokenType(_) | Self::ClientIdMismatch { .. } => {
                ErrorCategory::ProtocolViolation
            }
            Self::InvalidSignature(_) => ErrorCategory::SignatureInvalid,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AuthorizationRequestClaims {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    response_type: Option<String>,
    #[serde(default)]
    response_mode: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    response_uri: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    nonce: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    presentation_definition: Option<Value>,
    #[serde(default)]
    presentation_definition_uri: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ValidatedAuthorizationRequest {
    pub client_id: String,
    /// Verifier DID URL the request was verified with
    pub key_id: String,
    pub response_type: Option<String>,
    pub response_mode: Option<String>,
    pub redirect_uri: Option<String>,
    pub response_uri: Option<String>,
    pub scope: Option<String>,
    pub nonce: Option<String>,
    pub state: Option<String>,
    pub presentation_definition: Option<PresentationDefinition>,
    pub presentation_definition_uri: Option<String>,
}

#[derive(Debug, Default)]
pub struct AuthorizationRequestValidator {
    did_method: KeyDidMethod,
}

impl AuthorizationRequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header and claim checks run before the key is resolved, the signature is verified last
    pub fn validate(
        &self,
        request: &str,
    ) -> Result<ValidatedAuthorizationRequest, ValidationError> {
        let token = Jwt::<AuthorizationRequestClaims>::decompose_token(request)?;

        if token.header.r#type.as_deref() != Some(AUTHORIZATION_REQUEST_TOKEN_TYPE) {
            return Err(ValidationError::InvalidTokenType(token.header.r#type));
        }

        let client_id = match (&token.payload.custom.client_id, &token.payload.issuer) {
            (Some(client_id), Some(issuer)) if client_id == issuer => client_id.to_owned(),
            (client_id, issuer) => {
                return Err(ValidationError::ClientIdMismatch {
                    client_id: client_id.to_owned(),
                    issuer: issuer.to_owned(),
                });
            }
        };

        let key_id = token.header.key_id.ok_or(ValidationError::MissingKeyId)?;
        if !key_id.starts_with(DID_KEY_BASE58_PREFIX) {
            return Err(ValidationError::UnsupportedKeyId(key_id));
        }

        let verifier_key = self.did_method.resolve(&key_id)?;

        ES256Signer
            .verify(
                token.unverified_jwt.as_bytes(),
                &token.signature,
                &verifier_key.public_key,
            )
            .map_err(ValidationError::InvalidSignature)?;

        tracing::debug!(%client_id, "Authorization request signature verified");

        let claims = token.payload.custom;
        let presentation_definition = claims
            .presentation_definition
            .map(serde_json::from_value)
            .transpose()
            .map_err(ValidationError::InvalidPresentationDefinition)?;

        Ok(ValidatedAuthorizationRequest {
            client_id,
            key_id,
            response_type: claims.response_type,
            response_mode: claims.response_mode,
            redirect_uri: claims.redirect_uri,
            response_uri: claims.response_uri,
            scope: claims.scope,
            nonce: claims.nonce,
            state: claims.state,
            presentation_definition,
            presentation_definition_uri: claims.presentation_definition_uri,
        })
    }
}
