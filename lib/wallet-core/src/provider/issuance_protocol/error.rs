use thiserror::Error;
use wallet_crypto::HasherError;

use crate::error::{ErrorCategory, ErrorCategoryMixin};
use crate::provider::did_method::DidMethodError;
use crate::provider::metadata_fetcher::MetadataFetchError;
use crate::provider::presentation::PresentationError;
use crate::provider::signer::JwtSignerError;
use crate::provider::vault::VaultError;
use crate::util::jwt::JwtError;

#[derive(Debug, Error)]
pub enum IssuanceProtocolError {
    #[error("Issuance protocol failure: `{0}`")]
    Failed(String),
    #[error("Transport error: `{0}`")]
    Transport(anyhow::Error),
    #[error("JSON error: `{0}`")]
    JsonError(serde_json::Error),
    #[error("URL encoding error: `{0}`")]
    UrlEncoding(#[from] serde_urlencoded::ser::Error),
    #[error("Invalid credential offer: `{0}`")]
    InvalidOffer(String),
    #[error("Invalid credential: `{0}`")]
    InvalidCredential(String),
    #[error("Protocol violation: `{0}`")]
    ProtocolViolation(String),
    #[error("State mismatch")]
    StateMismatch,
    #[error("Unknown response_type: `{0}`")]
    UnknownResponseType(String),
    #[error(transparent)]
    TxCode(TxCodeError),
    #[error("Deferred polling cancelled")]
    Cancelled,
    #[error("PKCE error: `{0}`")]
    Pkce(#[from] HasherError),
    #[error(transparent)]
    MetadataFetch(#[from] MetadataFetchError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    DidMethod(#[from] DidMethodError),
    #[error(transparent)]
    Signer(#[from] JwtSignerError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
}

#[derive(Debug, Error)]
pub enum TxCodeError {
    #[error("Incorrect tx_code")]
    IncorrectCode,
    #[error("Invalid use of tx_code")]
    InvalidCodeUse,
}

impl ErrorCategoryMixin for IssuanceProtocolError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::TxCode(_) => ErrorCategory::CommunicationFailure,
            Self::JsonError(_) | Self::InvalidOffer(_) => ErrorCategory::DeserializationFailure,
            Self::InvalidCredential(_) => ErrorCategory::ParseError,
            Self::Failed(_)
            | Self::ProtocolViolation(_)
            | Self::StateMismatch
            | Self::UnknownResponseType(_) => ErrorCategory::ProtocolViolation,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Pkce(_) | Self::UrlEncoding(_) => ErrorCategory::SerializationFailure,
            Self::MetadataFetch(error) => error.error_category(),
            Self::Jwt(error) => error.error_category(),
            Self::DidMethod(error) => error.error_category(),
            Self::Signer(error) => error.error_category(),
            Self::Vault(error) => error.error_category(),
            Self::Presentation(error) => error.error_category(),
        }
    }
}
