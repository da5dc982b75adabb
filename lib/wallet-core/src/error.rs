use strum::Display;

use crate::config::{ConfigParsingError, ConfigValidationError};
use crate::provider::did_method::DidMethodError;
use crate::provider::http_client;
use crate::provider::metadata_fetcher::MetadataFetchError;
use crate::provider::signer::JwtSignerError;
use crate::provider::vault::VaultError;
use crate::repository::error::DataLayerError;
use crate::util::jwt::JwtError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum ErrorCategory {
    /// Transport error or non-success status of an outgoing HTTP call
    CommunicationFailure,
    DeserializationFailure,
    SerializationFailure,
    /// Malformed JWT, did:key, CBOR or COSE structure
    ParseError,
    ProtocolViolation,
    SignatureInvalid,
    Storage,
    Vault,
    Configuration,
    Cancelled,
}

pub trait ErrorCategoryMixin {
    fn error_category(&self) -> ErrorCategory;
}

impl ErrorCategoryMixin for http_client::Error {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::JsonError(_) => ErrorCategory::DeserializationFailure,
            Self::UrlEncode(_) => ErrorCategory::SerializationFailure,
            Self::HttpError(_) | Self::Other(_) | Self::StatusCodeIsError(_) => {
                ErrorCategory::CommunicationFailure
            }
        }
    }
}

impl ErrorCategoryMixin for MetadataFetchError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::Transport(error) => error.error_category(),
            Self::InvalidResponse(_) => ErrorCategory::DeserializationFailure,
        }
    }
}

impl ErrorCategoryMixin for JwtError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::CouldNotFormat(_) => ErrorCategory::SerializationFailure,
            Self::CouldNotExtract(_) => ErrorCategory::ParseError,
            Self::CouldNotSign(_) => ErrorCategory::Vault,
        }
    }
}

impl ErrorCategoryMixin for DidMethodError {
    fn error_category(&self) -> ErrorCategory {
        ErrorCategory::ParseError
    }
}

impl ErrorCategoryMixin for VaultError {
    fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Vault
    }
}

impl ErrorCategoryMixin for JwtSignerError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::MissingKey | Self::InvalidKey(_) => ErrorCategory::Vault,
            Self::InvalidClaims(_) => ErrorCategory::SerializationFailure,
            Self::Jwt(error) => error.error_category(),
            Self::Vault(error) => error.error_category(),
        }
    }
}

impl ErrorCategoryMixin for DataLayerError {
    fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Storage
    }
}

impl ErrorCategoryMixin for ConfigParsingError {
    fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl ErrorCategoryMixin for ConfigValidationError {
    fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}
