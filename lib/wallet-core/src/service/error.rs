use shared_types::CredentialId;
use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::error::{ErrorCategory, ErrorCategoryMixin};
use crate::provider::cbor_presentation::CborEncodingError;
use crate::provider::issuance_protocol::error::IssuanceProtocolError;
use crate::provider::presentation::PresentationError;
use crate::provider::vault::VaultError;
use crate::provider::verification_protocol::ValidationError;
use crate::repository::error::DataLayerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized: `{0}`")]
    Unauthorized(String),

    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFoundError),

    #[error(transparent)]
    BusinessLogic(#[from] BusinessLogicError),

    #[error(transparent)]
    IssuanceProtocol(#[from] IssuanceProtocolError),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
    #[error(transparent)]
    AuthorizationRequest(#[from] ValidationError),
    #[error(transparent)]
    CborEncoding(#[from] CborEncodingError),

    #[error(transparent)]
    Repository(#[from] DataLayerError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error("Config validation error `{0}`")]
    ConfigValidation(#[from] ConfigValidationError),
}

#[derive(Debug, Error)]
pub enum EntityNotFoundError {
    #[error("Credential `{0}` not found")]
    Credential(CredentialId),

    #[error("Deferred issuance of credential `{0}` not found")]
    DeferredCredential(CredentialId),
}

#[derive(Debug, Error)]
pub enum BusinessLogicError {
    #[error("Credential `{0}` is not awaiting deferred issuance")]
    CredentialNotDeferred(CredentialId),

    #[error("Deferred credential without deferred_credential_endpoint")]
    MissingDeferredEndpoint,
}

impl ErrorCategoryMixin for ServiceError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized(_) | Self::BusinessLogic(_) => ErrorCategory::ProtocolViolation,
            Self::EntityNotFound(_) => ErrorCategory::Storage,
            Self::IssuanceProtocol(error) => error.error_category(),
            Self::Presentation(error) => error.error_category(),
            Self::AuthorizationRequest(error) => error.error_category(),
            Self::CborEncoding(error) => error.error_category(),
            Self::Repository(error) => error.error_category(),
            Self::Vault(error) => error.error_category(),
            Self::ConfigValidation(error) => error.error_category(),
        }
    }
}
