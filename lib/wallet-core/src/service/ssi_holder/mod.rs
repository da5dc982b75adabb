use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::provider::cbor_presentation::CborPresentationEncoder;
use crate::provider::issuance_protocol::IssuanceProtocol;
use crate::provider::presentation::PresentationBuilder;
use crate::provider::vault::Vault;
use crate::provider::verification_protocol::AuthorizationRequestValidator;
use crate::repository::credential_repository::CredentialRepository;
use crate::repository::deferred_credential_repository::DeferredCredentialRepository;

pub mod dto;
pub mod issuance;
pub mod presentation;

mod mapper;


/// Orchestrates the holder flows and persists their results
#[derive(Clone)]
pub struct SSIHolderService {
    credential_repository: Arc<dyn CredentialRepository>,
    deferred_credential_repository: Arc<dyn DeferredCredentialRepository>,
    issuance_protocol: Arc<dyn IssuanceProtocol>,
    presentation_builder: Arc<PresentationBuilder>,
    vault: Arc<dyn Vault>,
    cbor_encoder: Arc<CborPresentationEncoder>,
    authorization_request_validator: Arc<AuthorizationRequestValidator>,
    /// Parent of the per-flow tokens
    cancellation: CancellationToken,
}

impl SSIHolderService {
    pub(crate) fn new(
        credential_repository: Arc<dyn CredentialRepository>,
        deferred_credential_repository: Arc<dyn DeferredCredentialRepository>,
        issuance_protocol: Arc<dyn IssuanceProtocol>,
        presentation_builder: Arc<PresentationBuilder>,
        vault: Arc<dyn Vault>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            credential_repository,
            deferred_credential_repository,
            issuance_protocol,
            presentation_builder,
            vault,
            cbor_encoder: Arc::new(CborPresentationEncoder),
            authorization_request_validator: Arc::new(AuthorizationRequestValidator::new()),
            cancellation,
        }
    }
}
