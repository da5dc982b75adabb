use shared_types::{CredentialId, DidValue};

use crate::model::credential::CredentialStateEnum;
use crate::provider::issuance_protocol::openid4vci::model::IssuanceVariant;
use crate::provider::presentation::model::{
    CredentialSelection, PresentationSubmissionMappingDTO,
};

#[derive(Clone, Debug)]
pub struct HandleCredentialOfferRequestDTO {
    /// `openid-credential-offer://` URL or plain URL of the offer document
    pub offer: String,
    pub tx_code: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CredentialOfferResultDTO {
    pub holder_did: DidValue,
    pub variant: IssuanceVariant,
    /// In the order of the offer
    pub credentials: Vec<StoredCredentialDTO>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredCredentialDTO {
    pub id: CredentialId,
    pub format: String,
    pub types: Vec<String>,
    pub state: CredentialStateEnum,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeferredCredentialResultDTO {
    Pending,
    Issued(StoredCredentialDTO),
}

#[derive(Clone, Debug)]
pub struct CreatePresentationRequestDTO {
    pub selection: CredentialSelection,
    pub nonce: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PresentationResponseDTO {
    pub vp_token: String,
    pub presentation_submission: Option<PresentationSubmissionMappingDTO>,
    pub holder_did: DidValue,
    pub credential_ids: Vec<CredentialId>,
}
