use super::SSIHolderService;
use super::dto::{CreatePresentationRequestDTO, PresentationResponseDTO};
use crate::provider::presentation::model::PresentationRequest;
use crate::provider::verification_protocol::ValidatedAuthorizationRequest;
use crate::service::error::ServiceError;
use crate::util::bearer_token::extract_user_id;

impl SSIHolderService {
    pub async fn create_presentation(
        &self,
        bearer_token: &str,
        request: CreatePresentationRequestDTO,
    ) -> Result<PresentationResponseDTO, ServiceError> {
        let user_id = extract_user_id(bearer_token)?;

        let presentation = self
            .presentation_builder
            .build_presentation(PresentationRequest {
                user_id,
                selection: request.selection,
                nonce: request.nonce,
                audience: request.audience,
            })
            .await?;

        Ok(PresentationResponseDTO {
            vp_token: presentation.vp_token,
            presentation_submission: presentation.presentation_submission,
            holder_did: presentation.holder_did,
            credential_ids: presentation.credential_ids,
        })
    }

    /// Presentation for the offline profile, Base45 text suitable for a QR code
    pub async fn create_cbor_presentation(
        &self,
        bearer_token: &str,
        request: CreatePresentationRequestDTO,
    ) -> Result<String, ServiceError> {
        let presentation = self.create_presentation(bearer_token, request).await?;

        Ok(self
            .cbor_encoder
            .encode_presentation(&presentation.vp_token)?)
    }

    pub fn validate_authorization_request(
        &self,
        request: &str,
    ) -> Result<ValidatedAuthorizationRequest, ServiceError> {
        Ok(self.authorization_request_validator.validate(request)?)
    }
}
