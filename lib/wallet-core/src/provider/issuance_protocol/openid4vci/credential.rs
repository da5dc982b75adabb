use anyhow::Context;
use shared_types::DidValue;
use time::OffsetDateTime;

use super::mapper::parse_received_credential;
use super::model::{
    CredentialOutcome, IssuanceVariant, OpenID4VCICredentialDefinitionDTO,
    OpenID4VCICredentialRequestDTO, OpenID4VCICredentialResponseDTO,
    OpenID4VCIIssuerMetadataResponseDTO, OpenID4VCIProofRequestDTO, PendingCredential,
    ReceivedCredential, RequestedCredential,
};
use super::{OpenID4VCIHolder, resolve_types};
use crate::provider::http_client::{self, StatusCode};
use crate::provider::issuance_protocol::error::IssuanceProtocolError;
use crate::provider::signer::SigningPurpose;
use crate::provider::signer::claims::proof_of_possession_claims;

const PROOF_TYPE_JWT: &str = "jwt";

impl OpenID4VCIHolder {
    /// Requests a single credential, returning the outcome and the next `c_nonce`
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn holder_request_credential(
        &self,
        variant: IssuanceVariant,
        issuer_metadata: &OpenID4VCIIssuerMetadataResponseDTO,
        access_token: &str,
        requested: &RequestedCredential,
        holder_did: &DidValue,
        proof_issuer: Option<&str>,
        nonce: Option<&str>,
    ) -> Result<(CredentialOutcome, Option<String>), IssuanceProtocolError> {
        let proof_required = match variant {
            IssuanceVariant::Dome => requested
                .binding_methods
                .as_ref()
                .is_some_and(|methods| !methods.is_empty()),
            IssuanceVariant::Standard | IssuanceVariant::LegacyEbsi => true,
        };

        let proof = if proof_required {
            let claims = proof_of_possession_claims(
                proof_issuer,
                &issuer_metadata.credential_issuer,
                nonce,
                OffsetDateTime::now_utc(),
            )
            .map_err(IssuanceProtocolError::JsonError)?;

            Some(OpenID4VCIProofRequestDTO {
                proof_type: PROOF_TYPE_JWT.to_owned(),
                jwt: self
                    .signer
                    .sign(claims, holder_did, SigningPurpose::ProofOfPossession)
                    .await?,
            })
        } else {
            None
        };

        let body = match (variant, &requested.configuration_id) {
            (IssuanceVariant::Dome, Some(configuration_id)) => OpenID4VCICredentialRequestDTO {
                format: requested.format.to_owned(),
                types: None,
                credential_definition: None,
                credential_configuration_id: Some(configuration_id.to_owned()),
                proof,
            },
            _ => OpenID4VCICredentialRequestDTO {
                format: requested.format.to_owned(),
                types: Some(requested.types.to_owned()),
                credential_definition: Some(OpenID4VCICredentialDefinitionDTO {
                    r#type: requested.types.to_owned(),
                }),
                credential_configuration_id: None,
                proof,
            },
        };

        let (status, response) = self
            .post_credential_request(&issuer_metadata.credential_endpoint, access_token, &body)
            .await?;

        let next_nonce = response.c_nonce.to_owned();
        let outcome = classify_credential_response(status, response, requested)?;

        match &outcome {
            CredentialOutcome::Immediate(credential) => {
                tracing::info!(format = %credential.format, "Credential issued");
            }
            CredentialOutcome::Deferred(_) => {
                tracing::info!(format = %requested.format, "Credential issuance deferred");
            }
        }

        Ok((outcome, next_nonce))
    }

    async fn post_credential_request(
        &self,
        credential_endpoint: &str,
        access_token: &str,
        body: &OpenID4VCICredentialRequestDTO,
    ) -> Result<(StatusCode, OpenID4VCICredentialResponseDTO), IssuanceProtocolError> {
        let response = self
            .client
            .post(credential_endpoint)
            .bearer_auth(access_token)
            .json(body)
            .context("json error")
            .map_err(IssuanceProtocolError::Transport)?
            .send()
            .await
            .context("send error")
            .map_err(IssuanceProtocolError::Transport)?
            .error_for_status()
            .context("status error")
            .map_err(IssuanceProtocolError::Transport)?;

        let status = response.status;
        let response = response.json().map_err(|e| match e {
            http_client::Error::JsonError(error) => IssuanceProtocolError::JsonError(error),
            other => IssuanceProtocolError::Transport(other.into()),
        })?;

        Ok((status, response))
    }
}

/// `202 Accepted` with a transaction id is deferred, everything else must carry the credential
pub(super) fn classify_credential_response(
    status: StatusCode,
    response: OpenID4VCICredentialResponseDTO,
    requested: &RequestedCredential,
) -> Result<CredentialOutcome, IssuanceProtocolError> {
    let format = response
        .format
        .unwrap_or_else(|| requested.format.to_owned());

    match (status, response.transaction_id, response.credential) {
        (StatusCode::ACCEPTED, Some(transaction_id), _) => {
            Ok(CredentialOutcome::Deferred(PendingCredential {
                format,
                types: requested.types.to_owned(),
                transaction_id,
            }))
        }
        (_, _, Some(credential)) => {
            let credential = parse_received_credential(credential)?;
            Ok(CredentialOutcome::Immediate(ReceivedCredential {
                format,
                types: resolve_types(requested.types.to_owned(), &credential),
                credential,
            }))
        }
        _ => Err(IssuanceProtocolError::ProtocolViolation(
            "Credential response carries neither credential nor transaction_id".to_string(),
        )),
    }
}
