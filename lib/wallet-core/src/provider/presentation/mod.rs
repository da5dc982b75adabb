//! Verifiable presentation assembly for `jwt_vp` tokens, with Presentation Exchange
//! submissions

use std::sync::Arc;

use shared_types::{CredentialId, UserId};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use self::mapper::{credential_entry, credential_subject, presentation_submission};
use self::model::{
    BuiltPresentation, CredentialSelection, PresentationDefinition, PresentationRequest,
    VerifiablePresentation,
};
use crate::error::{ErrorCategory, ErrorCategoryMixin};
use crate::model::credential::{Credential, CredentialStateEnum};
use crate::provider::signer::claims::{VpTokenClaimsInput, vp_token_claims};
use crate::provider::signer::{HolderSigner, JwtSignerError, SigningPurpose};
use crate::repository::credential_repository::CredentialRepository;
use crate::repository::error::DataLayerError;

pub(crate) mod mapper;
pub mod model;

#[cfg(test)]
mod test;

const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("No credential selected")]
    EmptySelection,
    #[error("Credential not found: `{0}`")]
    CredentialNotFound(CredentialId),
    #[error("Credential `{0}` is not valid")]
    CredentialNotValid(CredentialId),
    #[error("No credential matches `{0}`")]
    NoMatchingCredential(String),
    #[error("Credential has no subject")]
    MissingSubject,
    #[error("Invalid credential: `{0}`")]
    InvalidCredential(String),
    #[error("Serialization error: `{0}`")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    DataLayer(#[from] DataLayerError),
    #[error(transparent)]
    Signer(#[from] JwtSignerError),
}

impl ErrorCategoryMixin for PresentationError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::EmptySelection
            | Self::CredentialNotFound(_)
            | Self::CredentialNotValid(_)
            | Self::NoMatchingCredential(_) => ErrorCategory::ProtocolViolation,
            Self::MissingSubject | Self::InvalidCredential(_) => ErrorCategory::ParseError,
            Self::Serialization(_) => ErrorCategory::SerializationFailure,
            Self::DataLayer(error) => error.error_category(),
            Self::Signer(error) => error.error_category(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PresentationParams {
    pub vp_token_ttl: Duration,
    pub leeway: Duration,
}

pub struct PresentationBuilder {
    credential_repository: Arc<dyn CredentialRepository>,
    signer: Arc<HolderSigner>,
    params: PresentationParams,
}

struct SelectedCredentials {
    credentials: Vec<Credential>,
    /// Input descriptor ids, index aligned with `credentials`
    descriptor_ids: Option<(String, Vec<String>)>,
}

impl PresentationBuilder {
    pub fn new(
        credential_repository: Arc<dyn CredentialRepository>,
        signer: Arc<HolderSigner>,
        params: PresentationParams,
    ) -> Self {
        Self {
            credential_repository,
            signer,
            params,
        }
    }

    pub async fn build_presentation(
        &self,
        request: PresentationRequest,
    ) -> Result<BuiltPresentation, PresentationError> {
        let SelectedCredentials {
            credentials,
            descriptor_ids,
        } = self.select(&request.user_id, request.selection).await?;

        let raw_credentials = credentials
            .iter()
            .map(|credential| {
                credential
                    .credential
                    .as_deref()
                    .ok_or(PresentationError::CredentialNotValid(credential.id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let first = raw_credentials
            .first()
            .ok_or(PresentationError::EmptySelection)?;
        let holder_did = credential_subject(first)?;

        let presentation_id = format!("urn:uuid:{}", Uuid::new_v4());
        let presentation = VerifiablePresentation {
            context: vec![CREDENTIALS_V1_CONTEXT.to_owned()],
            id: presentation_id.to_owned(),
            r#type: vec![VERIFIABLE_PRESENTATION_TYPE.to_owned()],
            holder: holder_did.clone(),
            verifiable_credential: raw_credentials
                .iter()
                .copied()
                .map(credential_entry)
                .collect::<Result<_, _>>()?,
        };

        let claims = vp_token_claims(VpTokenClaimsInput {
            holder_did: &holder_did,
            presentation: serde_json::to_value(&presentation)?,
            presentation_id: &presentation_id,
            nonce: request.nonce.as_deref(),
            audience: request.audience.as_deref(),
            now: OffsetDateTime::now_utc(),
            ttl: self.params.vp_token_ttl,
            leeway: self.params.leeway,
        })?;

        let vp_token = self
            .signer
            .sign(claims, &holder_did, SigningPurpose::VpToken)
            .await?;

        tracing::debug!(
            %holder_did,
            credentials = credentials.len(),
            "Built verifiable presentation"
        );

        Ok(BuiltPresentation {
            vp_token,
            presentation_submission: descriptor_ids.map(|(definition_id, descriptor_ids)| {
                presentation_submission(&definition_id, &descriptor_ids)
            }),
            holder_did,
            credential_ids: credentials.iter().map(|credential| credential.id).collect(),
        })
    }

    async fn select(
        &self,
        user_id: &UserId,
        selection: CredentialSelection,
    ) -> Result<SelectedCredentials, PresentationError> {
        let selected = match selection {
            CredentialSelection::Explicit(ids) => {
                let mut credentials = Vec::with_capacity(ids.len());
                for id in ids {
                    let credential = self
                        .credential_repository
                        .get_credential_data_by_id(&id)
                        .await?
                        .filter(|credential| &credential.user_id == user_id)
                        .ok_or(PresentationError::CredentialNotFound(id))?;

                    if credential.state != CredentialStateEnum::Valid {
                        return Err(PresentationError::CredentialNotValid(id));
                    }
                    credentials.push(credential);
                }

                SelectedCredentials {
                    credentials,
                    descriptor_ids: None,
                }
            }
            CredentialSelection::ByTypes(types) => {
                let available = self.valid_credentials(user_id).await?;
                let credentials = types
                    .iter()
                    .try_fold(Vec::new(), |mut selected, required| {
                        let credential =
                            first_unselected(&available, &selected, Some(required.as_str()))
                                .ok_or_else(|| {
                                    PresentationError::NoMatchingCredential(required.to_owned())
                                })?;
                        selected.push(credential);
                        Ok::<_, PresentationError>(selected)
                    })?;

                SelectedCredentials {
                    credentials,
                    descriptor_ids: None,
                }
            }
            CredentialSelection::ByDefinition(definition) => {
                self.select_by_definition(user_id, definition).await?
            }
        };

        if selected.credentials.is_empty() {
            return Err(PresentationError::EmptySelection);
        }

        Ok(selected)
    }

    async fn select_by_definition(
        &self,
        user_id: &UserId,
        definition: PresentationDefinition,
    ) -> Result<SelectedCredentials, PresentationError> {
        let available = self.valid_credentials(user_id).await?;

        let mut credentials = vec![];
        let mut descriptor_ids = vec![];
        for descriptor in &definition.input_descriptors {
            let credential =
                first_unselected(&available, &credentials, descriptor.required_type()).ok_or_else(
                    || PresentationError::NoMatchingCredential(descriptor.id.to_owned()),
                )?;

            credentials.push(credential);
            descriptor_ids.push(descriptor.id.to_owned());
        }

        Ok(SelectedCredentials {
            credentials,
            descriptor_ids: Some((definition.id, descriptor_ids)),
        })
    }

    async fn valid_credentials(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Credential>, PresentationError> {
        Ok(self
            .credential_repository
            .get_credentials_by_user(user_id)
            .await?
            .into_iter()
            .filter(|credential| {
                credential.state == CredentialStateEnum::Valid && credential.credential.is_some()
            })
            .collect())
    }
}

fn first_unselected(
    available: &[Credential],
    selected: &[Credential],
    required_type: Option<&str>,
) -> Option<Credential> {
    available
        .iter()
        .filter(|credential| !selected.iter().any(|other| other.id == credential.id))
        .find(|credential| {
            required_type.is_none_or(|required| credential.types.iter().any(|t| t == required))
        })
        .cloned()
}
