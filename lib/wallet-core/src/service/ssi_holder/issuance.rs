use secrecy::ExposeSecret;
use shared_types::{CredentialId, DeferredCredentialId, UserId};
use time::OffsetDateTime;

use super::SSIHolderService;
use super::dto::{
    CredentialOfferResultDTO, DeferredCredentialResultDTO, HandleCredentialOfferRequestDTO,
    StoredCredentialDTO,
};
use crate::model::credential::{Credential, CredentialStateEnum};
use crate::model::deferred_credential::DeferredCredentialMetadata;
use crate::provider::issuance_protocol::openid4vci::model::{
    CredentialOutcome, DeferredPollOutcome,
};
use crate::provider::issuance_protocol::openid4vci::resolve_types;
use crate::provider::vault::{SecretKeyType, VaultError};
use crate::service::error::{BusinessLogicError, EntityNotFoundError, ServiceError};
use crate::util::bearer_token::extract_user_id;

impl SSIHolderService {
    /// Resolves the offer, runs the issuance and stores every received or deferred credential
    pub async fn handle_credential_offer(
        &self,
        bearer_token: &str,
        request: HandleCredentialOfferRequestDTO,
    ) -> Result<CredentialOfferResultDTO, ServiceError> {
        let user_id = extract_user_id(bearer_token)?;

        let offer = self.issuance_protocol.resolve_offer(&request.offer).await?;

        let cancellation = self.cancellation.child_token();
        let accepted = self
            .issuance_protocol
            .holder_accept_offer(&offer, &user_id, request.tx_code, &cancellation)
            .await?;

        let mut credentials = Vec::with_capacity(accepted.credentials.len());
        for outcome in accepted.credentials {
            let now = OffsetDateTime::now_utc();

            let credential = match outcome {
                CredentialOutcome::Immediate(received) => {
                    let credential = Credential {
                        id: CredentialId::new_v4(),
                        created_date: now,
                        last_modified: now,
                        user_id: user_id.to_owned(),
                        format: received.format,
                        types: received.types,
                        credential: Some(received.credential),
                        state: CredentialStateEnum::Valid,
                        holder_did: accepted.holder_did.to_owned(),
                    };
                    self.credential_repository
                        .save_credential(credential.clone())
                        .await?;

                    credential
                }
                CredentialOutcome::Deferred(pending) => {
                    let deferred_endpoint = accepted
                        .deferred_endpoint
                        .to_owned()
                        .ok_or(BusinessLogicError::MissingDeferredEndpoint)?;

                    let credential = Credential {
                        id: CredentialId::new_v4(),
                        created_date: now,
                        last_modified: now,
                        user_id: user_id.to_owned(),
                        format: pending.format,
                        types: pending.types,
                        credential: None,
                        state: CredentialStateEnum::Issued,
                        holder_did: accepted.holder_did.to_owned(),
                    };
                    self.credential_repository
                        .save_credential(credential.clone())
                        .await?;

                    self.deferred_credential_repository
                        .save_deferred_metadata(DeferredCredentialMetadata {
                            id: DeferredCredentialId::new_v4(),
                            created_date: now,
                            last_modified: now,
                            credential_id: credential.id,
                            transaction_id: pending.transaction_id,
                            access_token: accepted.access_token.expose_secret().to_owned(),
                            deferred_endpoint,
                        })
                        .await?;

                    credential
                }
            };

            tracing::info!(
                credential_id = %credential.id,
                state = %credential.state,
                "Stored credential"
            );
            credentials.push(StoredCredentialDTO::from(&credential));
        }

        Ok(CredentialOfferResultDTO {
            holder_did: accepted.holder_did,
            variant: accepted.variant,
            credentials,
        })
    }

    /// Single poll of a deferred credential, the caller decides when to retry
    pub async fn poll_deferred_credential(
        &self,
        bearer_token: &str,
        credential_id: &CredentialId,
    ) -> Result<DeferredCredentialResultDTO, ServiceError> {
        let user_id = extract_user_id(bearer_token)?;
        let mut credential = self.get_owned_credential(&user_id, credential_id).await?;

        if credential.state != CredentialStateEnum::Issued {
            return Err(BusinessLogicError::CredentialNotDeferred(*credential_id).into());
        }

        let metadata = self
            .deferred_credential_repository
            .get_deferred_metadata_by_credential_id(credential_id)
            .await?
            .ok_or(EntityNotFoundError::DeferredCredential(*credential_id))?;

        let outcome = self
            .issuance_protocol
            .holder_request_deferred_credential(
                &metadata.deferred_endpoint,
                &metadata.access_token,
                &metadata.transaction_id,
            )
            .await?;

        match outcome {
            DeferredPollOutcome::Pending { transaction_id } => {
                if transaction_id != metadata.transaction_id {
                    self.deferred_credential_repository
                        .update_deferred_metadata_transaction_id(&metadata.id, &transaction_id)
                        .await?;
                }

                tracing::debug!(%credential_id, "Deferred credential still pending");
                Ok(DeferredCredentialResultDTO::Pending)
            }
            DeferredPollOutcome::Issued { credential: raw } => {
                credential.types = resolve_types(std::mem::take(&mut credential.types), &raw);
                credential.credential = Some(raw);
                credential.state = CredentialStateEnum::Valid;
                credential.last_modified = OffsetDateTime::now_utc();

                self.credential_repository
                    .save_credential(credential.clone())
                    .await?;
                self.deferred_credential_repository
                    .delete_deferred_metadata(&metadata.id)
                    .await?;

                tracing::info!(%credential_id, "Deferred credential issued");
                Ok(DeferredCredentialResultDTO::Issued(StoredCredentialDTO::from(
                    &credential,
                )))
            }
        }
    }

    pub async fn get_credentials(
        &self,
        bearer_token: &str,
    ) -> Result<Vec<StoredCredentialDTO>, ServiceError> {
        let user_id = extract_user_id(bearer_token)?;

        Ok(self
            .credential_repository
            .get_credentials_by_user(&user_id)
            .await?
            .iter()
            .map(StoredCredentialDTO::from)
            .collect())
    }

    /// Removes the credential with its deferred issuance state. The holder key goes too once
    /// no other credential of the user is bound to it.
    pub async fn delete_credential(
        &self,
        bearer_token: &str,
        credential_id: &CredentialId,
    ) -> Result<(), ServiceError> {
        let user_id = extract_user_id(bearer_token)?;
        let credential = self.get_owned_credential(&user_id, credential_id).await?;

        if let Some(metadata) = self
            .deferred_credential_repository
            .get_deferred_metadata_by_credential_id(credential_id)
            .await?
        {
            self.deferred_credential_repository
                .delete_deferred_metadata(&metadata.id)
                .await?;
        }

        self.credential_repository
            .delete_credential(credential_id)
            .await?;

        let holder_did_in_use = self
            .credential_repository
            .get_credentials_by_user(&user_id)
            .await?
            .iter()
            .any(|other| other.holder_did == credential.holder_did);

        if !holder_did_in_use {
            match self
                .vault
                .delete_secret(&credential.holder_did, SecretKeyType::PrivateJwk)
                .await
            {
                Ok(()) => {}
                Err(VaultError::NotFound(did)) => {
                    tracing::warn!(%did, "Holder key already removed");
                }
                Err(error) => return Err(error.into()),
            }
        }

        tracing::info!(%credential_id, "Deleted credential");
        Ok(())
    }

    async fn get_owned_credential(
        &self,
        user_id: &UserId,
        credential_id: &CredentialId,
    ) -> Result<Credential, ServiceError> {
        self.credential_repository
            .get_credential_data_by_id(credential_id)
            .await?
            .filter(|credential| &credential.user_id == user_id)
            .ok_or_else(|| EntityNotFoundError::Credential(*credential_id).into())
    }
}
