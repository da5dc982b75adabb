use anyhow::Context;
use tokio_util::sync::CancellationToken;

use super::OpenID4VCIHolder;
use super::mapper::parse_received_credential;
use super::model::{
    DeferredPollOutcome, OpenID4VCICredentialResponseDTO, OpenID4VCIDeferredCredentialRequestDTO,
};
use crate::provider::http_client;
use crate::provider::issuance_protocol::error::IssuanceProtocolError;

impl OpenID4VCIHolder {
    /// Single deferred credential request, the caller decides when to ask again
    pub async fn holder_request_deferred_credential(
        &self,
        deferred_endpoint: &str,
        access_token: &str,
        transaction_id: &str,
    ) -> Result<DeferredPollOutcome, IssuanceProtocolError> {
        let response: OpenID4VCICredentialResponseDTO = self
            .client
            .post(deferred_endpoint)
            .bearer_auth(access_token)
            .json(OpenID4VCIDeferredCredentialRequestDTO {
                transaction_id: transaction_id.to_owned(),
            })
            .context("json error")
            .map_err(IssuanceProtocolError::Transport)?
            .send()
            .await
            .context("send error")
            .map_err(IssuanceProtocolError::Transport)?
            .error_for_status()
            .context("status error")
            .map_err(IssuanceProtocolError::Transport)?
            .json()
            .map_err(|e| match e {
                http_client::Error::JsonError(error) => IssuanceProtocolError::JsonError(error),
                other => IssuanceProtocolError::Transport(other.into()),
            })?;

        match (response.credential, response.transaction_id) {
            (Some(credential), _) => Ok(DeferredPollOutcome::Issued {
                credential: parse_received_credential(credential)?,
            }),
            (None, Some(transaction_id)) => {
                tracing::debug!("Deferred credential still pending");
                Ok(DeferredPollOutcome::Pending { transaction_id })
            }
            (None, None) => Err(IssuanceProtocolError::ProtocolViolation(
                "Deferred response carries neither credential nor transaction_id".to_string(),
            )),
        }
    }

    /// Legacy EBSI behaviour: wait, poll, repeat while the issuer keeps answering with a
    /// transaction id
    pub(super) async fn poll_until_issued(
        &self,
        deferred_endpoint: &str,
        access_token: &str,
        mut transaction_id: String,
        cancellation: &CancellationToken,
    ) -> Result<String, IssuanceProtocolError> {
        let interval = self.params.deferred_polling_interval.unsigned_abs();

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => return Err(IssuanceProtocolError::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }

            match self
                .holder_request_deferred_credential(
                    deferred_endpoint,
                    access_token,
                    &transaction_id,
                )
                .await?
            {
                DeferredPollOutcome::Issued { credential } => return Ok(credential),
                DeferredPollOutcome::Pending {
                    transaction_id: next,
                } => {
                    tracing::debug!("Deferred credential pending, polling again");
                    transaction_id = next;
                }
            }
        }
    }
}
