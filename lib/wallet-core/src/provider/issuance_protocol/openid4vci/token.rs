use anyhow::Context;
use serde::Deserialize;

use super::OpenID4VCIHolder;
use super::model::{OpenID4VCITokenRequestDTO, OpenID4VCITokenResponseDTO};
use crate::provider::issuance_protocol::error::{IssuanceProtocolError, TxCodeError};

impl OpenID4VCIHolder {
    pub(super) async fn holder_fetch_token(
        &self,
        token_endpoint: &str,
        form: &OpenID4VCITokenRequestDTO,
    ) -> Result<OpenID4VCITokenResponseDTO, IssuanceProtocolError> {
        let has_sent_tx_code = matches!(
            form,
            OpenID4VCITokenRequestDTO::PreAuthorizedCode { tx_code: Some(_), .. }
                | OpenID4VCITokenRequestDTO::PreAuthorizedCode { user_pin: Some(_), .. }
        );

        let response = self
            .client
            .post(token_endpoint)
            .form(form)
            .context("Invalid token_endpoint request")
            .map_err(IssuanceProtocolError::Transport)?
            .send()
            .await
            .context("Error during token_endpoint response")
            .map_err(IssuanceProtocolError::Transport)?;

        if response.status.is_client_error() && has_sent_tx_code {
            #[derive(Deserialize)]
            struct ErrorResponse {
                error: OAuthError,
            }

            #[derive(Deserialize)]
            #[serde(rename_all = "snake_case")]
            enum OAuthError {
                InvalidGrant,
                InvalidRequest,
            }

            match serde_json::from_slice::<ErrorResponse>(&response.body).map(|r| r.error) {
                Ok(OAuthError::InvalidGrant) => {
                    return Err(IssuanceProtocolError::TxCode(TxCodeError::IncorrectCode));
                }
                Ok(OAuthError::InvalidRequest) => {
                    return Err(IssuanceProtocolError::TxCode(TxCodeError::InvalidCodeUse));
                }
                Err(_) => {}
            }
        }

        response
            .error_for_status()
            .context("status error")
            .map_err(IssuanceProtocolError::Transport)?
            .json()
            .map_err(|e| match e {
                crate::provider::http_client::Error::JsonError(error) => {
                    IssuanceProtocolError::JsonError(error)
                }
                other => IssuanceProtocolError::Transport(other.into()),
            })
    }
}
