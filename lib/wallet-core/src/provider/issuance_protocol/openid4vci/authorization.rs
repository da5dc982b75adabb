//! Authorization code flow with PKCE, including the EBSI `id_token` / `vp_token` indirection

use std::collections::HashMap;

use anyhow::Context;
use serde::Serialize;
use shared_types::{DidValue, UserId};
use time::OffsetDateTime;
use wallet_crypto::utilities::generate_alphanumeric;

use super::OpenID4VCIHolder;
use super::model::{
    AuthorizationDetailDTO, AuthorizationRequestDTO, CredentialOffer, IdTokenResponseDTO,
    OPENID_CREDENTIAL_AUTHORIZATION_TYPE, OpenID4VCIDiscoveryResponseDTO, RequestObjectClaims,
    RequestedCredential, VpTokenResponseDTO,
};
use crate::provider::http_client::Response;
use crate::provider::issuance_protocol::error::IssuanceProtocolError;
use crate::provider::presentation::model::{
    CredentialSelection, PresentationDefinition, PresentationRequest,
};
use crate::provider::signer::SigningPurpose;
use crate::provider::signer::claims::id_token_claims;
use crate::util::jwt::Jwt;
use crate::util::params::query_params;
use crate::util::pkce::{CODE_CHALLENGE_METHOD, PkceChallenge};

const STATE_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 32;

/// Per-flow values, never shared between flows
pub(super) struct AuthorizationFlowContext {
    pub client_id: String,
    pub redirect_uri: String,
    pub state: String,
    pub nonce: String,
    pub pkce: PkceChallenge,
}

impl AuthorizationFlowContext {
    pub fn new(client_id: String, redirect_uri: String) -> Result<Self, IssuanceProtocolError> {
        Ok(Self {
            client_id,
            redirect_uri,
            state: generate_alphanumeric(STATE_LENGTH),
            nonce: generate_alphanumeric(NONCE_LENGTH),
            pkce: PkceChallenge::generate()?,
        })
    }

    pub fn validate_state(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(), IssuanceProtocolError> {
        match params.get("state") {
            Some(state) if state == &self.state => Ok(()),
            _ => Err(IssuanceProtocolError::StateMismatch),
        }
    }
}

impl OpenID4VCIHolder {
    /// Returns the authorization code of the final redirect
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn authorize(
        &self,
        context: &AuthorizationFlowContext,
        authorization_server: &OpenID4VCIDiscoveryResponseDTO,
        offer: &CredentialOffer,
        issuer_state: Option<String>,
        requested: &[RequestedCredential],
        user_id: &UserId,
        holder_did: &DidValue,
    ) -> Result<String, IssuanceProtocolError> {
        let authorization_endpoint = authorization_server
            .authorization_endpoint
            .as_deref()
            .ok_or_else(|| {
                IssuanceProtocolError::Failed("Missing authorization_endpoint".to_string())
            })?;

        let request = build_authorization_request(context, offer, issuer_state, requested)?;
        let query = serde_urlencoded::to_string(&request)?;

        let response = self
            .client
            .get(&format!("{authorization_endpoint}?{query}"))
            .send()
            .await
            .context("send error")
            .map_err(IssuanceProtocolError::Transport)?
            .error_for_status()
            .context("status error")
            .map_err(IssuanceProtocolError::Transport)?;

        let mut params = redirect_params(&response)?;

        if !params.contains_key("code") {
            let request_object = self.extract_request_object(&params).await?;
            let response = self
                .respond_to_request_object(&request_object, &params, user_id, holder_did)
                .await?;
            params = redirect_params(&response)?;
        }

        context.validate_state(&params)?;

        params.remove("code").ok_or_else(|| {
            IssuanceProtocolError::ProtocolViolation(
                "Missing code in final redirect".to_string(),
            )
        })
    }

    /// Inline `request` or dereferenced `request_uri`, exactly one is allowed
    async fn extract_request_object(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<String, IssuanceProtocolError> {
        match (params.get("request"), params.get("request_uri")) {
            (Some(request), None) => Ok(request.to_owned()),
            (None, Some(request_uri)) => self
                .client
                .get(request_uri)
                .send()
                .await
                .context("send error")
                .map_err(IssuanceProtocolError::Transport)?
                .error_for_status()
                .context("status error")
                .map_err(IssuanceProtocolError::Transport)?
                .text()
                .context("request object error")
                .map(|text| text.trim().to_owned())
                .map_err(IssuanceProtocolError::Transport),
            (Some(_), Some(_)) => Err(IssuanceProtocolError::ProtocolViolation(
                "Both request and request_uri present".to_string(),
            )),
            (None, None) => Err(IssuanceProtocolError::ProtocolViolation(
                "Missing request or request_uri".to_string(),
            )),
        }
    }

    async fn respond_to_request_object(
        &self,
        request_object: &str,
        params: &HashMap<String, String>,
        user_id: &UserId,
        holder_did: &DidValue,
    ) -> Result<Response, IssuanceProtocolError> {
        let request = Jwt::<RequestObjectClaims>::decompose_token(request_object)?;
        let claims = request.payload.custom;
        let param = |name: &str| params.get(name).cloned();

        let redirect_uri = claims
            .redirect_uri
            .to_owned()
            .or_else(|| param("redirect_uri"))
            .ok_or_else(|| {
                IssuanceProtocolError::ProtocolViolation("Missing redirect_uri".to_string())
            })?;
        let audience = claims
            .client_id
            .to_owned()
            .or(request.payload.issuer)
            .or_else(|| param("client_id"))
            .ok_or_else(|| {
                IssuanceProtocolError::ProtocolViolation("Missing client_id".to_string())
            })?;
        let state = claims.state.to_owned().or_else(|| param("state"));
        let nonce = claims.nonce.to_owned().or_else(|| param("nonce"));
        let response_type = claims
            .response_type
            .to_owned()
            .or_else(|| param("response_type"))
            .unwrap_or_default();

        tracing::debug!(%response_type, "Responding to authorization server request");

        match response_type.as_str() {
            "id_token" => {
                let claims = id_token_claims(
                    holder_did,
                    &audience,
                    nonce.as_deref(),
                    OffsetDateTime::now_utc(),
                    self.params.id_token_ttl,
                )
                .map_err(IssuanceProtocolError::JsonError)?;
                let id_token = self
                    .signer
                    .sign(claims, holder_did, SigningPurpose::IdToken)
                    .await?;

                self.post_form(&redirect_uri, IdTokenResponseDTO { id_token, state })
                    .await
            }
            "vp_token" => {
                let definition = self.presentation_definition(&claims).await?;
                let presentation = self
                    .presentation_builder
                    .build_presentation(PresentationRequest {
                        user_id: user_id.to_owned(),
                        selection: CredentialSelection::ByDefinition(definition),
                        nonce,
                        audience: Some(audience),
                    })
                    .await?;

                let submission = presentation.presentation_submission.ok_or_else(|| {
                    IssuanceProtocolError::Failed("Missing presentation submission".to_string())
                })?;

                self.post_form(
                    &redirect_uri,
                    VpTokenResponseDTO {
                        vp_token: presentation.vp_token,
                        presentation_submission: serde_json::to_string(&submission)
                            .map_err(IssuanceProtocolError::JsonError)?,
                        state,
                    },
                )
                .await
            }
            other => Err(IssuanceProtocolError::UnknownResponseType(other.to_owned())),
        }
    }

    async fn presentation_definition(
        &self,
        claims: &RequestObjectClaims,
    ) -> Result<PresentationDefinition, IssuanceProtocolError> {
        let definition = match (
            &claims.presentation_definition,
            &claims.presentation_definition_uri,
        ) {
            (Some(definition), _) => definition.to_owned(),
            (None, Some(uri)) => self.metadata_fetcher.fetch(uri).await?,
            (None, None) => {
                return Err(IssuanceProtocolError::ProtocolViolation(
                    "Missing presentation_definition".to_string(),
                ));
            }
        };

        serde_json::from_value(definition).map_err(IssuanceProtocolError::JsonError)
    }

    async fn post_form(
        &self,
        url: &str,
        form: impl Serialize,
    ) -> Result<Response, IssuanceProtocolError> {
        self.client
            .post(url)
            .form(form)
            .context("form error")
            .map_err(IssuanceProtocolError::Transport)?
            .send()
            .await
            .context("send error")
            .map_err(IssuanceProtocolError::Transport)?
            .error_for_status()
            .context("status error")
            .map_err(IssuanceProtocolError::Transport)
    }
}

fn build_authorization_request(
    context: &AuthorizationFlowContext,
    offer: &CredentialOffer,
    issuer_state: Option<String>,
    requested: &[RequestedCredential],
) -> Result<AuthorizationRequestDTO, IssuanceProtocolError> {
    let details = requested
        .iter()
        .map(|credential| match &credential.configuration_id {
            Some(configuration_id) => AuthorizationDetailDTO {
                r#type: OPENID_CREDENTIAL_AUTHORIZATION_TYPE.to_owned(),
                locations: None,
                format: credential.format.to_owned(),
                types: None,
                credential_configuration_id: Some(configuration_id.to_owned()),
            },
            None => AuthorizationDetailDTO {
                r#type: OPENID_CREDENTIAL_AUTHORIZATION_TYPE.to_owned(),
                locations: Some(vec![offer.credential_issuer.to_owned()]),
                format: credential.format.to_owned(),
                types: Some(credential.types.to_owned()),
                credential_configuration_id: None,
            },
        })
        .collect::<Vec<_>>();

    Ok(AuthorizationRequestDTO {
        response_type: "code".to_owned(),
        scope: "openid".to_owned(),
        client_id: context.client_id.to_owned(),
        redirect_uri: context.redirect_uri.to_owned(),
        issuer_state,
        authorization_details: serde_json::to_string(&details)
            .map_err(IssuanceProtocolError::JsonError)?,
        state: context.state.to_owned(),
        nonce: context.nonce.to_owned(),
        code_challenge: context.pkce.code_challenge.to_owned(),
        code_challenge_method: CODE_CHALLENGE_METHOD.to_owned(),
    })
}

/// Query parameters of the `Location` a redirect points to
fn redirect_params(response: &Response) -> Result<HashMap<String, String>, IssuanceProtocolError> {
    let location = response
        .header_get("Location")
        .filter(|_| response.status.is_redirection())
        .ok_or_else(|| {
            IssuanceProtocolError::ProtocolViolation(format!(
                "Expected redirect, got HTTP {}",
                response.status
            ))
        })?;

    query_params(location)
        .map_err(|e| IssuanceProtocolError::ProtocolViolation(format!("Invalid redirect: {e}")))
}
