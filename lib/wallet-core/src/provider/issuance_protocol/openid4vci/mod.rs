//! OpenID4VCI holder flows, with the EBSI conformance and DOME profile variants
//!
//! <https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0-ID1.html>

use std::sync::Arc;

use secrecy::ExposeSecret;
use shared_types::UserId;
use tokio_util::sync::CancellationToken;
use url::Url;

use self::authorization::AuthorizationFlowContext;
use self::mapper::requested_credentials;
use self::model::{
    AcceptedOffer, CredentialOffer, CredentialOfferGrant, CredentialOutcome, DeferredPollOutcome,
    IssuanceVariant,
    OpenID4VCICredentialOfferDTO, OpenID4VCIDiscoveryResponseDTO,
    OpenID4VCIHolderParams, OpenID4VCIIssuerMetadataResponseDTO, OpenID4VCITokenRequestDTO,
    ReceivedCredential,
};
use super::IssuanceProtocol;
use super::error::{IssuanceProtocolError, TxCodeError};
use crate::provider::did_method::key::KeyDidMethod;
use crate::provider::http_client::HttpClient;
use crate::provider::metadata_fetcher::MetadataFetcher;
use crate::provider::presentation::PresentationBuilder;
use crate::provider::signer::HolderSigner;
use crate::provider::vault::{SecretKeyType, Vault};

mod authorization;
mod credential;
mod deferred;
pub mod mapper;
pub mod model;
mod token;


const CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY: &str = "credential_offer";
const CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY: &str = "credential_offer_uri";

pub struct OpenID4VCIHolder {
    client: Arc<dyn HttpClient>,
    metadata_fetcher: Arc<dyn MetadataFetcher>,
    vault: Arc<dyn Vault>,
    signer: Arc<HolderSigner>,
    presentation_builder: Arc<PresentationBuilder>,
    did_method: KeyDidMethod,
    params: OpenID4VCIHolderParams,
}

impl OpenID4VCIHolder {
    pub fn new(
        client: Arc<dyn HttpClient>,
        metadata_fetcher: Arc<dyn MetadataFetcher>,
        vault: Arc<dyn Vault>,
        signer: Arc<HolderSigner>,
        presentation_builder: Arc<PresentationBuilder>,
        params: OpenID4VCIHolderParams,
    ) -> Self {
        Self {
            client,
            metadata_fetcher,
            vault,
            signer,
            presentation_builder,
            did_method: KeyDidMethod,
            params,
        }
    }

    /// Accepts `openid-credential-offer://` style URLs carrying the offer by value or by
    /// reference, or a plain URL of the offer document
    pub async fn resolve_offer(
        &self,
        offer_reference: &str,
    ) -> Result<CredentialOffer, IssuanceProtocolError> {
        let url = Url::parse(offer_reference)
            .map_err(|e| IssuanceProtocolError::InvalidOffer(e.to_string()))?;

        let query_pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let by_value = query_pairs
            .iter()
            .find(|(key, _)| key == CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY)
            .map(|(_, value)| value);
        let by_reference = query_pairs
            .iter()
            .find(|(key, _)| key == CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY)
            .map(|(_, value)| value);

        let offer: OpenID4VCICredentialOfferDTO = match (by_value, by_reference) {
            (Some(_), Some(_)) => {
                return Err(IssuanceProtocolError::InvalidOffer(format!(
                    "Detected both {CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY} and {CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY}"
                )));
            }
            (Some(offer), None) => serde_json::from_str(offer)
                .map_err(|e| IssuanceProtocolError::InvalidOffer(e.to_string()))?,
            (None, Some(reference)) => serde_json::from_value(
                self.metadata_fetcher.fetch(reference).await?,
            )
            .map_err(|e| IssuanceProtocolError::InvalidOffer(e.to_string()))?,
            (None, None) if matches!(url.scheme(), "https" | "http") => {
                serde_json::from_value(self.metadata_fetcher.fetch(url.as_str()).await?)
                    .map_err(|e| IssuanceProtocolError::InvalidOffer(e.to_string()))?
            }
            (None, None) => {
                return Err(IssuanceProtocolError::InvalidOffer(
                    "Missing credential offer param".to_string(),
                ));
            }
        };

        offer.try_into()
    }

    pub async fn fetch_issuer_metadata(
        &self,
        credential_issuer: &str,
    ) -> Result<OpenID4VCIIssuerMetadataResponseDTO, IssuanceProtocolError> {
        let url = well_known_url(credential_issuer, "openid-credential-issuer");

        serde_json::from_value(self.metadata_fetcher.fetch(&url).await?)
            .map_err(IssuanceProtocolError::JsonError)
    }

    pub async fn fetch_authorization_server_metadata(
        &self,
        authorization_server: &str,
    ) -> Result<OpenID4VCIDiscoveryResponseDTO, IssuanceProtocolError> {
        let openid_configuration = well_known_url(authorization_server, "openid-configuration");

        let metadata = match self.metadata_fetcher.fetch(&openid_configuration).await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(
                    %error,
                    "OpenID configuration unavailable, falling back to OAuth authorization server metadata"
                );
                self.metadata_fetcher
                    .fetch(&well_known_url(
                        authorization_server,
                        "oauth-authorization-server",
                    ))
                    .await?
            }
        };

        serde_json::from_value(metadata).map_err(IssuanceProtocolError::JsonError)
    }

    pub fn select_variant(&self, offer: &CredentialOffer) -> IssuanceVariant {
        if offer.is_dome_profile() {
            IssuanceVariant::Dome
        } else if self.params.legacy_deferred_polling {
            IssuanceVariant::LegacyEbsi
        } else {
            IssuanceVariant::Standard
        }
    }

    /// Runs the whole issuance for one offer: holder key generation, token acquisition and
    /// one credential request per offered credential
    pub async fn holder_accept_offer(
        &self,
        offer: &CredentialOffer,
        user_id: &UserId,
        tx_code: Option<String>,
        cancellation: &CancellationToken,
    ) -> Result<AcceptedOffer, IssuanceProtocolError> {
        let issuer_metadata = self.fetch_issuer_metadata(&offer.credential_issuer).await?;
        let authorization_server_metadata = self
            .fetch_authorization_server_metadata(issuer_metadata.authorization_server_url())
            .await?;

        let variant = self.select_variant(offer);
        tracing::info!(%variant, issuer = %offer.credential_issuer, "Accepting credential offer");

        let requested = requested_credentials(offer, &issuer_metadata)?;

        let identity = self.did_method.generate(self.params.did_key_mode)?;
        self.vault
            .save_secret(&identity.did, SecretKeyType::PrivateJwk, identity.private_jwk)
            .await?;
        let holder_did = identity.did;

        let (token_request, proof_issuer) = match &offer.grant {
            CredentialOfferGrant::PreAuthorizedCode {
                pre_authorized_code,
                tx_code_required,
                legacy_user_pin,
            } => {
                if *tx_code_required && tx_code.is_none() {
                    return Err(IssuanceProtocolError::TxCode(TxCodeError::IncorrectCode));
                }

                let request = OpenID4VCITokenRequestDTO::PreAuthorizedCode {
                    pre_authorized_code: pre_authorized_code.to_owned(),
                    user_pin: tx_code.as_ref().filter(|_| *legacy_user_pin).cloned(),
                    tx_code: tx_code.filter(|_| !*legacy_user_pin),
                    client_id: self.params.client_id.to_owned(),
                };
                (request, None)
            }
            CredentialOfferGrant::AuthorizationCode { issuer_state } => {
                let client_id = self
                    .params
                    .client_id
                    .to_owned()
                    .unwrap_or_else(|| holder_did.to_string());
                let context = AuthorizationFlowContext::new(
                    client_id.to_owned(),
                    self.params.redirect_uri.to_owned(),
                )?;

                let code = self
                    .authorize(
                        &context,
                        &authorization_server_metadata,
                        offer,
                        issuer_state.to_owned(),
                        &requested,
                        user_id,
                        &holder_did,
                    )
                    .await?;

                let request = OpenID4VCITokenRequestDTO::AuthorizationCode {
                    client_id: client_id.to_owned(),
                    code,
                    code_verifier: context.pkce.code_verifier.to_owned(),
                    redirect_uri: context.redirect_uri.to_owned(),
                };
                (request, Some(client_id))
            }
        };

        let token = self
            .holder_fetch_token(&authorization_server_metadata.token_endpoint, &token_request)
            .await?;

        let mut nonce = token.c_nonce.to_owned();
        let mut credentials = Vec::with_capacity(requested.len());
        for requested_credential in &requested {
            let (outcome, next_nonce) = self
                .holder_request_credential(
                    variant,
                    &issuer_metadata,
                    token.access_token.expose_secret(),
                    requested_credential,
                    &holder_did,
                    proof_issuer.as_deref(),
                    nonce.as_deref(),
                )
                .await?;

            if next_nonce.is_some() {
                nonce = next_nonce;
            }

            let outcome = match outcome {
                CredentialOutcome::Deferred(pending) if variant == IssuanceVariant::LegacyEbsi => {
                    let endpoint = deferred_endpoint(&issuer_metadata)?;
                    let credential = self
                        .poll_until_issued(
                            endpoint,
                            token.access_token.expose_secret(),
                            pending.transaction_id,
                            cancellation,
                        )
                        .await?;

                    CredentialOutcome::Immediate(ReceivedCredential {
                        types: resolve_types(pending.types, &credential),
                        format: pending.format,
                        credential,
                    })
                }
                outcome => outcome,
            };

            credentials.push(outcome);
        }

        Ok(AcceptedOffer {
            holder_did,
            variant,
            access_token: token.access_token,
            deferred_endpoint: issuer_metadata.deferred_credential_endpoint,
            credentials,
        })
    }
}

#[async_trait::async_trait]
impl IssuanceProtocol for OpenID4VCIHolder {
    async fn resolve_offer(
        &self,
        offer_reference: &str,
    ) -> Result<CredentialOffer, IssuanceProtocolError> {
        OpenID4VCIHolder::resolve_offer(self, offer_reference).await
    }

    async fn holder_accept_offer(
        &self,
        offer: &CredentialOffer,
        user_id: &UserId,
        tx_code: Option<String>,
        cancellation: &CancellationToken,
    ) -> Result<AcceptedOffer, IssuanceProtocolError> {
        OpenID4VCIHolder::holder_accept_offer(self, offer, user_id, tx_code, cancellation).await
    }

    async fn holder_request_deferred_credential(
        &self,
        deferred_endpoint: &str,
        access_token: &str,
        transaction_id: &str,
    ) -> Result<DeferredPollOutcome, IssuanceProtocolError> {
        OpenID4VCIHolder::holder_request_deferred_credential(
            self,
            deferred_endpoint,
            access_token,
            transaction_id,
        )
        .await
    }
}

fn deferred_endpoint(
    metadata: &OpenID4VCIIssuerMetadataResponseDTO,
) -> Result<&str, IssuanceProtocolError> {
    metadata
        .deferred_credential_endpoint
        .as_deref()
        .ok_or_else(|| {
            IssuanceProtocolError::ProtocolViolation(
                "Deferred credential without deferred_credential_endpoint".to_string(),
            )
        })
}

/// Offered types take precedence over the ones inside the credential
pub fn resolve_types(offered: Vec<String>, credential: &str) -> Vec<String> {
    if offered.is_empty() {
        mapper::credential_types(credential)
    } else {
        offered
    }
}

fn well_known_url(base: &str, document: &str) -> String {
    format!("{}/.well-known/{document}", base.trim_end_matches('/'))
}
