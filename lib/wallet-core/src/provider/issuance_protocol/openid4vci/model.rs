use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use shared_types::DidValue;
use time::Duration;

use crate::config::core_config::DidKeyMode;

pub(super) const OPENID_CREDENTIAL_AUTHORIZATION_TYPE: &str = "openid_credential";

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OpenID4VCICredentialOfferDTO {
    pub credential_issuer: String,
    #[serde(default)]
    pub credentials: Vec<OpenID4VCIOfferedCredentialDTO>,
    #[serde(default)]
    pub credential_configuration_ids: Vec<String>,
    pub grants: Option<OpenID4VCIGrantsDTO>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OpenID4VCIOfferedCredentialDTO {
    pub format: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OpenID4VCIGrantsDTO {
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    pub pre_authorized_code: Option<OpenID4VCIPreAuthorizedCodeGrantDTO>,
    pub authorization_code: Option<OpenID4VCIAuthorizationCodeGrantDTO>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OpenID4VCIPreAuthorizedCodeGrantDTO {
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: String,
    #[serde(default)]
    pub tx_code: Option<OpenID4VCITxCode>,
    /// Pre draft-13 form of `tx_code`
    #[serde(default)]
    pub user_pin_required: Option<bool>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OpenID4VCITxCode {
    #[serde(default)]
    pub input_mode: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OpenID4VCIAuthorizationCodeGrantDTO {
    #[serde(default)]
    pub issuer_state: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CredentialOffer {
    pub credential_issuer: String,
    pub credentials: Vec<OfferedCredential>,
    /// Non-empty for DOME profile offers
    pub credential_configuration_ids: Vec<String>,
    pub grant: CredentialOfferGrant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OfferedCredential {
    pub format: String,
    pub types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CredentialOfferGrant {
    PreAuthorizedCode {
        pre_authorized_code: String,
        tx_code_required: bool,
        /// The offer used `user_pin_required` instead of `tx_code`
        legacy_user_pin: bool,
    },
    AuthorizationCode {
        issuer_state: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum IssuanceVariant {
    Standard,
    LegacyEbsi,
    Dome,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OpenID4VCIIssuerMetadataResponseDTO {
    pub credential_issuer: String,
    pub credential_endpoint: String,
    #[serde(default)]
    pub deferred_credential_endpoint: Option<String>,
    #[serde(default)]
    pub authorization_server: Option<String>,
    #[serde(default)]
    pub authorization_servers: Vec<String>,
    #[serde(default)]
    pub credential_configurations_supported:
        IndexMap<String, OpenID4VCICredentialConfigurationData>,
}

impl OpenID4VCIIssuerMetadataResponseDTO {
    pub fn authorization_server_url(&self) -> &str {
        self.authorization_server
            .as_deref()
            .or_else(|| self.authorization_servers.first().map(String::as_str))
            .unwrap_or(&self.credential_issuer)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OpenID4VCICredentialConfigurationData {
    pub format: String,
    #[serde(default)]
    pub cryptographic_binding_methods_supported: Option<Vec<String>>,
    #[serde(default)]
    pub credential_definition: Option<OpenID4VCICredentialDefinitionDTO>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenID4VCICredentialDefinitionDTO {
    #[serde(default)]
    pub r#type: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OpenID4VCIDiscoveryResponseDTO {
    pub issuer: String,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: String,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "grant_type")]
pub enum OpenID4VCITokenRequestDTO {
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    PreAuthorizedCode {
        #[serde(rename = "pre-authorized_code")]
        pre_authorized_code: String,
        tx_code: Option<String>,
        user_pin: Option<String>,
        client_id: Option<String>,
    },
    #[serde(rename = "authorization_code")]
    AuthorizationCode {
        client_id: String,
        code: String,
        code_verifier: String,
        redirect_uri: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct OpenID4VCITokenResponseDTO {
    pub access_token: SecretString,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub c_nonce: Option<String>,
    #[serde(default)]
    pub c_nonce_expires_in: Option<i64>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub authorization_details: Option<Value>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct OpenID4VCICredentialRequestDTO {
    pub format: String,
    pub types: Option<Vec<String>>,
    pub credential_definition: Option<OpenID4VCICredentialDefinitionDTO>,
    pub credential_configuration_id: Option<String>,
    pub proof: Option<OpenID4VCIProofRequestDTO>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OpenID4VCIProofRequestDTO {
    pub proof_type: String,
    pub jwt: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct OpenID4VCIDeferredCredentialRequestDTO {
    pub transaction_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OpenID4VCICredentialResponseDTO {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub credential: Option<Value>,
    #[serde(default, alias = "acceptance_token")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub c_nonce: Option<String>,
    #[serde(default)]
    pub c_nonce_expires_in: Option<i64>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub(super) struct AuthorizationRequestDTO {
    pub response_type: String,
    pub scope: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub issuer_state: Option<String>,
    /// JSON array, serialized ahead of the form encoding
    pub authorization_details: String,
    pub state: String,
    pub nonce: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(super) struct AuthorizationDetailDTO {
    pub r#type: String,
    pub locations: Option<Vec<String>>,
    pub format: String,
    pub types: Option<Vec<String>>,
    pub credential_configuration_id: Option<String>,
}

/// Claims of the request object sent back by the authorization server
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(super) struct RequestObjectClaims {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub presentation_definition: Option<Value>,
    #[serde(default)]
    pub presentation_definition_uri: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct IdTokenResponseDTO {
    pub id_token: String,
    pub state: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct VpTokenResponseDTO {
    pub vp_token: String,
    /// JSON object, serialized ahead of the form encoding
    pub presentation_submission: String,
    pub state: Option<String>,
}

/// Credential requested from the issuer, resolved from the offer and the issuer metadata
#[derive(Clone, Debug, PartialEq)]
pub(super) struct RequestedCredential {
    pub format: String,
    pub types: Vec<String>,
    pub configuration_id: Option<String>,
    pub binding_methods: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedCredential {
    pub format: String,
    pub types: Vec<String>,
    /// Compact JWT or serialized JSON document
    pub credential: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingCredential {
    pub format: String,
    pub types: Vec<String>,
    pub transaction_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CredentialOutcome {
    Immediate(ReceivedCredential),
    Deferred(PendingCredential),
}

#[derive(Debug)]
pub struct AcceptedOffer {
    pub holder_did: DidValue,
    pub variant: IssuanceVariant,
    pub access_token: SecretString,
    pub deferred_endpoint: Option<String>,
    pub credentials: Vec<CredentialOutcome>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeferredPollOutcome {
    Pending { transaction_id: String },
    Issued { credential: String },
}

#[derive(Clone, Debug)]
pub struct OpenID4VCIHolderParams {
    pub redirect_uri: String,
    pub client_id: Option<String>,
    pub did_key_mode: DidKeyMode,
    pub legacy_deferred_polling: bool,
    pub deferred_polling_interval: Duration,
    pub id_token_ttl: Duration,
}
