use serde_json::Value;

use super::model::{
    CredentialOffer, CredentialOfferGrant, OfferedCredential, OpenID4VCICredentialOfferDTO,
    OpenID4VCIIssuerMetadataResponseDTO, RequestedCredential,
};
use crate::provider::issuance_protocol::error::IssuanceProtocolError;
use crate::util::jwt::decode_payload_json;

impl TryFrom<OpenID4VCICredentialOfferDTO> for CredentialOffer {
    type Error = IssuanceProtocolError;

    fn try_from(value: OpenID4VCICredentialOfferDTO) -> Result<Self, Self::Error> {
        let grants = value
            .grants
            .ok_or_else(|| IssuanceProtocolError::InvalidOffer("Missing grants".to_string()))?;

        let grant = match (grants.pre_authorized_code, grants.authorization_code) {
            (Some(pre_authorized), _) => CredentialOfferGrant::PreAuthorizedCode {
                tx_code_required: pre_authorized.tx_code.is_some()
                    || pre_authorized.user_pin_required == Some(true),
                legacy_user_pin: pre_authorized.user_pin_required.is_some(),
                pre_authorized_code: pre_authorized.pre_authorized_code,
            },
            (None, Some(authorization_code)) => CredentialOfferGrant::AuthorizationCode {
                issuer_state: authorization_code.issuer_state,
            },
            (None, None) => {
                return Err(IssuanceProtocolError::InvalidOffer(
                    "Missing grant".to_string(),
                ));
            }
        };

        if value.credentials.is_empty() && value.credential_configuration_ids.is_empty() {
            return Err(IssuanceProtocolError::InvalidOffer(
                "No credential offered".to_string(),
            ));
        }

        Ok(Self {
            credential_issuer: value.credential_issuer,
            credentials: value
                .credentials
                .into_iter()
                .map(|credential| OfferedCredential {
                    format: credential.format,
                    types: credential.types,
                })
                .collect(),
            credential_configuration_ids: value.credential_configuration_ids,
            grant,
        })
    }
}

impl CredentialOffer {
    pub fn is_dome_profile(&self) -> bool {
        !self.credential_configuration_ids.is_empty()
    }
}

pub(super) fn requested_credentials(
    offer: &CredentialOffer,
    metadata: &OpenID4VCIIssuerMetadataResponseDTO,
) -> Result<Vec<RequestedCredential>, IssuanceProtocolError> {
    if offer.is_dome_profile() {
        return offer
            .credential_configuration_ids
            .iter()
            .map(|configuration_id| {
                let configuration = metadata
                    .credential_configurations_supported
                    .get(configuration_id)
                    .ok_or_else(|| {
                        IssuanceProtocolError::InvalidOffer(format!(
                            "Unknown credential configuration `{configuration_id}`"
                        ))
                    })?;

                Ok(RequestedCredential {
                    format: configuration.format.to_owned(),
                    types: configuration
                        .credential_definition
                        .as_ref()
                        .map(|definition| definition.r#type.to_owned())
                        .unwrap_or_default(),
                    configuration_id: Some(configuration_id.to_owned()),
                    binding_methods: configuration
                        .cryptographic_binding_methods_supported
                        .to_owned(),
                })
            })
            .collect();
    }

    Ok(offer
        .credentials
        .iter()
        .map(|credential| RequestedCredential {
            format: credential.format.to_owned(),
            types: credential.types.to_owned(),
            configuration_id: None,
            binding_methods: None,
        })
        .collect())
}

/// Validates a received credential and returns its storable form
pub(super) fn parse_received_credential(value: Value) -> Result<String, IssuanceProtocolError> {
    match value {
        Value::String(token) => {
            decode_payload_json(&token)
                .map_err(|e| IssuanceProtocolError::InvalidCredential(e.to_string()))?;
            Ok(token)
        }
        Value::Object(_) => Ok(value.to_string()),
        other => Err(IssuanceProtocolError::InvalidCredential(format!(
            "Unexpected credential value: {other}"
        ))),
    }
}

/// `type` of a stored credential, read from the JWT `vc` claim or the JSON document
pub fn credential_types(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let payload = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).ok()
    } else {
        decode_payload_json(trimmed).ok()
    };

    let Some(payload) = payload else {
        return vec![];
    };

    let types = payload
        .get("vc")
        .and_then(|vc| vc.get("type"))
        .or_else(|| payload.get("type"));

    match types {
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect(),
        Some(Value::String(single)) => vec![single.to_owned()],
        _ => vec![],
    }
}
