use serde_json::Value;
use shared_types::DidValue;
use uuid::Uuid;

use super::PresentationError;
use super::model::{
    NestedPresentationSubmissionDescriptorDTO, PresentationSubmissionDescriptorDTO,
    PresentationSubmissionMappingDTO,
};
use crate::util::jwt::decode_payload_json;

pub(super) const VP_FORMAT: &str = "jwt_vp";
pub(super) const VC_FORMAT: &str = "jwt_vc";

/// Stored credentials are either a compact JWT or a serialized JSON document
pub(crate) fn parse_stored_credential(raw: &str) -> Result<Value, PresentationError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map_err(|e| PresentationError::InvalidCredential(e.to_string()));
    }

    decode_payload_json(trimmed).map_err(|e| PresentationError::InvalidCredential(e.to_string()))
}

/// `verifiableCredential` entry: the token itself, or the embedded JSON document
pub(super) fn credential_entry(raw: &str) -> Result<Value, PresentationError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return parse_stored_credential(trimmed);
    }

    Ok(Value::String(trimmed.to_owned()))
}

/// Holder of a credential: the JWT `sub`, else `credentialSubject.id`
pub(super) fn credential_subject(raw: &str) -> Result<DidValue, PresentationError> {
    let payload = parse_stored_credential(raw)?;

    let subject = payload
        .get("sub")
        .and_then(Value::as_str)
        .or_else(|| {
            payload
                .get("vc")
                .unwrap_or(&payload)
                .get("credentialSubject")?
                .get("id")?
                .as_str()
        })
        .ok_or(PresentationError::MissingSubject)?;

    subject.parse().map_err(|e: shared_types::DidValueError| {
        PresentationError::InvalidCredential(e.to_string())
    })
}

pub(super) fn presentation_submission(
    definition_id: &str,
    descriptor_ids: &[String],
) -> PresentationSubmissionMappingDTO {
    PresentationSubmissionMappingDTO {
        id: Uuid::new_v4().to_string(),
        definition_id: definition_id.to_owned(),
        descriptor_map: descriptor_ids
            .iter()
            .enumerate()
            .map(|(index, descriptor_id)| PresentationSubmissionDescriptorDTO {
                id: descriptor_id.to_owned(),
                format: VP_FORMAT.to_owned(),
                path: "$".to_owned(),
                path_nested: Some(NestedPresentationSubmissionDescriptorDTO {
                    id: descriptor_id.to_owned(),
                    format: VC_FORMAT.to_owned(),
                    path: format!("$.vp.verifiableCredential[{index}]"),
                }),
            })
            .collect(),
    }
}
