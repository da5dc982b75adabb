use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use shared_types::{CredentialId, DidValue, UserId};

/// <https://identity.foundation/presentation-exchange/spec/v2.0.0/#presentation-definition>
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PresentationDefinition {
    pub id: String,
    pub input_descriptors: Vec<PresentationDefinitionInputDescriptor>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PresentationDefinitionInputDescriptor {
    pub id: String,
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub format: Option<Value>,
    #[serde(default)]
    pub constraints: PresentationDefinitionConstraint,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PresentationDefinitionConstraint {
    #[serde(default)]
    pub fields: Vec<PresentationDefinitionConstraintField>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PresentationDefinitionConstraintField {
    #[serde(default)]
    pub path: Vec<String>,
    pub filter: Option<PresentationDefinitionConstraintFieldFilter>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PresentationDefinitionConstraintFieldFilter {
    pub r#type: Option<String>,
    pub r#const: Option<Value>,
    pub pattern: Option<String>,
    pub contains: Option<Box<PresentationDefinitionConstraintFieldFilter>>,
}

impl PresentationDefinitionInputDescriptor {
    /// Credential type pinned by a `filter.const` or `filter.contains.const`
    pub fn required_type(&self) -> Option<&str> {
        self.constraints
            .fields
            .iter()
            .filter_map(|field| field.filter.as_ref())
            .find_map(|filter| {
                filter
                    .r#const
                    .as_ref()
                    .or_else(|| filter.contains.as_ref()?.r#const.as_ref())
                    .and_then(Value::as_str)
            })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PresentationSubmissionMappingDTO {
    pub id: String,
    pub definition_id: String,
    pub descriptor_map: Vec<PresentationSubmissionDescriptorDTO>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PresentationSubmissionDescriptorDTO {
    pub id: String,
    pub format: String,
    pub path: String,
    pub path_nested: Option<NestedPresentationSubmissionDescriptorDTO>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NestedPresentationSubmissionDescriptorDTO {
    pub id: String,
    pub format: String,
    pub path: String,
}

/// W3C VCDM 1.1 presentation carried in the `vp` claim
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub r#type: Vec<String>,
    pub holder: DidValue,
    pub verifiable_credential: Vec<Value>,
}

#[derive(Clone, Debug)]
pub enum CredentialSelection {
    Explicit(Vec<CredentialId>),
    ByTypes(Vec<String>),
    ByDefinition(PresentationDefinition),
}

#[derive(Clone, Debug)]
pub struct PresentationRequest {
    pub user_id: UserId,
    pub selection: CredentialSelection,
    pub nonce: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone, Debug)]
pub struct BuiltPresentation {
    pub vp_token: String,
    pub presentation_submission: Option<PresentationSubmissionMappingDTO>,
    pub holder_did: DidValue,
    pub credential_ids: Vec<CredentialId>,
}
