use super::dto::StoredCredentialDTO;
use crate::model::credential::Credential;

impl From<&Credential> for StoredCredentialDTO {
    fn from(value: &Credential) -> Self {
        Self {
            id: value.id,
            format: value.format.to_owned(),
            types: value.types.to_owned(),
            state: value.state,
        }
    }
}
