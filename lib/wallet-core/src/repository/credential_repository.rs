use shared_types::{CredentialId, UserId};

use super::error::DataLayerError;
use crate::model::credential::Credential;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Inserts the credential or replaces the stored one with the same id
    async fn save_credential(&self, credential: Credential) -> Result<CredentialId, DataLayerError>;

    async fn get_credentials_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Credential>, DataLayerError>;

    async fn get_credential_data_by_id(
        &self,
        id: &CredentialId,
    ) -> Result<Option<Credential>, DataLayerError>;

    async fn delete_credential(&self, id: &CredentialId) -> Result<(), DataLayerError>;
}
