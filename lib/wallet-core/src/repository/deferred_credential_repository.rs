use shared_types::{CredentialId, DeferredCredentialId};

use super::error::DataLayerError;
use crate::model::deferred_credential::DeferredCredentialMetadata;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait DeferredCredentialRepository: Send + Sync {
    async fn save_deferred_metadata(
        &self,
        metadata: DeferredCredentialMetadata,
    ) -> Result<DeferredCredentialId, DataLayerError>;

    async fn get_deferred_metadata_by_credential_id(
        &self,
        credential_id: &CredentialId,
    ) -> Result<Option<DeferredCredentialMetadata>, DataLayerError>;

    async fn update_deferred_metadata_transaction_id(
        &self,
        id: &DeferredCredentialId,
        transaction_id: &str,
    ) -> Result<(), DataLayerError>;

    async fn delete_deferred_metadata(&self, id: &DeferredCredentialId)
    -> Result<(), DataLayerError>;
}
