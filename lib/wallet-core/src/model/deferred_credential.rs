use shared_types::{CredentialId, DeferredCredentialId};
use time::OffsetDateTime;

/// Tracks a credential whose issuance the issuer has deferred
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeferredCredentialMetadata {
    pub id: DeferredCredentialId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub credential_id: CredentialId,
    pub transaction_id: String,
    pub access_token: String,
    pub deferred_endpoint: String,
}
