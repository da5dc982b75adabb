use shared_types::{CredentialId, DidValue, UserId};
use strum::Display;
use time::OffsetDateTime;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credential {
    pub id: CredentialId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub user_id: UserId,
    pub format: String,
    pub types: Vec<String>,
    /// Raw token or serialized JSON document, empty while issuance is deferred
    pub credential: Option<String>,
    pub state: CredentialStateEnum,
    pub holder_did: DidValue,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum CredentialStateEnum {
    #[strum(serialize = "ISSUED")]
    Issued,
    #[strum(serialize = "VALID")]
    Valid,
}
