mod credential_id;
mod deferred_credential_id;
mod did_value;
mod macros;
mod user_id;

pub use credential_id::CredentialId;
pub use deferred_credential_id::DeferredCredentialId;
pub use did_value::{DidValue, DidValueError};
pub use user_id::UserId;
