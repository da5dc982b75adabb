use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::macros::impls_for_uuid_newtype;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DeferredCredentialId(Uuid);

impls_for_uuid_newtype!(DeferredCredentialId);

impl DeferredCredentialId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}
