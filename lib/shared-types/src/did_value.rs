use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::macros::impl_display;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DidValue(String);

#[derive(Debug, Error)]
pub enum DidValueError {
    #[error("Invalid DID value: `{0}`")]
    Invalid(String),
}

impl DidValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// DID method name, e.g. `key` for `did:key:z...`
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// Method-specific identifier with any `#fragment` removed
    pub fn method_specific_id(&self) -> &str {
        let without_fragment = self.0.split('#').next().unwrap_or_default();
        without_fragment.splitn(3, ':').nth(2).unwrap_or_default()
    }
}

impl FromStr for DidValue {
    type Err = DidValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("did"), Some(method), Some(id)) if !method.is_empty() && !id.is_empty() => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(DidValueError::Invalid(s.to_owned())),
        }
    }
}

impl TryFrom<String> for DidValue {
    type Error = DidValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DidValue> for String {
    fn from(value: DidValue) -> Self {
        value.0
    }
}

impl_display!(DidValue);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_did_value() {
        let did: DidValue = "did:key:zDnaeTiq1PdzvZXUaMdezchcMJQpBdH2VN4pgrrEhMCCbmwSb#key-1"
            .parse()
            .unwrap();
        assert_eq!(did.method(), "key");
        assert_eq!(
            did.method_specific_id(),
            "zDnaeTiq1PdzvZXUaMdezchcMJQpBdH2VN4pgrrEhMCCbmwSb"
        );
    }

    #[test]
    fn test_parse_did_value_invalid() {
        assert!("did:key".parse::<DidValue>().is_err());
        assert!("https://example.com".parse::<DidValue>().is_err());
    }
}
