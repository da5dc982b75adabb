use serde::{Deserialize, Serialize};
use shared_types::UserId;

use crate::service::error::ServiceError;
use crate::util::jwt::Jwt;

#[derive(Debug, Default, Deserialize, Serialize)]
struct BearerTokenPayload {}

/// Resolves the authenticated subject from a bearer token.
///
/// The token has already been authenticated by the calling layer, only the `sub` claim is read.
pub(crate) fn extract_user_id(bearer_token: &str) -> Result<UserId, ServiceError> {
    let token = bearer_token
        .strip_prefix("Bearer ")
        .unwrap_or(bearer_token)
        .trim();

    let decomposed = Jwt::<BearerTokenPayload>::decompose_token(token)
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid bearer token: {e}")))?;

    decomposed
        .payload
        .subject
        .filter(|subject| !subject.is_empty())
        .map(UserId::from)
        .ok_or_else(|| ServiceError::Unauthorized("Bearer token has no subject".to_string()))
}

#[cfg(test)]
mod test {
    use ct_codecs::{Base64UrlSafeNoPadding, Encoder};

    use super::*;

    fn token(payload: &str) -> String {
        let header = Base64UrlSafeNoPadding::encode_to_string(r#"{"alg":"ES256"}"#).unwrap();
        let payload = Base64UrlSafeNoPadding::encode_to_string(payload).unwrap();
        format!("{header}.{payload}.c2ln")
    }

    #[test]
    fn test_extract_user_id() {
        let token = token(r#"{"sub":"user-1","iat":1700000000}"#);

        assert_eq!(
            extract_user_id(&format!("Bearer {token}")).unwrap(),
            UserId::from("user-1".to_string())
        );
        assert_eq!(
            extract_user_id(&token).unwrap(),
            UserId::from("user-1".to_string())
        );
    }

    #[test]
    fn test_extract_user_id_without_subject() {
        let token = token(r#"{"iat":1700000000}"#);

        assert!(matches!(
            extract_user_id(&token),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
