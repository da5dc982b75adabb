use serde::{Deserialize, Serialize};
use serde_json::json;
use time::macros::datetime;
use wallet_crypto::SignerError;

use super::model::JWTPayload;
use super::{Jwt, JwtError, decode_payload_json};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Payload {
    nonce: Option<String>,
}

fn prepare_jwt() -> Jwt<Payload> {
    Jwt::new(
        "JWT".to_string(),
        "ES256".to_string(),
        Some("did:key:z123#z123".to_string()),
        JWTPayload {
            issued_at: Some(datetime!(2024-01-01 0:00 UTC)),
            issuer: Some("did:key:z123".to_string()),
            audience: Some(vec!["https://issuer.example.com".to_string()]),
            custom: Payload {
                nonce: Some("nonce-1".to_string()),
            },
            ..Default::default()
        },
    )
}

#[test]
fn test_tokenize_and_decompose() {
    let jwt = prepare_jwt();

    let token = jwt.tokenize(Box::new(|_| Ok(vec![1, 2, 3]))).unwrap();
    assert_eq!(token.split('.').count(), 3);

    let decomposed = Jwt::<Payload>::decompose_token(&token).unwrap();
    assert_eq!(decomposed.header, jwt.header);
    assert_eq!(decomposed.payload, jwt.payload);
    assert_eq!(decomposed.signature, vec![1, 2, 3]);
    assert!(token.starts_with(&decomposed.unverified_jwt));
}

#[test]
fn test_single_audience_serialized_as_string() {
    let token = prepare_jwt()
        .tokenize(Box::new(|_| Ok(vec![1])))
        .unwrap();

    let payload = decode_payload_json(&token).unwrap();
    assert_eq!(
        payload,
        json!({
            "iat": 1704067200,
            "iss": "did:key:z123",
            "aud": "https://issuer.example.com",
            "nonce": "nonce-1"
        })
    );
}

#[test]
fn test_tokenize_signing_failure() {
    let result = prepare_jwt().tokenize(Box::new(|_| Err(SignerError::CouldNotExtractKeyPair)));

    assert!(matches!(result, Err(JwtError::CouldNotSign(_))));
}

#[test]
fn test_decompose_malformed_token() {
    assert!(matches!(
        Jwt::<Payload>::decompose_token("abc.def"),
        Err(JwtError::CouldNotExtract(_))
    ));
    assert!(matches!(
        Jwt::<Payload>::decompose_token("!!!.???.###"),
        Err(JwtError::CouldNotExtract(_))
    ));
}
