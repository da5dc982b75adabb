use rstest::rstest;
use serde_json::{Map, Value, json};
use wallet_crypto::Signer;
use wallet_crypto::signer::es256::{ES256Signer, KeyPair};

use super::{AUTHORIZATION_REQUEST_TOKEN_TYPE, AuthorizationRequestValidator, ValidationError};
use crate::config::core_config::DidKeyMode;
use crate::error::{ErrorCategory, ErrorCategoryMixin};
use crate::provider::did_method::key::KeyDidMethod;
use crate::util::jwt::Jwt;
use crate::util::jwt::model::JWTPayload;

struct Verifier {
    key_pair: KeyPair,
    did: String,
}

impl Verifier {
    fn new(mode: DidKeyMode) -> Self {
        let key_pair = ES256Signer::generate_key_pair();
        let did = KeyDidMethod
            .did_from_public_key(&key_pair.public, mode)
            .unwrap()
            .to_string();

        Self { key_pair, did }
    }

    fn kid(&self) -> String {
        format!("{}#{}", self.did, self.did.trim_start_matches("did:key:"))
    }

    fn sign(&self, typ: &str, kid: Option<String>, claims: Value) -> String {
        let payload: JWTPayload<Map<String, Value>> = serde_json::from_value(claims).unwrap();
        let jwt = Jwt::new(typ.to_string(), "ES256".to_string(), kid, payload);

        jwt.tokenize(Box::new(|input| {
            ES256Signer.sign(input, &self.key_pair.public, &self.key_pair.private)
        }))
        .unwrap()
    }

    fn claims(&self) -> Value {
        json!({
            "iss": self.did,
            "client_id": self.did,
            "response_type": "vp_token",
            "response_mode": "direct_post",
            "response_uri": "https://verifier.example/response",
            "nonce": "nonce-1",
            "state": "state-1",
            "presentation_definition": {
                "id": "definition-1",
                "input_descriptors": [{
                    "id": "descriptor-1",
                    "constraints": {"fields": [{
                        "path": ["$.vc.type"],
                        "filter": {"type": "array", "contains": {"const": "VerifiableAttestation"}}
                    }]}
                }]
            }
        })
    }
}

#[rstest]
#[case::standard(DidKeyMode::Standard)]
#[case::jwk_jcs_pub(DidKeyMode::JwkJcsPub)]
fn test_validate_signed_request(#[case] mode: DidKeyMode) {
    // given
    let verifier = Verifier::new(mode);
    let request = verifier.sign(
        AUTHORIZATION_REQUEST_TOKEN_TYPE,
        Some(verifier.kid()),
        verifier.claims(),
    );

    // when
    let validated = AuthorizationRequestValidator::new()
        .validate(&request)
        .unwrap();

    // then
    assert_eq!(validated.client_id, verifier.did);
    assert_eq!(validated.key_id, verifier.kid());
    assert_eq!(validated.response_type.as_deref(), Some("vp_token"));
    assert_eq!(validated.response_mode.as_deref(), Some("direct_post"));
    assert_eq!(
        validated.response_uri.as_deref(),
        Some("https://verifier.example/response")
    );
    assert_eq!(validated.nonce.as_deref(), Some("nonce-1"));
    assert_eq!(validated.state.as_deref(), Some("state-1"));

    let definition = validated.presentation_definition.unwrap();
    assert_eq!(definition.id, "definition-1");
    assert_eq!(
        definition.input_descriptors[0].required_type(),
        Some("VerifiableAttestation")
    );
}

#[test]
fn test_validate_kid_without_fragment() {
    let verifier = Verifier::new(DidKeyMode::Standard);
    let request = verifier.sign(
        AUTHORIZATION_REQUEST_TOKEN_TYPE,
        Some(verifier.did.to_owned()),
        verifier.claims(),
    );

    assert!(AuthorizationRequestValidator::new().validate(&request).is_ok());
}

#[rstest]
#[case::plain_jwt("JWT")]
#[case::proof("openid4vci-proof+jwt")]
fn test_validate_rejects_wrong_type(#[case] typ: &str) {
    // given
    let verifier = Verifier::new(DidKeyMode::Standard);
    // signed by a key different from the kid, signature verification must not be reached
    let request = Verifier::new(DidKeyMode::Standard).sign(
        typ,
        Some(verifier.kid()),
        verifier.claims(),
    );

    // when
    let error = AuthorizationRequestValidator::new()
        .validate(&request)
        .unwrap_err();

    // then
    assert!(matches!(error, ValidationError::InvalidTokenType(Some(ref t)) if t == typ));
    assert_eq!(error.error_category(), ErrorCategory::ProtocolViolation);
}

#[rstest]
#[case::different(json!({"iss": "did:key:zDnaeOther", "client_id": "did:key:zDnaeVerifier"}))]
#[case::missing_client_id(json!({"iss": "did:key:zDnaeVerifier"}))]
#[case::missing_issuer(json!({"client_id": "did:key:zDnaeVerifier"}))]
fn test_validate_rejects_client_id_mismatch(#[case] claims: Value) {
    // given
    let verifier = Verifier::new(DidKeyMode::Standard);
    // kid is not even resolvable, key resolution must not be reached
    let request = verifier.sign(
        AUTHORIZATION_REQUEST_TOKEN_TYPE,
        Some("did:key:zInvalid".to_string()),
        claims,
    );

    // when
    let error = AuthorizationRequestValidator::new()
        .validate(&request)
        .unwrap_err();

    // then
    assert!(matches!(error, ValidationError::ClientIdMismatch { .. }));
    assert_eq!(error.error_category(), ErrorCategory::ProtocolViolation);
}

#[test]
fn test_validate_rejects_signature_of_other_key() {
    // given
    let verifier = Verifier::new(DidKeyMode::Standard);
    let impostor = Verifier::new(DidKeyMode::Standard);
    let request = impostor.sign(
        AUTHORIZATION_REQUEST_TOKEN_TYPE,
        Some(verifier.kid()),
        verifier.claims(),
    );

    // when
    let error = AuthorizationRequestValidator::new()
        .validate(&request)
        .unwrap_err();

    // then
    assert!(matches!(error, ValidationError::InvalidSignature(_)));
    assert_eq!(error.error_category(), ErrorCategory::SignatureInvalid);
}

#[test]
fn test_validate_rejects_tampered_payload() {
    let verifier = Verifier::new(DidKeyMode::Standard);
    let request = verifier.sign(
        AUTHORIZATION_REQUEST_TOKEN_TYPE,
        Some(verifier.kid()),
        verifier.claims(),
    );

    let mut claims = verifier.claims();
    claims["nonce"] = json!("replayed");
    let forged_payload = verifier
        .sign(AUTHORIZATION_REQUEST_TOKEN_TYPE, Some(verifier.kid()), claims)
        .split('.')
        .nth(1)
        .unwrap()
        .to_owned();

    let mut parts: Vec<&str> = request.split('.').collect();
    parts[1] = &forged_payload;

    let result = AuthorizationRequestValidator::new().validate(&parts.join("."));

    assert!(matches!(result, Err(ValidationError::InvalidSignature(_))));
}

#[rstest]
#[case::missing(None)]
#[case::web_did(Some("did:web:verifier.example#key-1".to_string()))]
#[case::https(Some("https://verifier.example/keys/1".to_string()))]
fn test_validate_rejects_unusable_key_id(#[case] kid: Option<String>) {
    let verifier = Verifier::new(DidKeyMode::Standard);
    let request = verifier.sign(AUTHORIZATION_REQUEST_TOKEN_TYPE, kid, verifier.claims());

    let error = AuthorizationRequestValidator::new()
        .validate(&request)
        .unwrap_err();

    assert!(matches!(
        error,
        ValidationError::MissingKeyId | ValidationError::UnsupportedKeyId(_)
    ));
    assert_eq!(error.error_category(), ErrorCategory::ParseError);
}

#[test]
fn test_validate_rejects_undecodable_did_key() {
    let verifier = Verifier::new(DidKeyMode::Standard);
    let request = verifier.sign(
        AUTHORIZATION_REQUEST_TOKEN_TYPE,
        Some("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK".to_string()),
        verifier.claims(),
    );

    let error = AuthorizationRequestValidator::new()
        .validate(&request)
        .unwrap_err();

    assert!(matches!(error, ValidationError::KeyResolution(_)));
    assert_eq!(error.error_category(), ErrorCategory::ParseError);
}

#[test]
fn test_validate_rejects_malformed_token() {
    let error = AuthorizationRequestValidator::new()
        .validate("definitely.not")
        .unwrap_err();

    assert!(matches!(error, ValidationError::MalformedRequest(_)));
    assert_eq!(error.error_category(), ErrorCategory::ParseError);
}
