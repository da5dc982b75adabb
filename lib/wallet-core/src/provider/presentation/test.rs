use std::sync::Arc;

use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use mockall::predicate::eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use shared_types::{CredentialId, DidValue, UserId};
use time::{Duration, OffsetDateTime};

use super::model::{CredentialSelection, PresentationDefinition, PresentationRequest};
use super::{PresentationBuilder, PresentationError, PresentationParams};
use crate::model::credential::{Credential, CredentialStateEnum};
use crate::provider::signer::{HolderSigner, MockJwtSigner, SigningPurpose};
use crate::provider::vault::MockVault;
use crate::repository::credential_repository::MockCredentialRepository;
use crate::util::jwt::decode_payload_json;

const HOLDER: &str = "did:key:zDnaeHolder";

fn user() -> UserId {
    "user-1".parse().unwrap()
}

fn jwt_vc(subject: &str, types: &[&str]) -> String {
    let encode =
        |value: Value| Base64UrlSafeNoPadding::encode_to_string(value.to_string()).unwrap();

    format!(
        "{}.{}.c2ln",
        encode(json!({"alg": "ES256", "typ": "JWT"})),
        encode(json!({
            "iss": "did:key:zDnaeIssuer",
            "sub": subject,
            "vc": {"type": types}
        }))
    )
}

fn credential(types: &[&str], state: CredentialStateEnum) -> Credential {
    let now = OffsetDateTime::now_utc();
    Credential {
        id: CredentialId::new_v4(),
        created_date: now,
        last_modified: now,
        user_id: user(),
        format: "jwt_vc".to_string(),
        types: types.iter().map(ToString::to_string).collect(),
        credential: Some(jwt_vc(HOLDER, types)),
        state,
        holder_did: HOLDER.parse().unwrap(),
    }
}

/// Signer echoing the claims as an unsigned token so that tests can inspect them
fn echo_signer() -> Arc<HolderSigner> {
    let mut vault = MockVault::new();
    vault
        .expect_get_secret()
        .returning(|_, _| Ok(SecretString::from("{}".to_string())));

    let mut jwt_signer = MockJwtSigner::new();
    jwt_signer
        .expect_sign()
        .withf(|_, did, purpose, _| did.as_str() == HOLDER && *purpose == SigningPurpose::VpToken)
        .returning(|claims, _, _, _| {
            Ok(format!(
                "eyJhbGciOiJFUzI1NiJ9.{}.c2ln",
                Base64UrlSafeNoPadding::encode_to_string(claims.to_string()).unwrap()
            ))
        });

    Arc::new(HolderSigner::new(Arc::new(jwt_signer), Arc::new(vault)))
}

fn builder(repository: MockCredentialRepository) -> PresentationBuilder {
    PresentationBuilder::new(
        Arc::new(repository),
        echo_signer(),
        PresentationParams {
            vp_token_ttl: Duration::seconds(600),
            leeway: Duration::ZERO,
        },
    )
}

fn definition(types: &[&str]) -> PresentationDefinition {
    serde_json::from_value(json!({
        "id": "pd-1",
        "input_descriptors": types.iter().enumerate().map(|(index, credential_type)| json!({
            "id": format!("descriptor-{index}"),
            "constraints": {
                "fields": [{
                    "path": ["$.vc.type"],
                    "filter": {
                        "type": "array",
                        "contains": {"const": credential_type}
                    }
                }]
            }
        })).collect::<Vec<_>>()
    }))
    .unwrap()
}

#[tokio::test]
async fn test_build_presentation_by_definition() {
    // given
    let diploma = credential(&["VerifiableCredential", "Diploma"], CredentialStateEnum::Valid);
    let other_diploma =
        credential(&["VerifiableCredential", "Diploma"], CredentialStateEnum::Valid);
    let pending = credential(&["VerifiableCredential", "Pid"], CredentialStateEnum::Issued);
    let pid = credential(&["VerifiableCredential", "Pid"], CredentialStateEnum::Valid);

    let stored = vec![
        pending.clone(),
        diploma.clone(),
        other_diploma.clone(),
        pid.clone(),
    ];
    let mut repository = MockCredentialRepository::new();
    repository
        .expect_get_credentials_by_user()
        .with(eq(user()))
        .once()
        .returning(move |_| Ok(stored.clone()));

    // when
    let built = builder(repository)
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::ByDefinition(definition(&[
                "Pid", "Diploma", "Diploma",
            ])),
            nonce: Some("nonce-1".to_string()),
            audience: Some("https://verifier.example".to_string()),
        })
        .await
        .unwrap();

    // then
    assert_eq!(built.holder_did.as_str(), HOLDER);
    assert_eq!(built.credential_ids, vec![pid.id, diploma.id, other_diploma.id]);

    let submission = built.presentation_submission.unwrap();
    assert_eq!(submission.definition_id, "pd-1");
    assert_eq!(submission.descriptor_map.len(), 3);
    for (index, descriptor) in submission.descriptor_map.iter().enumerate() {
        assert_eq!(descriptor.id, format!("descriptor-{index}"));
        assert_eq!(descriptor.format, "jwt_vp");
        assert_eq!(descriptor.path, "$");
        let nested = descriptor.path_nested.as_ref().unwrap();
        assert_eq!(nested.format, "jwt_vc");
        assert_eq!(nested.path, format!("$.vp.verifiableCredential[{index}]"));
    }

    let claims = decode_payload_json(&built.vp_token).unwrap();
    assert_eq!(claims["iss"], HOLDER);
    assert_eq!(claims["sub"], HOLDER);
    assert_eq!(claims["nonce"], "nonce-1");
    assert_eq!(claims["aud"], "https://verifier.example");
    assert_eq!(claims["vp"]["holder"], HOLDER);
    assert_eq!(claims["vp"]["type"], json!(["VerifiablePresentation"]));
    assert!(claims["vp"]["id"].as_str().unwrap().starts_with("urn:uuid:"));
    assert_eq!(
        claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
        600
    );
    similar_asserts::assert_eq!(
        claims["vp"]["verifiableCredential"],
        json!([
            pid.credential.unwrap(),
            diploma.credential.unwrap(),
            other_diploma.credential.unwrap()
        ])
    );
}

#[tokio::test]
async fn test_build_presentation_by_definition_without_match() {
    let stored = vec![credential(
        &["VerifiableCredential", "Diploma"],
        CredentialStateEnum::Valid,
    )];
    let mut repository = MockCredentialRepository::new();
    repository
        .expect_get_credentials_by_user()
        .returning(move |_| Ok(stored.clone()));

    let result = builder(repository)
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::ByDefinition(definition(&["Diploma", "Diploma"])),
            nonce: None,
            audience: None,
        })
        .await;

    assert!(matches!(
        result,
        Err(PresentationError::NoMatchingCredential(descriptor)) if descriptor == "descriptor-1"
    ));
}

#[tokio::test]
async fn test_build_presentation_explicit_selection() {
    let selected = credential(&["VerifiableCredential", "Pid"], CredentialStateEnum::Valid);
    let returned = selected.clone();

    let mut repository = MockCredentialRepository::new();
    repository
        .expect_get_credential_data_by_id()
        .with(eq(selected.id))
        .once()
        .returning(move |_| Ok(Some(returned.clone())));

    let built = builder(repository)
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::Explicit(vec![selected.id]),
            nonce: None,
            audience: None,
        })
        .await
        .unwrap();

    assert!(built.presentation_submission.is_none());
    assert_eq!(built.credential_ids, vec![selected.id]);
    let claims = decode_payload_json(&built.vp_token).unwrap();
    assert!(claims.get("aud").is_none());
    assert!(claims.get("nonce").is_none());
}

#[tokio::test]
async fn test_build_presentation_explicit_foreign_credential() {
    let mut foreign = credential(&["VerifiableCredential"], CredentialStateEnum::Valid);
    foreign.user_id = "someone-else".parse().unwrap();
    let id = foreign.id;

    let mut repository = MockCredentialRepository::new();
    repository
        .expect_get_credential_data_by_id()
        .returning(move |_| Ok(Some(foreign.clone())));

    let result = builder(repository)
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::Explicit(vec![id]),
            nonce: None,
            audience: None,
        })
        .await;

    assert!(matches!(
        result,
        Err(PresentationError::CredentialNotFound(not_found)) if not_found == id
    ));
}

#[tokio::test]
async fn test_build_presentation_by_types() {
    let pid = credential(&["VerifiableCredential", "Pid"], CredentialStateEnum::Valid);
    let stored = vec![pid.clone()];

    let mut repository = MockCredentialRepository::new();
    repository
        .expect_get_credentials_by_user()
        .returning(move |_| Ok(stored.clone()));

    let built = builder(repository)
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::ByTypes(vec!["Pid".to_string()]),
            nonce: None,
            audience: None,
        })
        .await
        .unwrap();

    assert_eq!(built.credential_ids, vec![pid.id]);
}

#[tokio::test]
async fn test_build_presentation_empty_selection() {
    let result = builder(MockCredentialRepository::new())
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::Explicit(vec![]),
            nonce: None,
            audience: None,
        })
        .await;

    assert!(matches!(result, Err(PresentationError::EmptySelection)));
}

#[tokio::test]
async fn test_build_presentation_holder_from_json_credential() {
    let mut json_credential = credential(&["VerifiableCredential"], CredentialStateEnum::Valid);
    json_credential.credential = Some(
        json!({
            "type": ["VerifiableCredential"],
            "credentialSubject": {"id": HOLDER}
        })
        .to_string(),
    );
    let id = json_credential.id;

    let mut repository = MockCredentialRepository::new();
    repository
        .expect_get_credential_data_by_id()
        .returning(move |_| Ok(Some(json_credential.clone())));

    let built = builder(repository)
        .build_presentation(PresentationRequest {
            user_id: user(),
            selection: CredentialSelection::Explicit(vec![id]),
            nonce: None,
            audience: None,
        })
        .await
        .unwrap();

    let holder: DidValue = HOLDER.parse().unwrap();
    assert_eq!(built.holder_did, holder);
    let claims = decode_payload_json(&built.vp_token).unwrap();
    assert_eq!(
        claims["vp"]["verifiableCredential"][0]["credentialSubject"]["id"],
        HOLDER
    );
}
