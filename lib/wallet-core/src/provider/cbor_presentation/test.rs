use std::io::{Read, Write};

use coset::{CoseSign1, TaggedCborSerializable};
use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde_json::{Value, json};
use wallet_crypto::signer::es256::ES256Signer;

use super::{CborEncodingError, CborPresentationEncoder};
use crate::error::{ErrorCategory, ErrorCategoryMixin};

const BASE45_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

fn vp_payload() -> Value {
    json!({
        "iss": "did:key:zDnaeHolder",
        "sub": "did:key:zDnaeHolder",
        "iat": 1_700_000_000,
        "exp": 1_700_000_600,
        "nonce": "n-0S6_WzA2Mj",
        "vp": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiablePresentation"],
            "holder": "did:key:zDnaeHolder",
            "verifiableCredential": ["eyJhbGciOiJFUzI1NiJ9.eyJ2YyI6e319.c2ln"]
        }
    })
}

fn vp_token(payload: &Value) -> String {
    format!(
        "eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCJ9.{}.c2ln",
        Base64UrlSafeNoPadding::encode_to_string(payload.to_string()).unwrap()
    )
}

fn unpack(encoded: &str) -> CoseSign1 {
    let compressed = base45::decode(encoded).unwrap();
    let mut cose = vec![];
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut cose)
        .unwrap();
    CoseSign1::from_tagged_slice(&cose).unwrap()
}

fn pack(cose_sign1: CoseSign1) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&cose_sign1.to_tagged_vec().unwrap())
        .unwrap();
    base45::encode(encoder.finish().unwrap())
}

#[test]
fn test_encode_then_decode_recovers_payload() {
    // given
    let encoder = CborPresentationEncoder;
    let payload = vp_payload();

    // when
    let encoded = encoder.encode_presentation(&vp_token(&payload)).unwrap();

    // then
    assert!(encoded.chars().all(|c| BASE45_CHARSET.contains(c)));
    assert_eq!(encoder.decode_presentation(&encoded).unwrap(), payload);
}

#[test]
fn test_encoded_pipeline_layers() {
    let encoded = CborPresentationEncoder
        .encode_presentation(&vp_token(&vp_payload()))
        .unwrap();

    let compressed = base45::decode(&encoded).unwrap();
    // zlib header, best compression
    assert_eq!(&compressed[..2], &[0x78, 0xda]);

    let cose_sign1 = unpack(&encoded);
    assert_eq!(
        cose_sign1.protected.header.alg,
        Some(coset::RegisteredLabelWithPrivate::Assigned(
            coset::iana::Algorithm::ES256
        ))
    );
    // SEC1 compressed point of the ephemeral key
    assert_eq!(cose_sign1.unprotected.key_id.len(), 33);
    assert!(matches!(cose_sign1.unprotected.key_id[0], 0x02 | 0x03));

    let payload: Value =
        ciborium::from_reader(cose_sign1.payload.unwrap().as_slice()).unwrap();
    assert_eq!(payload, vp_payload());
}

#[test]
fn test_each_encoding_uses_fresh_key() {
    let token = vp_token(&vp_payload());

    let first = unpack(&CborPresentationEncoder.encode_presentation(&token).unwrap());
    let second = unpack(&CborPresentationEncoder.encode_presentation(&token).unwrap());

    assert_ne!(first.unprotected.key_id, second.unprotected.key_id);
}

#[test]
fn test_decode_rejects_tampered_payload() {
    // given
    let encoded = CborPresentationEncoder
        .encode_presentation(&vp_token(&vp_payload()))
        .unwrap();
    let mut cose_sign1 = unpack(&encoded);

    let mut forged = vec![];
    ciborium::into_writer(&json!({"iss": "did:key:zDnaeAttacker"}), &mut forged).unwrap();
    cose_sign1.payload = Some(forged);

    // when
    let result = CborPresentationEncoder.decode_presentation(&pack(cose_sign1));

    // then
    let error = result.unwrap_err();
    assert!(matches!(error, CborEncodingError::InvalidSignature));
    assert_eq!(error.error_category(), ErrorCategory::SignatureInvalid);
}

#[test]
fn test_decode_rejects_foreign_key_id() {
    let encoded = CborPresentationEncoder
        .encode_presentation(&vp_token(&vp_payload()))
        .unwrap();
    let mut cose_sign1 = unpack(&encoded);
    cose_sign1.unprotected.key_id = ES256Signer::generate_key_pair().public;

    let result = CborPresentationEncoder.decode_presentation(&pack(cose_sign1));

    assert!(matches!(result, Err(CborEncodingError::InvalidSignature)));
}

#[test]
fn test_decode_rejects_missing_key_id() {
    let encoded = CborPresentationEncoder
        .encode_presentation(&vp_token(&vp_payload()))
        .unwrap();
    let mut cose_sign1 = unpack(&encoded);
    cose_sign1.unprotected.key_id = vec![];

    let result = CborPresentationEncoder.decode_presentation(&pack(cose_sign1));

    assert!(matches!(result, Err(CborEncodingError::MissingKeyId)));
}

#[test]
fn test_decode_rejects_invalid_base45() {
    let error = CborPresentationEncoder
        .decode_presentation("not base45 ~~~")
        .unwrap_err();

    assert!(matches!(error, CborEncodingError::Base45(_)));
    assert_eq!(error.error_category(), ErrorCategory::ParseError);
}

#[test]
fn test_decode_rejects_uncompressed_input() {
    let result = CborPresentationEncoder.decode_presentation(&base45::encode(b"plain bytes"));

    assert!(matches!(result, Err(CborEncodingError::Inflate(_))));
}

#[test]
fn test_encode_rejects_malformed_token() {
    let error = CborPresentationEncoder
        .encode_presentation("not-a-jwt")
        .unwrap_err();

    assert!(matches!(error, CborEncodingError::InvalidToken(_)));
    assert_eq!(error.error_category(), ErrorCategory::ParseError);
}
