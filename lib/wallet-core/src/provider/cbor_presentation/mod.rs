//! Offline presentation encoding: JWT-VP payload as CBOR, signed in a `COSE_Sign1` with an
//! ephemeral P-256 key, zlib-deflated and Base45 encoded (the EU DCC transport shape)

use std::io::{Read, Write};

use coset::iana::Algorithm;
use coset::{
    CoseSign1, CoseSign1Builder, HeaderBuilder, RegisteredLabelWithPrivate,
    TaggedCborSerializable,
};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde_json::Value;
use thiserror::Error;
use wallet_crypto::signer::es256::ES256Signer;
use wallet_crypto::{Signer, SignerError};

use crate::error::{ErrorCategory, ErrorCategoryMixin};
use crate::util::jwt::{JwtError, decode_payload_json};

#[cfg(test)]
mod test;

#[derive(Debug, Error)]
pub enum CborEncodingError {
    #[error("Invalid presentation token: `{0}`")]
    InvalidToken(#[from] JwtError),
    #[error("CBOR encoding error: `{0}`")]
    CborEncoding(String),
    #[error("CBOR decoding error: `{0}`")]
    CborDecoding(String),
    #[error("COSE error: `{0}`")]
    Cose(String),
    #[error("Compression error: `{0}`")]
    Deflate(std::io::Error),
    #[error("Decompression error: `{0}`")]
    Inflate(std::io::Error),
    #[error("Base45 error: `{0}`")]
    Base45(String),
    #[error("Unsupported COSE algorithm")]
    UnsupportedAlgorithm,
    #[error("Missing COSE key id")]
    MissingKeyId,
    #[error("Signing error: `{0}`")]
    Signing(SignerError),
    #[error("Invalid COSE signature")]
    InvalidSignature,
}

impl ErrorCategoryMixin for CborEncodingError {
    fn error_category(&self) -> ErrorCategory {
        match self {
            Self::CborEncoding(_) | Self::Deflate(_) | Self::Signing(_) => {
                ErrorCategory::SerializationFailure
            }
            Self::InvalidToken(_)
            | Self::CborDecoding(_)
            | Self::Cose(_)
            | Self::Inflate(_)
            | Self::Base45(_)
            | Self::UnsupportedAlgorithm
            | Self::MissingKeyId => ErrorCategory::ParseError,
            Self::InvalidSignature => ErrorCategory::SignatureInvalid,
        }
    }
}

#[derive(Debug, Default)]
pub struct CborPresentationEncoder;

impl CborPresentationEncoder {
    pub fn encode_presentation(&self, vp_token: &str) -> Result<String, CborEncodingError> {
        let payload = decode_payload_json(vp_token)?;

        let mut cbor = vec![];
        ciborium::into_writer(&payload, &mut cbor)
            .map_err(|e| CborEncodingError::CborEncoding(e.to_string()))?;

        let key_pair = ES256Signer::generate_key_pair();

        let cose_sign1 = CoseSign1Builder::new()
            .protected(HeaderBuilder::new().algorithm(Algorithm::ES256).build())
            .unprotected(HeaderBuilder::new().key_id(key_pair.public.to_owned()).build())
            .payload(cbor)
            .try_create_signature(&[], |data| {
                ES256Signer.sign(data, &key_pair.public, &key_pair.private)
            })
            .map_err(CborEncodingError::Signing)?
            .build();

        let cose = cose_sign1
            .to_tagged_vec()
            .map_err(|e| CborEncodingError::Cose(e.to_string()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&cose)
            .map_err(CborEncodingError::Deflate)?;
        let compressed = encoder.finish().map_err(CborEncodingError::Deflate)?;

        tracing::debug!(
            cose_size = cose.len(),
            compressed_size = compressed.len(),
            "Encoded CBOR presentation"
        );

        Ok(base45::encode(compressed))
    }

    /// Reverses [`Self::encode_presentation`], verifying the signature against the key id
    pub fn decode_presentation(&self, encoded: &str) -> Result<Value, CborEncodingError> {
        let compressed =
            base45::decode(encoded.trim()).map_err(|e| CborEncodingError::Base45(e.to_string()))?;

        let mut cose = vec![];
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut cose)
            .map_err(CborEncodingError::Inflate)?;

        let cose_sign1 = CoseSign1::from_tagged_slice(&cose)
            .map_err(|e| CborEncodingError::Cose(e.to_string()))?;

        if cose_sign1.protected.header.alg
            != Some(RegisteredLabelWithPrivate::Assigned(Algorithm::ES256))
        {
            return Err(CborEncodingError::UnsupportedAlgorithm);
        }

        let public_key = &cose_sign1.unprotected.key_id;
        if public_key.is_empty() {
            return Err(CborEncodingError::MissingKeyId);
        }

        cose_sign1
            .verify_signature(&[], |signature, data| {
                ES256Signer.verify(data, signature, public_key)
            })
            .map_err(|_| CborEncodingError::InvalidSignature)?;

        let payload = cose_sign1
            .payload
            .ok_or_else(|| CborEncodingError::Cose("Missing payload".to_string()))?;

        ciborium::from_reader(payload.as_slice())
            .map_err(|e| CborEncodingError::CborDecoding(e.to_string()))
    }
}
