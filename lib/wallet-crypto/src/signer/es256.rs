use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{EncodedPoint, FieldBytes, PublicKey};
use secrecy::{ExposeSecret, SecretSlice};

use crate::utilities::get_rng;
use crate::{Signer, SignerError};

const COORDINATE_LENGTH: usize = 32;

pub struct ES256Signer;

pub struct KeyPair {
    /// SEC1 compressed point
    pub public: Vec<u8>,
    /// Raw 32-byte scalar
    pub private: SecretSlice<u8>,
}

impl ES256Signer {
    pub fn generate_key_pair() -> KeyPair {
        let signing_key = SigningKey::random(&mut get_rng());
        let public = signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();

        KeyPair {
            public,
            private: signing_key.to_bytes().to_vec().into(),
        }
    }

    pub fn parse_private_key(private_key: &SecretSlice<u8>) -> Result<KeyPair, SignerError> {
        let signing_key = SigningKey::from_slice(private_key.expose_secret())
            .map_err(|_| SignerError::CouldNotExtractKeyPair)?;
        let public = signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();

        Ok(KeyPair {
            public,
            private: signing_key.to_bytes().to_vec().into(),
        })
    }

    /// Validates a SEC1 encoded point and returns it re-encoded in the requested form
    pub fn parse_public_key(public_key: &[u8], compressed: bool) -> Result<Vec<u8>, SignerError> {
        let key = PublicKey::from_sec1_bytes(public_key)
            .map_err(|e| SignerError::CouldNotExtractPublicKey(e.to_string()))?;

        Ok(key.to_encoded_point(compressed).as_bytes().to_vec())
    }

    pub fn parse_public_key_coordinates(
        x: &[u8],
        y: &[u8],
        compressed: bool,
    ) -> Result<Vec<u8>, SignerError> {
        if x.len() != COORDINATE_LENGTH || y.len() != COORDINATE_LENGTH {
            return Err(SignerError::CouldNotExtractPublicKey(
                "Invalid coordinate length".to_string(),
            ));
        }

        let point = EncodedPoint::from_affine_coordinates(
            FieldBytes::from_slice(x),
            FieldBytes::from_slice(y),
            false,
        );

        Self::parse_public_key(point.as_bytes(), compressed)
    }

    /// Returns the affine `(x, y)` coordinates of a SEC1 encoded point
    pub fn get_public_key_coordinates(
        public_key: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), SignerError> {
        let key = PublicKey::from_sec1_bytes(public_key)
            .map_err(|e| SignerError::CouldNotExtractPublicKey(e.to_string()))?;
        let point = key.to_encoded_point(false);

        match (point.x(), point.y()) {
            (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
            _ => Err(SignerError::CouldNotExtractPublicKey(
                "Point at infinity".to_string(),
            )),
        }
    }

    fn to_verifying_key(public_key: &[u8]) -> Result<VerifyingKey, SignerError> {
        VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|e| SignerError::CouldNotExtractPublicKey(e.to_string()))
    }
}

impl Signer for ES256Signer {
    fn sign(
        &self,
        input: &[u8],
        public_key: &[u8],
        private_key: &SecretSlice<u8>,
    ) -> Result<Vec<u8>, SignerError> {
        let signing_key = SigningKey::from_slice(private_key.expose_secret())
            .map_err(|_| SignerError::CouldNotExtractKeyPair)?;

        let expected_public = Self::to_verifying_key(public_key)?;
        if signing_key.verifying_key() != &expected_public {
            return Err(SignerError::CouldNotExtractKeyPair);
        }

        let signature: Signature = signing_key
            .try_sign(input)
            .map_err(|e| SignerError::CouldNotSign(e.to_string()))?;

        Ok(signature.to_bytes().to_vec())
    }

    fn verify(
        &self,
        input: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<(), SignerError> {
        let verifying_key = Self::to_verifying_key(public_key)?;
        let signature =
            Signature::from_slice(signature).map_err(|_| SignerError::InvalidSignature)?;

        verifying_key
            .verify(input, &signature)
            .map_err(|_| SignerError::InvalidSignature)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let key_pair = ES256Signer::generate_key_pair();
        assert_eq!(key_pair.public.len(), 33);

        let signature = ES256Signer
            .sign(b"payload", &key_pair.public, &key_pair.private)
            .unwrap();
        assert_eq!(signature.len(), 64);

        ES256Signer
            .verify(b"payload", &signature, &key_pair.public)
            .unwrap();
        assert_eq!(
            ES256Signer.verify(b"tampered", &signature, &key_pair.public),
            Err(SignerError::InvalidSignature)
        );
    }

    #[test]
    fn test_sign_with_mismatching_public_key_fails() {
        let key_pair = ES256Signer::generate_key_pair();
        let other = ES256Signer::generate_key_pair();

        assert_eq!(
            ES256Signer.sign(b"payload", &other.public, &key_pair.private),
            Err(SignerError::CouldNotExtractKeyPair)
        );
    }

    #[test]
    fn test_coordinates_round_trip() {
        let key_pair = ES256Signer::generate_key_pair();

        let (x, y) = ES256Signer::get_public_key_coordinates(&key_pair.public).unwrap();
        let compressed = ES256Signer::parse_public_key_coordinates(&x, &y, true).unwrap();
        assert_eq!(compressed, key_pair.public);

        let uncompressed = ES256Signer::parse_public_key(&key_pair.public, false).unwrap();
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(uncompressed[0], 0x04);
    }

    #[test]
    fn test_parse_private_key_derives_public() {
        let key_pair = ES256Signer::generate_key_pair();
        let parsed = ES256Signer::parse_private_key(&key_pair.private).unwrap();
        assert_eq!(parsed.public, key_pair.public);
    }
}
