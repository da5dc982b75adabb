use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};

use super::JwtError;

pub fn bin_to_b64url_string(bin: &[u8]) -> Result<String, JwtError> {
    Base64UrlSafeNoPadding::encode_to_string(bin)
        .map_err(|e| JwtError::CouldNotFormat(e.to_string()))
}

pub fn string_to_b64url_string(string: &str) -> Result<String, JwtError> {
    Base64UrlSafeNoPadding::encode_to_string(string)
        .map_err(|e| JwtError::CouldNotFormat(e.to_string()))
}

pub fn b64url_to_bin(value: &str) -> Result<Vec<u8>, JwtError> {
    Base64UrlSafeNoPadding::decode_to_vec(value, None)
        .map_err(|e| JwtError::CouldNotExtract(e.to_string()))
}
