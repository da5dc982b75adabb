use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use wallet_crypto::signer::es256::ES256Signer;

use crate::model::key::{PublicKeyJwk, PublicKeyJwkEllipticData};
use crate::provider::did_method::DidMethodError;

pub(super) const DID_KEY_PREFIX: &str = "did:key:";
/// Multibase prefix of base58btc
pub(super) const BASE58_BTC_PREFIX: char = 'z';

/// Unsigned varint of multicodec `p256-pub` (0x1200)
pub(super) const MULTICODEC_P256_PUB: [u8; 2] = [0x80, 0x24];
/// Unsigned varint of multicodec `jwk_jcs-pub` (0xeb51)
pub(super) const MULTICODEC_JWK_JCS_PUB: [u8; 3] = [0xd1, 0xd6, 0x03];

const P256_CURVE: &str = "P-256";

pub(super) fn encode_multibase(codec: &[u8], data: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(codec.len() + data.len());
    bytes.extend_from_slice(codec);
    bytes.extend_from_slice(data);

    format!("{BASE58_BTC_PREFIX}{}", bs58::encode(bytes).into_string())
}

pub(super) fn decode_multibase(multibase: &str) -> Result<Vec<u8>, DidMethodError> {
    let encoded = multibase
        .strip_prefix(BASE58_BTC_PREFIX)
        .ok_or_else(|| DidMethodError::ResolutionError("Unsupported multibase".to_string()))?;

    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| DidMethodError::ResolutionError(format!("Invalid base58: {e}")))
}

pub(super) fn public_key_to_jwk(public_key: &[u8]) -> Result<PublicKeyJwk, DidMethodError> {
    let (x, y) = ES256Signer::get_public_key_coordinates(public_key)
        .map_err(|e| DidMethodError::CouldNotCreate(e.to_string()))?;

    Ok(PublicKeyJwk::Ec(PublicKeyJwkEllipticData {
        crv: P256_CURVE.to_string(),
        x: encode_coordinate(&x)?,
        y: Some(encode_coordinate(&y)?),
        kid: None,
    }))
}

/// Returns the SEC1 compressed point of a P-256 JWK
pub(super) fn jwk_to_public_key(jwk: &PublicKeyJwk) -> Result<Vec<u8>, DidMethodError> {
    let PublicKeyJwk::Ec(data) = jwk;
    if data.crv != P256_CURVE {
        return Err(DidMethodError::NotSupported);
    }

    let x = decode_coordinate(&data.x)?;
    let y = decode_coordinate(
        data.y
            .as_deref()
            .ok_or_else(|| DidMethodError::ResolutionError("Y is missing".to_string()))?,
    )?;

    ES256Signer::parse_public_key_coordinates(&x, &y, true)
        .map_err(|e| DidMethodError::ResolutionError(e.to_string()))
}

pub(super) fn encode_coordinate(value: &[u8]) -> Result<String, DidMethodError> {
    Base64UrlSafeNoPadding::encode_to_string(value)
        .map_err(|e| DidMethodError::CouldNotCreate(e.to_string()))
}

fn decode_coordinate(value: &str) -> Result<Vec<u8>, DidMethodError> {
    Base64UrlSafeNoPadding::decode_to_vec(value, None)
        .map_err(|e| DidMethodError::ResolutionError(e.to_string()))
}
