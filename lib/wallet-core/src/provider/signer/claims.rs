//! Claim sets signed by the holder

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use shared_types::DidValue;
use time::{Duration, OffsetDateTime};

use crate::util::jwt::model::JWTPayload;

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NonceClaims {
    pub nonce: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VpClaims {
    pub nonce: Option<String>,
    pub vp: Value,
}

/// OpenID4VCI key proof, `iss` is omitted for anonymous pre-authorized flows
pub fn proof_of_possession_claims(
    issuer: Option<&str>,
    credential_issuer: &str,
    nonce: Option<&str>,
    now: OffsetDateTime,
) -> Result<Value, serde_json::Error> {
    serde_json::to_value(JWTPayload {
        issued_at: Some(now),
        issuer: issuer.map(ToOwned::to_owned),
        audience: Some(vec![credential_issuer.to_owned()]),
        custom: NonceClaims {
            nonce: nonce.map(ToOwned::to_owned),
        },
        ..Default::default()
    })
}

/// Self-issued ID Token answering an authorization server's `id_token` request
pub fn id_token_claims(
    holder_did: &DidValue,
    audience: &str,
    nonce: Option<&str>,
    now: OffsetDateTime,
    ttl: Duration,
) -> Result<Value, serde_json::Error> {
    serde_json::to_value(JWTPayload {
        issued_at: Some(now),
        expires_at: Some(now + ttl),
        issuer: Some(holder_did.to_string()),
        subject: Some(holder_did.to_string()),
        audience: Some(vec![audience.to_owned()]),
        custom: NonceClaims {
            nonce: nonce.map(ToOwned::to_owned),
        },
        ..Default::default()
    })
}

pub struct VpTokenClaimsInput<'a> {
    pub holder_did: &'a DidValue,
    pub presentation: Value,
    pub presentation_id: &'a str,
    pub nonce: Option<&'a str>,
    pub audience: Option<&'a str>,
    pub now: OffsetDateTime,
    pub ttl: Duration,
    pub leeway: Duration,
}

/// JWT-VP envelope, <https://www.w3.org/TR/vc-data-model/#json-web-token>
pub fn vp_token_claims(input: VpTokenClaimsInput) -> Result<Value, serde_json::Error> {
    serde_json::to_value(JWTPayload {
        issued_at: Some(input.now),
        expires_at: Some(input.now + input.ttl),
        invalid_before: Some(input.now - input.leeway),
        issuer: Some(input.holder_did.to_string()),
        subject: Some(input.holder_did.to_string()),
        audience: input.audience.map(|audience| vec![audience.to_owned()]),
        jwt_id: Some(input.presentation_id.to_owned()),
        custom: VpClaims {
            nonce: input.nonce.map(ToOwned::to_owned),
            vp: input.presentation,
        },
    })
}
