use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, serde_as, skip_serializing_none};
use time::OffsetDateTime;

use crate::model::key::PublicKeyJwk;

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JWTHeader {
    // https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.1
    #[serde(rename = "alg")]
    pub algorithm: String,

    // https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.4
    #[serde(rename = "kid", default)]
    pub key_id: Option<String>,

    // https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.9
    #[serde(rename = "typ", default)]
    pub r#type: Option<String>,

    // https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.3
    #[serde(rename = "jwk", default)]
    pub jwk: Option<PublicKeyJwk>,
}

/// <https://www.rfc-editor.org/rfc/rfc7519.html#section-4.1>
#[skip_serializing_none]
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JWTPayload<CustomPayload> {
    #[serde(rename = "iat", default, with = "crate::util::timestamp::option")]
    pub issued_at: Option<OffsetDateTime>,

    #[serde(rename = "exp", default, with = "crate::util::timestamp::option")]
    pub expires_at: Option<OffsetDateTime>,

    #[serde(rename = "nbf", default, with = "crate::util::timestamp::option")]
    pub invalid_before: Option<OffsetDateTime>,

    #[serde(rename = "iss", default)]
    pub issuer: Option<String>,

    #[serde(rename = "sub", default)]
    pub subject: Option<String>,

    #[serde(rename = "aud", default)]
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub audience: Option<Vec<String>>,

    #[serde(rename = "jti", default)]
    pub jwt_id: Option<String>,

    #[serde(flatten)]
    pub custom: CustomPayload,
}

#[derive(Debug)]
pub struct DecomposedToken<Payload> {
    pub header: JWTHeader,
    pub payload: JWTPayload<Payload>,
    pub signature: Vec<u8>,
    /// `header.payload` part of the compact serialization, the JWS signing input
    pub unverified_jwt: String,
}
