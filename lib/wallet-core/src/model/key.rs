use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// see: <https://datatracker.ietf.org/doc/html/rfc7517>
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty", rename_all = "UPPERCASE")]
pub enum PublicKeyJwk {
    Ec(PublicKeyJwkEllipticData),
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwkEllipticData {
    pub crv: String,
    pub x: String,
    pub y: Option<String>,
    pub kid: Option<String>,
}

/// Private EC JWK, only ever held transiently between vault and signer
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateKeyJwkEllipticData {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    pub d: String,
}

impl std::fmt::Debug for PrivateKeyJwkEllipticData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyJwkEllipticData")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &"[REDACTED]")
            .finish()
    }
}
