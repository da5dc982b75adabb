pub mod bearer_token;
pub mod jwt;
pub mod params;
pub mod pkce;
pub(crate) mod timestamp;
