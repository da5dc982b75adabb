pub mod cbor_presentation;
pub mod did_method;
pub mod http_client;
pub mod issuance_protocol;
pub mod metadata_fetcher;
pub mod presentation;
pub mod signer;
pub mod vault;
pub mod verification_protocol;
