pub mod credential_repository;
pub mod deferred_credential_repository;
pub mod error;
