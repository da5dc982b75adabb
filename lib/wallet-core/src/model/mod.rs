pub mod credential;
pub mod deferred_credential;
pub mod key;
