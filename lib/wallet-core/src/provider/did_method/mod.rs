use thiserror::Error;

pub mod key;

#[derive(Debug, Error)]
pub enum DidMethodError {
    #[error("Could not create: `{0}`")]
    CouldNotCreate(String),
    #[error("Could not resolve: `{0}`")]
    ResolutionError(String),
    #[error("Not supported")]
    NotSupported,
}
