use std::sync::Arc;

use thiserror::Error;

use crate::provider::http_client::{self, HttpClient};


#[derive(Debug, Error)]
pub enum MetadataFetchError {
    #[error("Metadata transport error: `{0}`")]
    Transport(http_client::Error),
    #[error("Invalid metadata response: `{0}`")]
    InvalidResponse(String),
}

/// Dereferences JSON documents: credential offers, issuer and authorization server metadata,
/// presentation definitions
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, MetadataFetchError>;
}

pub struct HttpMetadataFetcher {
    client: Arc<dyn HttpClient>,
}

impl HttpMetadataFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, MetadataFetchError> {
        self.client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(MetadataFetchError::Transport)?
            .json()
            .map_err(|e| MetadataFetchError::InvalidResponse(e.to_string()))
    }
}
