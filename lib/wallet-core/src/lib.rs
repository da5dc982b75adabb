//! Holder-side credential exchange engine: OpenID4VCI issuance (with the EBSI and DOME
//! variants), `jwt_vp` presentations, verifier request validation and the CBOR/COSE offline
//! presentation encoding.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::ConfigValidationError;
use crate::config::core_config::CoreConfig;
use crate::provider::http_client::HttpClient;
use crate::provider::http_client::reqwest_client::ReqwestClient;
use crate::provider::issuance_protocol::openid4vci::OpenID4VCIHolder;
use crate::provider::issuance_protocol::openid4vci::model::OpenID4VCIHolderParams;
use crate::provider::metadata_fetcher::{HttpMetadataFetcher, MetadataFetcher};
use crate::provider::presentation::{PresentationBuilder, PresentationParams};
use crate::provider::signer::local::LocalJwtSigner;
use crate::provider::signer::{HolderSigner, JwtSigner};
use crate::provider::vault::Vault;
use crate::repository::credential_repository::CredentialRepository;
use crate::repository::deferred_credential_repository::DeferredCredentialRepository;
use crate::service::ssi_holder::SSIHolderService;

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod repository;
pub mod service;
pub mod util;

#[cfg(test)]
mod test;

#[derive(Debug, Error)]
pub enum WalletCoreBuildError {
    #[error("Missing dependency: `{0}`")]
    MissingDependency(&'static str),
    #[error("Invalid configuration: `{0}`")]
    Config(#[from] ConfigValidationError),
    #[error("HTTP client error: `{0}`")]
    HttpClient(#[from] provider::http_client::Error),
}

#[derive(Default)]
pub struct WalletCoreBuilder {
    config: CoreConfig,
    credential_repository: Option<Arc<dyn CredentialRepository>>,
    deferred_credential_repository: Option<Arc<dyn DeferredCredentialRepository>>,
    vault: Option<Arc<dyn Vault>>,
    jwt_signer: Option<Arc<dyn JwtSigner>>,
    http_client: Option<Arc<dyn HttpClient>>,
    metadata_fetcher: Option<Arc<dyn MetadataFetcher>>,
}

impl WalletCoreBuilder {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_credential_repository(mut self, repository: Arc<dyn CredentialRepository>) -> Self {
        self.credential_repository = Some(repository);
        self
    }

    pub fn with_deferred_credential_repository(
        mut self,
        repository: Arc<dyn DeferredCredentialRepository>,
    ) -> Self {
        self.deferred_credential_repository = Some(repository);
        self
    }

    pub fn with_vault(mut self, vault: Arc<dyn Vault>) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Defaults to [`LocalJwtSigner`]
    pub fn with_jwt_signer(mut self, signer: Arc<dyn JwtSigner>) -> Self {
        self.jwt_signer = Some(signer);
        self
    }

    /// Must not follow redirects, defaults to [`ReqwestClient::without_redirects`]
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_metadata_fetcher(mut self, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        self.metadata_fetcher = Some(fetcher);
        self
    }

    pub fn build(self) -> Result<WalletCore, WalletCoreBuildError> {
        self.config.validate()?;

        let credential_repository = self
            .credential_repository
            .ok_or(WalletCoreBuildError::MissingDependency("credential repository"))?;
        let deferred_credential_repository = self
            .deferred_credential_repository
            .ok_or(WalletCoreBuildError::MissingDependency(
                "deferred credential repository",
            ))?;
        let vault = self
            .vault
            .ok_or(WalletCoreBuildError::MissingDependency("vault"))?;

        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestClient::without_redirects()?),
        };
        let metadata_fetcher = self
            .metadata_fetcher
            .unwrap_or_else(|| Arc::new(HttpMetadataFetcher::new(http_client.clone())));
        let jwt_signer = self
            .jwt_signer
            .unwrap_or_else(|| Arc::new(LocalJwtSigner::default()));

        let signer = Arc::new(HolderSigner::new(jwt_signer, vault.clone()));
        let presentation_builder = Arc::new(PresentationBuilder::new(
            credential_repository.clone(),
            signer.clone(),
            PresentationParams {
                vp_token_ttl: self.config.presentation.vp_token_ttl,
                leeway: self.config.presentation.leeway,
            },
        ));

        let issuance = &self.config.issuance;
        let issuance_protocol = Arc::new(OpenID4VCIHolder::new(
            http_client,
            metadata_fetcher,
            vault.clone(),
            signer,
            presentation_builder.clone(),
            OpenID4VCIHolderParams {
                redirect_uri: issuance.redirect_uri.to_owned(),
                client_id: issuance.client_id.to_owned(),
                did_key_mode: issuance.did_key_mode,
                legacy_deferred_polling: issuance.legacy_deferred_polling,
                deferred_polling_interval: issuance.deferred_polling_interval,
                id_token_ttl: self.config.presentation.vp_token_ttl,
            },
        ));

        let cancellation = CancellationToken::new();

        Ok(WalletCore {
            ssi_holder_service: SSIHolderService::new(
                credential_repository,
                deferred_credential_repository,
                issuance_protocol,
                presentation_builder,
                vault,
                cancellation.clone(),
            ),
            cancellation,
        })
    }
}

#[derive(Clone)]
pub struct WalletCore {
    pub ssi_holder_service: SSIHolderService,
    cancellation: CancellationToken,
}

impl WalletCore {
    /// Aborts running legacy deferred polling loops, flows started afterwards fail the same way
    pub fn shutdown(&self) {
        tracing::info!("Shutting down wallet core");
        self.cancellation.cancel();
    }
}
