use shared_types::UserId;
use tokio_util::sync::CancellationToken;

use self::error::IssuanceProtocolError;
use self::openid4vci::model::{AcceptedOffer, CredentialOffer, DeferredPollOutcome};

pub mod error;
pub mod openid4vci;

/// Holder side of a credential issuance protocol
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait IssuanceProtocol: Send + Sync {
    /// Dereferences an offer URL into a validated offer
    async fn resolve_offer(
        &self,
        offer_reference: &str,
    ) -> Result<CredentialOffer, IssuanceProtocolError>;

    /// Runs the issuance of every credential of the offer, in order
    async fn holder_accept_offer(
        &self,
        offer: &CredentialOffer,
        user_id: &UserId,
        tx_code: Option<String>,
        cancellation: &CancellationToken,
    ) -> Result<AcceptedOffer, IssuanceProtocolError>;

    /// One request to the deferred credential endpoint
    async fn holder_request_deferred_credential(
        &self,
        deferred_endpoint: &str,
        access_token: &str,
        transaction_id: &str,
    ) -> Result<DeferredPollOutcome, IssuanceProtocolError>;
}
