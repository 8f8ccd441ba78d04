// Transfer channel - Moves value into and out of ledger custody
// The ledger records amounts and authorizes movements; the channel performs them.

use crate::campaign::{Amount, CampaignId};
use crate::identity::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

// ============================================================================
// TRANSFER REQUEST
// ============================================================================

/// Which way value moves relative to ledger custody
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Donor -> custody
    Collect,
    /// Custody -> campaign creator
    Release,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collect => write!(f, "collect"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// A single movement the ledger asks the channel to perform
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    campaign_id: CampaignId,
    /// Donor for a collect, creator for a release
    party: Address,
    amount: Amount,
    direction: TransferDirection,
}

impl TransferRequest {
    pub fn collect(campaign_id: CampaignId, donor: Address, amount: Amount) -> Self {
        Self {
            campaign_id,
            party: donor,
            amount,
            direction: TransferDirection::Collect,
        }
    }

    pub fn release(campaign_id: CampaignId, creator: Address, amount: Amount) -> Self {
        Self {
            campaign_id,
            party: creator,
            amount,
            direction: TransferDirection::Release,
        }
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn party(&self) -> &Address {
        &self.party
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn direction(&self) -> TransferDirection {
        self.direction
    }
}

// ============================================================================
// TRANSFER CHANNEL TRAIT
// ============================================================================

/// External mechanism that physically moves funds (chain transfer, escrow, ...)
#[async_trait]
pub trait TransferChannel: Send + Sync {
    /// Perform the movement.
    /// Returns a transfer ID on success, error message on failure
    async fn transfer(&self, request: &TransferRequest) -> Result<String, String>;
}

// ============================================================================
// MOCK TRANSFER CHANNEL
// ============================================================================

/// In-memory channel for tests and the console. Confirms every movement
/// unless told to reject a direction or an upcoming number of attempts,
/// and keeps each request it was asked to perform.
#[derive(Default)]
pub struct MockTransferChannel {
    rejected: Option<(Option<TransferDirection>, String)>,
    delay: Duration,
    /// Attempts still to be rejected before the channel recovers
    outage: AtomicUsize,
    attempts: AtomicUsize,
    seen: Mutex<Vec<TransferRequest>>,
}

impl MockTransferChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every movement with `reason`
    pub fn with_failure(self, reason: &str) -> Self {
        self.rejecting(None, reason)
    }

    /// Reject movements in one direction only
    pub fn with_rejected_direction(self, direction: TransferDirection, reason: &str) -> Self {
        self.rejecting(Some(direction), reason)
    }

    /// Reject the next `attempts` movements, then confirm again
    pub fn with_outage(self, attempts: usize) -> Self {
        self.outage.store(attempts, Ordering::SeqCst);
        self
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Number of transfer attempts seen so far
    pub fn call_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order
    pub async fn requests(&self) -> Vec<TransferRequest> {
        self.seen.lock().await.clone()
    }

    fn rejecting(mut self, direction: Option<TransferDirection>, reason: &str) -> Self {
        self.rejected = Some((direction, reason.to_string()));
        self
    }

    fn rejection_for(&self, request: &TransferRequest) -> Option<String> {
        let in_outage = self
            .outage
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if in_outage {
            return Some("channel unavailable".to_string());
        }
        match &self.rejected {
            Some((None, reason)) => Some(reason.clone()),
            Some((Some(direction), reason)) if *direction == request.direction() => Some(reason.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl TransferChannel for MockTransferChannel {
    async fn transfer(&self, request: &TransferRequest) -> Result<String, String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen.lock().await.push(request.clone());

        match self.rejection_for(request) {
            Some(reason) => Err(reason),
            None => Ok(format!(
                "mock-{}-{}-{}",
                request.direction(),
                request.campaign_id(),
                attempt
            )),
        }
    }
}
