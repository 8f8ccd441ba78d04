// Custody account - In-memory escrow holding donated funds per campaign

use crate::campaign::{Amount, CampaignId};
use crate::transfer::channel::{TransferChannel, TransferDirection, TransferRequest};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct CustodyBook {
    held: HashMap<CampaignId, Amount>,
    sequence: u64,
}

/// Escrow-style channel that tracks what it holds for each campaign and
/// refuses to release more than it holds.
#[derive(Debug, Default)]
pub struct CustodyAccount {
    book: Mutex<CustodyBook>,
}

impl CustodyAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Funds currently held for a campaign
    pub async fn held_for(&self, campaign_id: CampaignId) -> Amount {
        self.book
            .lock()
            .await
            .held
            .get(&campaign_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Funds held across all campaigns
    pub async fn total_held(&self) -> Amount {
        self.book.lock().await.held.values().sum()
    }

    fn transfer_id(request: &TransferRequest, sequence: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"custody:");
        hasher.update(request.direction().to_string().as_bytes());
        hasher.update(request.campaign_id().to_be_bytes());
        hasher.update(request.party().as_bytes());
        hasher.update(request.amount().minor_units().to_bytes_be());
        hasher.update(sequence.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl TransferChannel for CustodyAccount {
    async fn transfer(&self, request: &TransferRequest) -> Result<String, String> {
        let mut book = self.book.lock().await;
        let held = book
            .held
            .get(&request.campaign_id())
            .cloned()
            .unwrap_or_default();

        let updated = match request.direction() {
            TransferDirection::Collect => &held + request.amount(),
            TransferDirection::Release => held.checked_sub(request.amount()).ok_or_else(|| {
                format!(
                    "custody holds {} for campaign {}, cannot release {}",
                    held,
                    request.campaign_id(),
                    request.amount()
                )
            })?,
        };

        book.held.insert(request.campaign_id(), updated);
        book.sequence += 1;
        Ok(Self::transfer_id(request, book.sequence))
    }
}
