// Receipts for value-moving ledger operations

use crate::campaign::{Amount, CampaignId};
use crate::identity::Address;
use crate::transfer::TransferDirection;
use serde::{Deserialize, Serialize};

/// Proof that a donation or withdrawal was both transferred and recorded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    campaign_id: CampaignId,
    party: Address,
    amount: Amount,
    direction: TransferDirection,
    transfer_id: String,
    timestamp: u64,
}

impl Receipt {
    pub(crate) fn new(
        campaign_id: CampaignId,
        party: Address,
        amount: Amount,
        direction: TransferDirection,
        transfer_id: String,
        timestamp: u64,
    ) -> Self {
        Self {
            campaign_id,
            party,
            amount,
            direction,
            transfer_id,
            timestamp,
        }
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    /// Donor for a donation, creator for a withdrawal
    pub fn party(&self) -> &Address {
        &self.party
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// ID returned by the transfer channel
    pub fn transfer_id(&self) -> &str {
        &self.transfer_id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
