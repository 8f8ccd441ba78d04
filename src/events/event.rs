// Ledger notifications and their wire encoding

use crate::campaign::{Amount, CampaignId};
use crate::identity::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Notification emitted after a ledger mutation commits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    CampaignCreated {
        campaign_id: CampaignId,
        creator: Address,
        title: String,
        goal_amount: Amount,
        start_time: u64,
        end_time: u64,
    },
    DonationReceived {
        campaign_id: CampaignId,
        donor: Address,
        amount: Amount,
    },
    FundsSpent {
        campaign_id: CampaignId,
        recipient: Address,
        amount: Amount,
    },
    ExpenseAdded {
        campaign_id: CampaignId,
        amount: Amount,
        description: String,
        timestamp: u64,
    },
}

impl LedgerEvent {
    /// Campaign this event belongs to
    pub fn campaign_id(&self) -> CampaignId {
        match self {
            Self::CampaignCreated { campaign_id, .. }
            | Self::DonationReceived { campaign_id, .. }
            | Self::FundsSpent { campaign_id, .. }
            | Self::ExpenseAdded { campaign_id, .. } => *campaign_id,
        }
    }

    /// Event name as observed by subscribers
    pub fn name(&self) -> &'static str {
        match self {
            Self::CampaignCreated { .. } => "CampaignCreated",
            Self::DonationReceived { .. } => "DonationReceived",
            Self::FundsSpent { .. } => "FundsSpent",
            Self::ExpenseAdded { .. } => "ExpenseAdded",
        }
    }
}

/// An event with its position in the ledger's event stream (starting at 1)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: LedgerEvent,
}

#[derive(Error, Debug)]
pub enum EventCodecError {
    #[error("Failed to encode event: {0}")]
    EncodeError(String),

    #[error("Failed to decode event: {0}")]
    DecodeError(String),

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
}

/// Compact binary encoding of event records for external transports
pub struct EventCodec;

impl EventCodec {
    pub fn encode(record: &EventRecord) -> Result<Vec<u8>, EventCodecError> {
        postcard::to_allocvec(record).map_err(|e| EventCodecError::EncodeError(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<EventRecord, EventCodecError> {
        postcard::from_bytes(bytes).map_err(|e| EventCodecError::DecodeError(e.to_string()))
    }

    pub fn encode_hex(record: &EventRecord) -> Result<String, EventCodecError> {
        Self::encode(record).map(hex::encode)
    }

    pub fn decode_hex(hex_str: &str) -> Result<EventRecord, EventCodecError> {
        let bytes = hex::decode(hex_str).map_err(|e| EventCodecError::InvalidHex(e.to_string()))?;
        Self::decode(&bytes)
    }
}
