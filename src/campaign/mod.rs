// Campaign module - What the ledger tracks (money, campaigns, expenses)

mod amount;
mod model;

pub use amount::{Amount, AmountError};
pub use model::{Campaign, CampaignId, CampaignPhase, CampaignSnapshot, Expense};
