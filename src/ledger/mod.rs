// Ledger module - THE CAMPAIGN LEDGER
// Creates campaigns, accumulates donations, gates withdrawals on creator and
// deadline, and keeps the expense trail

mod book;
mod config;
mod receipt;

pub use book::{CampaignLedger, LedgerError, LedgerStats};
pub use config::LedgerConfig;
pub use receipt::Receipt;
