// Transfer module - The value-transfer channel seam
// The ledger authorizes movements; implementations of TransferChannel carry them out

mod channel;
mod custody;

pub use channel::{MockTransferChannel, TransferChannel, TransferDirection, TransferRequest};
pub use custody::CustodyAccount;
