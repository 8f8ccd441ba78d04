// Events module - Notifications for external observers
// Emitted only after a mutation commits; not needed for ledger correctness

mod event;
mod log;

pub use event::{EventCodec, EventCodecError, EventRecord, LedgerEvent};
pub use log::EventLog;
