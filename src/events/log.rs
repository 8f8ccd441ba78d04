// Event log - Sequenced, retained and broadcast ledger notifications
//
// Subscribers either:
// - Poll: remember the last sequence seen and call events_since()
// - Subscribe: receive records live over a broadcast channel

use crate::events::event::{EventRecord, LedgerEvent};
use tokio::sync::{broadcast, RwLock};
use tracing::trace;

pub struct EventLog {
    /// Every record ever published, kept for the lifetime of the log so
    /// `events_since` can always replay from any sequence. Not bounded by
    /// the broadcast capacity.
    records: RwLock<Vec<EventRecord>>,
    /// Live fan-out; only this buffer is bounded by `capacity`
    sender: broadcast::Sender<EventRecord>,
}

impl EventLog {
    /// Create a log whose live channel buffers up to `capacity` records per
    /// lagging subscriber. Polling history is retained in full regardless.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            records: RwLock::new(Vec::new()),
            sender,
        }
    }

    /// Append an event and fan it out. Sequence numbers start at 1.
    pub async fn publish(&self, event: LedgerEvent) -> EventRecord {
        let mut records = self.records.write().await;
        let record = EventRecord {
            sequence: records.len() as u64 + 1,
            event,
        };
        records.push(record.clone());

        // Sent while the write lock is held so live order matches sequence order
        if self.sender.send(record.clone()).is_err() {
            trace!(sequence = record.sequence, "no live subscribers");
        }
        record
    }

    /// Live stream of records published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// All records with a sequence greater than `after` (0 returns everything)
    pub async fn events_since(&self, after: u64) -> Vec<EventRecord> {
        let records = self.records.read().await;
        let start = (after as usize).min(records.len());
        records[start..].to_vec()
    }

    /// Sequence of the most recent record, 0 when empty
    pub async fn latest_sequence(&self) -> u64 {
        self.records.read().await.len() as u64
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
