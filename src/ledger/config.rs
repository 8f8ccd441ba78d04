// Ledger configuration

use crate::ledger::book::LedgerError;
use std::time::Duration;

/// Configuration for the campaign ledger
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// How long to wait for the transfer channel before failing the operation
    pub transfer_timeout_ms: u64,
    /// Records buffered per live event subscriber before it lags
    pub event_capacity: usize,
    /// Maximum campaign title length in bytes
    pub max_title_len: usize,
    /// Maximum campaign or expense description length in bytes
    pub max_description_len: usize,
}

impl LedgerConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transfer_timeout_ms(mut self, ms: u64) -> Self {
        self.transfer_timeout_ms = ms;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_max_title_len(mut self, len: usize) -> Self {
        self.max_title_len = len;
        self
    }

    pub fn with_max_description_len(mut self, len: usize) -> Self {
        self.max_description_len = len;
        self
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.transfer_timeout_ms == 0 {
            return Err(LedgerError::InvalidConfig(
                "transfer_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(LedgerError::InvalidConfig(
                "event_capacity must be > 0".to_string(),
            ));
        }
        if self.max_title_len == 0 || self.max_description_len == 0 {
            return Err(LedgerError::InvalidConfig(
                "text length limits must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transfer_timeout_ms: 30_000,
            event_capacity: 1024,
            max_title_len: 200,
            max_description_len: 5_000,
        }
    }
}
