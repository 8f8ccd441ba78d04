// Campaign Ledger - The authoritative record of every campaign
//
// Serialization model:
// - Registry: one RwLock over the id -> slot table; creation appends under it
// - Per campaign: a write gate (one mutation in flight, held across the
//   transfer await) and a RwLock over committed state, write-locked only
//   while new totals are applied
// Readers never wait on a transfer and never see half-applied totals.

use crate::campaign::{Amount, Campaign, CampaignId, CampaignSnapshot, Expense};
use crate::clock::Clock;
use crate::events::{EventLog, LedgerEvent};
use crate::identity::Address;
use crate::ledger::config::LedgerConfig;
use crate::ledger::receipt::Receipt;
use crate::transfer::{TransferChannel, TransferDirection, TransferRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

const DEFAULT_WITHDRAWAL_DESCRIPTION: &str = "Funds withdrawn";

/// Errors returned by ledger operations. Every failed write leaves the
/// ledger exactly as it was.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Campaign {0} not found")]
    NotFound(CampaignId),

    #[error("Only the creator can perform this action")]
    Unauthorized,

    #[error("Campaign has not ended: ends at {end_time}, now {now}")]
    CampaignNotEnded { end_time: u64, now: u64 },

    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Aggregate figures across all campaigns
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub campaign_count: u64,
    pub total_raised: Amount,
    pub total_spent: Amount,
    pub expense_count: usize,
}

struct CampaignSlot {
    gate: Mutex<()>,
    campaign: RwLock<Campaign>,
}

impl CampaignSlot {
    fn new(campaign: Campaign) -> Self {
        Self {
            gate: Mutex::new(()),
            campaign: RwLock::new(campaign),
        }
    }
}

/// The shared campaign ledger.
///
/// Caller identity is an explicit argument on every write; the ledger keeps
/// no session state. Share it across tasks with `Arc`.
pub struct CampaignLedger {
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    channel: Arc<dyn TransferChannel>,
    /// Index is the campaign id
    campaigns: RwLock<Vec<Arc<CampaignSlot>>>,
    events: EventLog,
}

impl CampaignLedger {
    pub fn new(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        channel: Arc<dyn TransferChannel>,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let events = EventLog::new(config.event_capacity);
        Ok(Self {
            config,
            clock,
            channel,
            campaigns: RwLock::new(Vec::new()),
            events,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Notifications emitted by this ledger
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Current ledger time
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Open a new campaign owned by `caller`
    pub async fn create_campaign(
        &self,
        caller: &Address,
        title: &str,
        description: &str,
        goal: Amount,
        duration_secs: u64,
        is_private: bool,
    ) -> Result<CampaignId, LedgerError> {
        self.check_text("title", title, self.config.max_title_len, true)?;
        self.check_text("description", description, self.config.max_description_len, true)?;
        if goal.is_zero() {
            return Err(LedgerError::InvalidArgument("goal amount must be > 0".into()));
        }
        if duration_secs == 0 {
            return Err(LedgerError::InvalidArgument("duration must be > 0".into()));
        }

        let start_time = self.clock.now();
        let end_time = start_time
            .checked_add(duration_secs)
            .ok_or_else(|| LedgerError::InvalidArgument("duration is too large".into()))?;

        let mut campaigns = self.campaigns.write().await;
        let campaign_id = campaigns.len() as CampaignId;
        campaigns.push(Arc::new(CampaignSlot::new(Campaign::new(
            campaign_id,
            *caller,
            title.to_string(),
            description.to_string(),
            goal.clone(),
            start_time,
            end_time,
            is_private,
        ))));

        // Published under the registry lock so creation events follow id order
        self.events
            .publish(LedgerEvent::CampaignCreated {
                campaign_id,
                creator: *caller,
                title: title.to_string(),
                goal_amount: goal.clone(),
                start_time,
                end_time,
            })
            .await;
        drop(campaigns);

        info!(campaign_id, creator = %caller, %goal, start_time, end_time, is_private, "campaign created");
        Ok(campaign_id)
    }

    /// Donate `amount` from `caller`. Accepted whether or not the campaign
    /// has ended. The raised total only moves once the channel confirms the
    /// collection.
    pub async fn donate(
        &self,
        caller: &Address,
        campaign_id: CampaignId,
        amount: Amount,
    ) -> Result<Receipt, LedgerError> {
        let slot = self.slot(campaign_id).await?;
        if amount.is_zero() {
            return Err(LedgerError::InvalidArgument("donation amount must be > 0".into()));
        }

        let _gate = slot.gate.lock().await;
        let raised = slot.campaign.read().await.raised_after(&amount);

        let request = TransferRequest::collect(campaign_id, *caller, amount.clone());
        let transfer_id = self.run_transfer(&request).await?;

        let now = self.clock.now();
        slot.campaign.write().await.set_raised(raised.clone());

        self.events
            .publish(LedgerEvent::DonationReceived {
                campaign_id,
                donor: *caller,
                amount: amount.clone(),
            })
            .await;

        info!(campaign_id, donor = %caller, %amount, %raised, "donation received");
        Ok(Receipt::new(
            campaign_id,
            *caller,
            amount,
            TransferDirection::Collect,
            transfer_id,
            now,
        ))
    }

    /// Withdraw `amount` to the creator after the deadline, recording it as
    /// an expense. An empty description is recorded as "Funds withdrawn".
    pub async fn withdraw_funds(
        &self,
        caller: &Address,
        campaign_id: CampaignId,
        amount: Amount,
        description: &str,
    ) -> Result<Receipt, LedgerError> {
        let slot = self.slot(campaign_id).await?;
        let _gate = slot.gate.lock().await;

        let (creator, spent, now) = {
            let campaign = slot.campaign.read().await;
            self.check_creator(&campaign, caller)?;
            if amount.is_zero() {
                return Err(LedgerError::InvalidArgument("withdrawal amount must be > 0".into()));
            }
            self.check_text("description", description, self.config.max_description_len, false)?;

            let now = self.clock.now();
            if !campaign.is_ended_at(now) {
                return Err(LedgerError::CampaignNotEnded {
                    end_time: campaign.end_time(),
                    now,
                });
            }

            let spent = campaign
                .spent_after(&amount)
                .ok_or_else(|| LedgerError::InsufficientFunds {
                    available: campaign.available(),
                    required: amount.clone(),
                })?;
            (*campaign.creator(), spent, now)
        };

        let request = TransferRequest::release(campaign_id, creator, amount.clone());
        let transfer_id = self.run_transfer(&request).await?;

        let description = if description.trim().is_empty() {
            DEFAULT_WITHDRAWAL_DESCRIPTION
        } else {
            description
        };
        slot.campaign
            .write()
            .await
            .apply_withdrawal(spent.clone(), Expense::new(amount.clone(), description, now));

        self.events
            .publish(LedgerEvent::FundsSpent {
                campaign_id,
                recipient: creator,
                amount: amount.clone(),
            })
            .await;

        info!(campaign_id, %amount, %spent, "funds withdrawn");
        Ok(Receipt::new(
            campaign_id,
            creator,
            amount,
            TransferDirection::Release,
            transfer_id,
            now,
        ))
    }

    /// Append an audit-trail expense without moving funds. Creator only, but
    /// allowed while the campaign is still active.
    pub async fn record_expense(
        &self,
        caller: &Address,
        campaign_id: CampaignId,
        amount: Amount,
        description: &str,
    ) -> Result<Expense, LedgerError> {
        let slot = self.slot(campaign_id).await?;
        let _gate = slot.gate.lock().await;

        let mut campaign = slot.campaign.write().await;
        self.check_creator(&campaign, caller)?;
        if amount.is_zero() {
            return Err(LedgerError::InvalidArgument("expense amount must be > 0".into()));
        }
        self.check_text("description", description, self.config.max_description_len, false)?;

        let expense = Expense::new(amount.clone(), description, self.clock.now());
        campaign.push_expense(expense.clone());
        drop(campaign);

        self.events
            .publish(LedgerEvent::ExpenseAdded {
                campaign_id,
                amount: amount.clone(),
                description: expense.description().to_string(),
                timestamp: expense.timestamp(),
            })
            .await;

        info!(campaign_id, %amount, "expense recorded");
        Ok(expense)
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub async fn get_campaign(&self, campaign_id: CampaignId) -> Result<CampaignSnapshot, LedgerError> {
        let slot = self.slot(campaign_id).await?;
        let snapshot = slot.campaign.read().await.snapshot(self.clock.now());
        debug!(campaign_id, is_ended = snapshot.is_ended, "campaign read");
        Ok(snapshot)
    }

    /// Every campaign, private ones included, by ascending id
    pub async fn list_campaigns(&self) -> Vec<CampaignSnapshot> {
        self.collect_snapshots(|_| true).await
    }

    /// Public campaigns plus private campaigns created by `viewer`
    pub async fn list_visible_campaigns(&self, viewer: Option<&Address>) -> Vec<CampaignSnapshot> {
        self.collect_snapshots(|c| c.is_visible_to(viewer)).await
    }

    /// Campaigns created by `creator`, by ascending id
    pub async fn campaigns_by_creator(&self, creator: &Address) -> Vec<CampaignSnapshot> {
        self.collect_snapshots(|c| c.creator() == creator).await
    }

    pub async fn campaign_count(&self) -> u64 {
        self.campaigns.read().await.len() as u64
    }

    /// Expenses of a campaign in the order they were recorded
    pub async fn list_expenses(&self, campaign_id: CampaignId) -> Result<Vec<Expense>, LedgerError> {
        let slot = self.slot(campaign_id).await?;
        let expenses = slot.campaign.read().await.expenses().to_vec();
        Ok(expenses)
    }

    pub async fn stats(&self) -> LedgerStats {
        let slots = self.campaigns.read().await.clone();
        let campaign_count = slots.len() as u64;
        let mut raised = Vec::with_capacity(slots.len());
        let mut spent = Vec::with_capacity(slots.len());
        let mut expense_count = 0;

        for slot in slots {
            let campaign = slot.campaign.read().await;
            raised.push(campaign.raised().clone());
            spent.push(campaign.spent().clone());
            expense_count += campaign.expenses().len();
        }

        LedgerStats {
            campaign_count,
            total_raised: raised.into_iter().sum(),
            total_spent: spent.into_iter().sum(),
            expense_count,
        }
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    async fn slot(&self, campaign_id: CampaignId) -> Result<Arc<CampaignSlot>, LedgerError> {
        let campaigns = self.campaigns.read().await;
        usize::try_from(campaign_id)
            .ok()
            .and_then(|index| campaigns.get(index))
            .cloned()
            .ok_or(LedgerError::NotFound(campaign_id))
    }

    async fn collect_snapshots<F>(&self, filter: F) -> Vec<CampaignSnapshot>
    where
        F: Fn(&Campaign) -> bool,
    {
        // Clone the slot handles so the registry lock is not held while
        // waiting on individual campaigns
        let slots = self.campaigns.read().await.clone();
        let now = self.clock.now();

        let mut snapshots = Vec::with_capacity(slots.len());
        for slot in slots {
            let campaign = slot.campaign.read().await;
            if filter(&campaign) {
                snapshots.push(campaign.snapshot(now));
            }
        }
        debug!(count = snapshots.len(), "campaigns listed");
        snapshots
    }

    fn check_creator(&self, campaign: &Campaign, caller: &Address) -> Result<(), LedgerError> {
        if campaign.creator() != caller {
            warn!(campaign_id = campaign.id(), caller = %caller, "creator-only action rejected");
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    fn check_text(&self, field: &str, value: &str, max_len: usize, required: bool) -> Result<(), LedgerError> {
        if required && value.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(format!("{} cannot be empty", field)));
        }
        if value.len() > max_len {
            return Err(LedgerError::InvalidArgument(format!(
                "{} is {} bytes, limit is {}",
                field,
                value.len(),
                max_len
            )));
        }
        Ok(())
    }

    /// Await the channel once; errors and timeouts become `TransferFailed`
    async fn run_transfer(&self, request: &TransferRequest) -> Result<String, LedgerError> {
        let timeout = self.config.transfer_timeout();
        match tokio::time::timeout(timeout, self.channel.transfer(request)).await {
            Ok(Ok(transfer_id)) => Ok(transfer_id),
            Ok(Err(reason)) => {
                warn!(
                    campaign_id = request.campaign_id(),
                    direction = %request.direction(),
                    amount = %request.amount(),
                    %reason,
                    "transfer rejected"
                );
                Err(LedgerError::TransferFailed(reason))
            }
            Err(_) => {
                warn!(
                    campaign_id = request.campaign_id(),
                    direction = %request.direction(),
                    timeout_ms = self.config.transfer_timeout_ms,
                    "transfer timed out"
                );
                Err(LedgerError::TransferFailed(format!(
                    "timed out after {}ms",
                    self.config.transfer_timeout_ms
                )))
            }
        }
    }
}
