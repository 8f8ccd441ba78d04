// Campaign records - the state the ledger owns

use crate::campaign::amount::Amount;
use crate::identity::Address;
use serde::{Deserialize, Serialize};

/// Sequential campaign identifier, starting at 0
pub type CampaignId = u64;

/// Lifecycle phase, derived from the clock on every read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignPhase {
    Active,
    Ended,
}

/// One recorded use of funds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    amount: Amount,
    description: String,
    timestamp: u64,
}

impl Expense {
    pub fn new(amount: Amount, description: impl Into<String>, timestamp: u64) -> Self {
        Self {
            amount,
            description: description.into(),
            timestamp,
        }
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Ledger time (unix seconds) when the expense was recorded
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// A funding campaign as stored by the ledger.
///
/// Only `raised`, `spent` and `expenses` ever change after creation, and only
/// through the crate-private mutators below, which keep `spent <= raised`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    id: CampaignId,
    creator: Address,
    title: String,
    description: String,
    goal: Amount,
    raised: Amount,
    spent: Amount,
    start_time: u64,
    end_time: u64,
    is_private: bool,
    expenses: Vec<Expense>,
}

impl Campaign {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: CampaignId,
        creator: Address,
        title: String,
        description: String,
        goal: Amount,
        start_time: u64,
        end_time: u64,
        is_private: bool,
    ) -> Self {
        Self {
            id,
            creator,
            title,
            description,
            goal,
            raised: Amount::ZERO,
            spent: Amount::ZERO,
            start_time,
            end_time,
            is_private,
            expenses: Vec::new(),
        }
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn goal(&self) -> &Amount {
        &self.goal
    }

    pub fn raised(&self) -> &Amount {
        &self.raised
    }

    pub fn spent(&self) -> &Amount {
        &self.spent
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Raised funds not yet withdrawn
    pub fn available(&self) -> Amount {
        self.raised.saturating_sub(&self.spent)
    }

    pub fn is_ended_at(&self, now: u64) -> bool {
        now >= self.end_time
    }

    pub fn phase_at(&self, now: u64) -> CampaignPhase {
        if self.is_ended_at(now) {
            CampaignPhase::Ended
        } else {
            CampaignPhase::Active
        }
    }

    /// Whether `viewer` may see this campaign in a filtered listing
    pub fn is_visible_to(&self, viewer: Option<&Address>) -> bool {
        !self.is_private || viewer == Some(&self.creator)
    }

    /// Raised total after adding `amount`
    pub(crate) fn raised_after(&self, amount: &Amount) -> Amount {
        &self.raised + amount
    }

    pub(crate) fn set_raised(&mut self, raised: Amount) {
        debug_assert!(raised >= self.raised);
        self.raised = raised;
    }

    /// Spent total after withdrawing `amount`, or `None` if that would
    /// exceed the raised total
    pub(crate) fn spent_after(&self, amount: &Amount) -> Option<Amount> {
        Some(&self.spent + amount).filter(|spent| *spent <= self.raised)
    }

    pub(crate) fn apply_withdrawal(&mut self, spent: Amount, expense: Expense) {
        debug_assert!(spent >= self.spent && spent <= self.raised);
        self.spent = spent;
        self.expenses.push(expense);
    }

    pub(crate) fn push_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    /// Point-in-time copy with derived lifecycle fields filled in
    pub fn snapshot(&self, now: u64) -> CampaignSnapshot {
        CampaignSnapshot {
            id: self.id,
            creator: self.creator,
            title: self.title.clone(),
            description: self.description.clone(),
            goal_amount: self.goal.clone(),
            raised_amount: self.raised.clone(),
            spent_amount: self.spent.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            is_private: self.is_private,
            is_ended: self.is_ended_at(now),
            expense_count: self.expenses.len(),
        }
    }
}

/// Read-only view of a campaign handed to callers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub id: CampaignId,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub goal_amount: Amount,
    pub raised_amount: Amount,
    pub spent_amount: Amount,
    pub start_time: u64,
    pub end_time: u64,
    pub is_private: bool,
    /// `now >= end_time` at the moment the snapshot was taken
    pub is_ended: bool,
    pub expense_count: usize,
}

impl CampaignSnapshot {
    pub fn available(&self) -> Amount {
        self.raised_amount.saturating_sub(&self.spent_amount)
    }

    pub fn phase(&self) -> CampaignPhase {
        if self.is_ended {
            CampaignPhase::Ended
        } else {
            CampaignPhase::Active
        }
    }

    /// Seconds left before the deadline, zero once ended
    pub fn time_remaining(&self, now: u64) -> u64 {
        self.end_time.saturating_sub(now)
    }

    pub fn goal_reached(&self) -> bool {
        self.raised_amount >= self.goal_amount
    }
}
