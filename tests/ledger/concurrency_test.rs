// Concurrency Tests
// Per-campaign serialization of writes, lost-update freedom and non-blocking reads

use fundledger::campaign::Amount;
use fundledger::clock::ManualClock;
use fundledger::identity::Address;
use fundledger::ledger::{CampaignLedger, LedgerConfig, LedgerError};
use fundledger::transfer::{MockTransferChannel, TransferChannel};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const ONE_DAY: u64 = 60 * 60 * 24;
const START: u64 = 1_700_000_000;

fn setup_with(channel: Arc<dyn TransferChannel>) -> (Arc<CampaignLedger>, ManualClock) {
    let clock = ManualClock::new(START);
    let ledger = CampaignLedger::new(LedgerConfig::default(), Arc::new(clock.clone()), channel).unwrap();
    (Arc::new(ledger), clock)
}

async fn create(ledger: &CampaignLedger, owner: &Address) -> u64 {
    ledger
        .create_campaign(owner, "Concurrent", "Description", Amount::new(1_000), ONE_DAY, false)
        .await
        .unwrap()
}

// ============================================================================
// DONATIONS
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_concurrent_donations_both_counted() {
    let (ledger, _clock) = setup_with(Arc::new(MockTransferChannel::new().with_delay_ms(20)));
    let owner = Address::generate();
    let id = create(&ledger, &owner).await;
    ledger.donate(&Address::generate(), id, Amount::new(1)).await.unwrap();

    let x = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.donate(&Address::generate(), id, Amount::new(30)).await })
    };
    let y = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.donate(&Address::generate(), id, Amount::new(12)).await })
    };

    x.await.unwrap().unwrap();
    y.await.unwrap().unwrap();

    assert_eq!(ledger.get_campaign(id).await.unwrap().raised_amount, Amount::new(43));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_donations_sum_exactly() {
    let (ledger, _clock) = setup_with(Arc::new(MockTransferChannel::new()));
    let owner = Address::generate();
    let id = create(&ledger, &owner).await;

    let mut handles = Vec::new();
    for i in 1..=100u128 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.donate(&Address::generate(), id, Amount::new(i)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ledger.get_campaign(id).await.unwrap().raised_amount, Amount::new(5050));
    // One creation event plus one per donation
    assert_eq!(ledger.events().len().await, 101);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids() {
    let (ledger, _clock) = setup_with(Arc::new(MockTransferChannel::new()));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move { create(&ledger, &Address::generate()).await }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();

    assert_eq!(ids, (0..20).collect::<Vec<u64>>());
}

// ============================================================================
// WITHDRAWALS
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let (ledger, clock) = setup_with(Arc::new(MockTransferChannel::new().with_delay_ms(5)));
    let owner = Address::generate();
    let id = create(&ledger, &owner).await;
    ledger.donate(&Address::generate(), id, Amount::new(100)).await.unwrap();
    clock.advance(ONE_DAY + 1);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.withdraw_funds(&owner, id, Amount::new(30), "").await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InsufficientFunds { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let campaign = ledger.get_campaign(id).await.unwrap();
    assert_eq!(succeeded, 3);
    assert_eq!(campaign.spent_amount, Amount::new(90));
    assert_eq!(campaign.expense_count, 3);
}

// ============================================================================
// READS DURING WRITES
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_read_during_transfer_sees_committed_state() {
    let (ledger, _clock) = setup_with(Arc::new(MockTransferChannel::new().with_delay_ms(300)));
    let owner = Address::generate();
    let id = create(&ledger, &owner).await;

    let pending = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.donate(&Address::generate(), id, Amount::new(9)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    let during = ledger.get_campaign(id).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(during.raised_amount, Amount::ZERO);

    pending.await.unwrap().unwrap();
    assert_eq!(ledger.get_campaign(id).await.unwrap().raised_amount, Amount::new(9));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_campaigns_proceed_in_parallel() {
    let (ledger, _clock) = setup_with(Arc::new(MockTransferChannel::new().with_delay_ms(300)));
    let owner = Address::generate();
    let a = create(&ledger, &owner).await;
    let b = create(&ledger, &owner).await;

    let started = Instant::now();
    let first = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.donate(&Address::generate(), a, Amount::new(1)).await })
    };
    let second = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.donate(&Address::generate(), b, Amount::new(1)).await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_millis(550));
}
