// Transfer Channel Tests
// Behaviour of the scriptable mock channel and transfer requests

use fundledger::campaign::Amount;
use fundledger::identity::Address;
use fundledger::transfer::{MockTransferChannel, TransferChannel, TransferDirection, TransferRequest};
use std::time::{Duration, Instant};

// ============================================================================
// TRANSFER REQUEST
// ============================================================================

#[test]
fn test_collect_request() {
    let donor = Address::generate();
    let request = TransferRequest::collect(7, donor, Amount::new(50));

    assert_eq!(request.campaign_id(), 7);
    assert_eq!(request.party(), &donor);
    assert_eq!(request.amount(), &Amount::new(50));
    assert_eq!(request.direction(), TransferDirection::Collect);
}

#[test]
fn test_release_request() {
    let creator = Address::generate();
    let request = TransferRequest::release(1, creator, Amount::new(10));

    assert_eq!(request.direction(), TransferDirection::Release);
    assert_eq!(request.direction().to_string(), "release");
}

// ============================================================================
// MOCK CHANNEL
// ============================================================================

#[tokio::test]
async fn test_mock_succeeds_by_default() {
    let channel = MockTransferChannel::new();
    let request = TransferRequest::collect(0, Address::generate(), Amount::new(1));

    assert!(channel.transfer(&request).await.is_ok());
}

#[tokio::test]
async fn test_mock_failure_message() {
    let channel = MockTransferChannel::new().with_failure("insufficient gas");
    let request = TransferRequest::collect(0, Address::generate(), Amount::new(1));

    assert_eq!(channel.transfer(&request).await, Err("insufficient gas".to_string()));
}

#[tokio::test]
async fn test_mock_recovers_after_outage() {
    let channel = MockTransferChannel::new().with_outage(2);
    let request = TransferRequest::collect(0, Address::generate(), Amount::new(1));

    assert_eq!(channel.transfer(&request).await, Err("channel unavailable".to_string()));
    assert!(channel.transfer(&request).await.is_err());
    assert_eq!(channel.transfer(&request).await, Ok("mock-collect-0-3".to_string()));
    assert_eq!(channel.call_count(), 3);
}

#[tokio::test]
async fn test_mock_rejects_one_direction() {
    let channel = MockTransferChannel::new().with_rejected_direction(TransferDirection::Release, "payout frozen");
    let party = Address::generate();

    let collect = TransferRequest::collect(2, party, Amount::new(10));
    let release = TransferRequest::release(2, party, Amount::new(10));

    assert!(channel.transfer(&collect).await.is_ok());
    assert_eq!(channel.transfer(&release).await, Err("payout frozen".to_string()));
}

#[tokio::test]
async fn test_mock_keeps_requests_in_order() {
    let channel = MockTransferChannel::new().with_failure("down");
    let first = TransferRequest::collect(0, Address::generate(), Amount::new(1));
    let second = TransferRequest::release(1, Address::generate(), Amount::new(2));

    let _ = channel.transfer(&first).await;
    let _ = channel.transfer(&second).await;

    // Rejected attempts are still recorded
    assert_eq!(channel.requests().await, vec![first, second]);
}

#[tokio::test]
async fn test_mock_delay() {
    let channel = MockTransferChannel::new().with_delay_ms(50);
    let request = TransferRequest::collect(0, Address::generate(), Amount::new(1));

    let started = Instant::now();
    channel.transfer(&request).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(50));
}
