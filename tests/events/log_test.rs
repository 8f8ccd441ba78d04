// Event Log Tests
// Polling, live subscription and encoding of ledger notifications

use fundledger::campaign::Amount;
use fundledger::events::{EventCodec, EventCodecError, EventLog, EventRecord, LedgerEvent};
use fundledger::identity::Address;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn created(campaign_id: u64) -> LedgerEvent {
    LedgerEvent::CampaignCreated {
        campaign_id,
        creator: Address::generate(),
        title: "Well".to_string(),
        goal_amount: Amount::new(1_000),
        start_time: 10,
        end_time: 20,
    }
}

// ============================================================================
// POLLING
// ============================================================================

#[tokio::test]
async fn test_new_log_is_empty() {
    let log = EventLog::new(16);

    assert!(log.is_empty().await);
    assert_eq!(log.latest_sequence().await, 0);
    assert!(log.events_since(0).await.is_empty());
}

#[tokio::test]
async fn test_events_since_returns_only_newer() {
    let log = EventLog::new(16);
    for id in 0..5 {
        log.publish(created(id)).await;
    }

    let newer = log.events_since(3).await;
    assert_eq!(newer.len(), 2);
    assert_eq!(newer[0].sequence, 4);
    assert_eq!(newer[1].sequence, 5);
}

#[tokio::test]
async fn test_events_since_past_end_is_empty() {
    let log = EventLog::new(16);
    log.publish(created(0)).await;

    assert!(log.events_since(10).await.is_empty());
}

#[tokio::test]
async fn test_poller_can_resume_from_last_seen() {
    let log = EventLog::new(16);
    log.publish(created(0)).await;
    log.publish(created(1)).await;

    let first_batch = log.events_since(0).await;
    let last_seen = first_batch.last().unwrap().sequence;

    log.publish(created(2)).await;
    let second_batch = log.events_since(last_seen).await;

    assert_eq!(second_batch.len(), 1);
    assert_eq!(second_batch[0].event.campaign_id(), 2);
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

#[tokio::test]
async fn test_subscriber_receives_in_order() {
    let log = EventLog::new(16);
    let mut rx = log.subscribe();

    log.publish(created(0)).await;
    log.publish(created(1)).await;

    assert_eq!(rx.recv().await.unwrap().sequence, 1);
    assert_eq!(rx.recv().await.unwrap().sequence, 2);
}

#[tokio::test]
async fn test_publish_without_subscribers_still_retained() {
    let log = EventLog::new(1);
    log.publish(created(0)).await;
    log.publish(created(1)).await;

    assert_eq!(log.len().await, 2);
}

// ============================================================================
// EVENT ACCESSORS AND CODEC
// ============================================================================

#[test]
fn test_event_names() {
    let donor = Address::generate();
    assert_eq!(created(0).name(), "CampaignCreated");
    assert_eq!(
        LedgerEvent::DonationReceived {
            campaign_id: 0,
            donor,
            amount: Amount::new(1)
        }
        .name(),
        "DonationReceived"
    );
    assert_eq!(
        LedgerEvent::FundsSpent {
            campaign_id: 0,
            recipient: donor,
            amount: Amount::new(1)
        }
        .name(),
        "FundsSpent"
    );
    assert_eq!(
        LedgerEvent::ExpenseAdded {
            campaign_id: 4,
            amount: Amount::new(1),
            description: "x".to_string(),
            timestamp: 0
        }
        .campaign_id(),
        4
    );
}

#[test]
fn test_codec_hex_preserves_record() {
    let record = EventRecord {
        sequence: 9,
        event: LedgerEvent::ExpenseAdded {
            campaign_id: 2,
            amount: Amount::new(200_000_000_000_000_000),
            description: "Campaign expense for materials".to_string(),
            timestamp: 1_700_000_000,
        },
    };

    let encoded = EventCodec::encode_hex(&record).unwrap();
    assert_eq!(EventCodec::decode_hex(&encoded).unwrap(), record);
}

#[test]
fn test_codec_keeps_amounts_beyond_u128() {
    let huge: Amount = "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        .parse()
        .unwrap();
    let record = EventRecord {
        sequence: 1,
        event: LedgerEvent::DonationReceived {
            campaign_id: 0,
            donor: Address::generate(),
            amount: &huge + &huge,
        },
    };

    let decoded = EventCodec::decode(&EventCodec::encode(&record).unwrap()).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_codec_rejects_bad_input() {
    assert!(matches!(EventCodec::decode_hex("not-hex"), Err(EventCodecError::InvalidHex(_))));
    assert!(matches!(EventCodec::decode(&[0xff, 0xff]), Err(EventCodecError::DecodeError(_))));
}
