//! Session manager tests
//!
//! Exercises the lazy re-authentication policy against scripted
//! transports: one retry per failure, never more.

mod common;

use common::*;
use kotel2influx::client::typing::{default_overrides, RegisterValue};
use kotel2influx::client::{KotelClient, PageId};
use kotel2influx::mock::{MockSession, MockTransport};
use std::sync::Arc;

fn client_with(sessions: Vec<MockSession>) -> (KotelClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new(sessions));
    let client = KotelClient::new(Box::new(transport.clone()), default_overrides());
    (client, transport)
}

#[tokio::test]
async fn test_load_pages_builds_full_snapshot() {
    let (mut client, transport) = client_with(vec![fixture_session()]);

    let snapshot = client.load_pages(&PageId::ALL).await.unwrap();

    assert_eq!(snapshot.len(), 6);
    assert_eq!(transport.login_count(), 1);
    assert_eq!(
        snapshot[&PageId::Heating].get("__R23596_REAL_.1f"),
        Some(&RegisterValue::Float(21.5))
    );
    assert_eq!(
        snapshot[&PageId::Statuses].get("__R24261.0_BOOL_i"),
        Some(&RegisterValue::Integer(1))
    );
    // The production override types the running-time counter as float.
    assert_eq!(
        snapshot[&PageId::Compressor].get("__R23658_UDINT_u"),
        Some(&RegisterValue::Float(123456.0))
    );
}

#[tokio::test]
async fn test_session_is_reused_across_polls() {
    let session = fixture_session();
    let (mut client, transport) = client_with(vec![session.clone()]);

    client.load_pages(&PageId::ALL).await.unwrap();
    client.load_pages(&PageId::ALL).await.unwrap();

    assert_eq!(transport.login_count(), 1);
    assert_eq!(session.fetch_count(), 12);
}

#[tokio::test]
async fn test_broken_session_retries_exactly_once() {
    let first = fixture_session();

    // The second session serves a different desired temperature so the
    // result provably comes from the retry.
    let mut pages = fixture_pages();
    pages.insert(
        PageId::Heating,
        page_xml(&[
            ("__R2373.1_BOOL_i", "0"),
            ("__R2376_REAL_.1f", "35.0"),
            ("__R2369_USINT_d", "7"),
            ("__R2502_REAL_.1f", "2.5"),
            ("__R2516_REAL_.1f", "-1.5"),
            ("__R2362.1_BOOL_i", "1"),
            ("__R190_USINT_u", "0"),
            ("__R196_USINT_u", "0"),
            ("__R23596_REAL_.1f", "22.0"),
        ]),
    );
    let second = MockSession::new(pages);

    let (mut client, transport) = client_with(vec![first.clone(), second]);

    client.load_pages(&PageId::ALL).await.unwrap();
    assert_eq!(transport.login_count(), 1);

    first.break_session();
    let snapshot = client.load_pages(&PageId::ALL).await.unwrap();

    // One re-authentication, and the snapshot is the second attempt's.
    assert_eq!(transport.login_count(), 2);
    assert_eq!(
        snapshot[&PageId::Heating].get("__R23596_REAL_.1f"),
        Some(&RegisterValue::Float(22.0))
    );
}

#[tokio::test]
async fn test_second_failure_propagates_without_third_attempt() {
    let first = fixture_session();
    let second = fixture_session();
    second.break_session();

    let (mut client, transport) = client_with(vec![first.clone(), second.clone()]);

    client.load_pages(&PageId::ALL).await.unwrap();
    first.break_session();

    let err = client.load_pages(&PageId::ALL).await.unwrap_err();
    assert!(matches!(err, kotel2influx::KotelError::Connection(_)));

    // Exactly one re-authentication, and the retry stopped at its first
    // failed fetch.
    assert_eq!(transport.login_count(), 2);
    assert_eq!(second.fetch_count(), 1);
}

#[tokio::test]
async fn test_fresh_start_failure_is_not_retried() {
    let broken = fixture_session();
    broken.break_session();

    let (mut client, transport) = client_with(vec![broken]);

    // No session exists yet, so the failure happens on the authenticated
    // path already and there is nothing to fall back to.
    let err = client.load_pages(&PageId::ALL).await.unwrap_err();
    assert!(matches!(err, kotel2influx::KotelError::Connection(_)));
    assert_eq!(transport.login_count(), 1);
}

#[tokio::test]
async fn test_failed_retry_leaves_handle_for_next_cycle() {
    let first = fixture_session();
    let second = fixture_session();
    second.break_session();

    let (mut client, transport) = client_with(vec![first.clone(), second.clone()]);

    client.load_pages(&PageId::ALL).await.unwrap();
    first.break_session();
    client.load_pages(&PageId::ALL).await.unwrap_err();

    let fetches_after_failure = second.fetch_count();

    // The next cycle starts from the stored (still broken) handle and
    // only then asks for a new session; the script has none left.
    let err = client.load_pages(&PageId::ALL).await.unwrap_err();
    assert!(matches!(err, kotel2influx::KotelError::Authentication(_)));
    assert_eq!(second.fetch_count(), fetches_after_failure + 1);
    assert_eq!(transport.login_count(), 3);
}

#[tokio::test]
async fn test_parse_failure_is_treated_like_a_dropped_session() {
    // A backend that answers with its login page instead of the requested
    // content produces a parse error; the session manager does not
    // distinguish it from a transport failure and re-authenticates.
    let first = fixture_session();
    let second = fixture_session();

    let (mut client, transport) = client_with(vec![first.clone(), second]);

    client.load_pages(&PageId::ALL).await.unwrap();
    first.serve_malformed();

    let snapshot = client.load_pages(&PageId::ALL).await.unwrap();
    assert_eq!(snapshot.len(), 6);
    assert_eq!(transport.login_count(), 2);
}
