//! Shift coordination against the loopback mock API: read normalization,
//! open/close transitions, idempotent close, cache invalidation.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use carman_client::{CarmanContext, ClientConfig, CloseOutcome, ShiftCoordinator};
use carman_core::ShiftPeriod;
use carman_store::MemoryStore;
use support::MockApi;

#[tokio::test]
async fn test_no_active_shift_reads_as_none() {
    let mock = MockApi::spawn().await;
    let ctx = mock.context();

    // The backend answers 404 when no shift is open; that's a normal state.
    let shift = ctx.shifts.active_shift("e1").await.unwrap();
    assert!(shift.is_none());
    assert_eq!(mock.state.shift_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_open_then_read_round_trip() {
    let mock = MockApi::spawn().await;
    let ctx = mock.context();

    let opened = ctx.shifts.open_shift("e1", ShiftPeriod::Tarde).await.unwrap();
    assert_eq!(opened.turno, ShiftPeriod::Tarde);
    assert_eq!(opened.establecimiento, "e1");
    assert!(opened.nombre.ends_with("- e1 - TARDE"));

    let read = ctx.shifts.active_shift("e1").await.unwrap().unwrap();
    assert_eq!(read.id, opened.id);
    assert_eq!(read.turno, ShiftPeriod::Tarde);

    // Scoped per establishment
    assert!(ctx.shifts.active_shift("e2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_double_close_is_idempotent() {
    let mock = MockApi::spawn().await;
    mock.seed_shift("e1", "NOCHE");
    let ctx = mock.context();

    let first = ctx.shifts.close_shift("e1").await.unwrap();
    assert!(matches!(first, CloseOutcome::Closed(_)));

    // The backend answers 400 now; the caller still just wanted it closed.
    let second = ctx.shifts.close_shift("e1").await.unwrap();
    assert_eq!(second, CloseOutcome::AlreadyClosed);

    assert!(ctx.shifts.active_shift("e1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_close_without_shift_is_already_closed() {
    let mock = MockApi::spawn().await;
    let ctx = mock.context();
    let outcome = ctx.shifts.close_shift("e1").await.unwrap();
    assert_eq!(outcome, CloseOutcome::AlreadyClosed);
}

#[tokio::test]
async fn test_html_error_page_reads_as_none() {
    let mock = MockApi::spawn().await;
    mock.seed_shift("e1", "TARDE");
    mock.state.shift_endpoint_html.store(true, Ordering::SeqCst);
    let ctx = mock.context();

    // Endpoint not deployed: degraded to "no shift", not a hard failure.
    assert!(ctx.shifts.active_shift("e1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_transport_failure_is_a_real_error() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
    };
    let ctx = CarmanContext::with_store(config, Arc::new(MemoryStore::new())).unwrap();

    let err = ctx.shifts.active_shift("e1").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_cache_serves_fresh_reads_and_mutations_invalidate_globally() {
    let mock = MockApi::spawn().await;
    mock.seed_shift("e1", "TARDE");
    let ctx = mock.context();
    let shifts = ShiftCoordinator::with_staleness(ctx.api.clone(), Duration::from_secs(60));

    // Two reads, one request
    assert!(shifts.active_shift("e1").await.unwrap().is_some());
    assert!(shifts.active_shift("e1").await.unwrap().is_some());
    assert_eq!(mock.state.shift_reads.load(Ordering::SeqCst), 1);

    // A different establishment is its own cache entry
    assert!(shifts.active_shift("e2").await.unwrap().is_none());
    assert_eq!(mock.state.shift_reads.load(Ordering::SeqCst), 2);

    // A mutation on e2 drops e1's cached answer too
    shifts.open_shift("e2", ShiftPeriod::Noche).await.unwrap();
    assert!(shifts.active_shift("e1").await.unwrap().is_some());
    assert!(shifts.active_shift("e2").await.unwrap().is_some());
    assert_eq!(mock.state.shift_reads.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_negative_answers_are_cached_too() {
    let mock = MockApi::spawn().await;
    let ctx = mock.context();
    let shifts = ShiftCoordinator::with_staleness(ctx.api.clone(), Duration::from_secs(60));

    assert!(shifts.active_shift("e1").await.unwrap().is_none());
    assert!(shifts.active_shift("e1").await.unwrap().is_none());
    assert_eq!(mock.state.shift_reads.load(Ordering::SeqCst), 1);

    // Until someone opens a shift
    shifts.open_shift("e1", ShiftPeriod::Manana).await.unwrap();
    let shift = shifts.active_shift("e1").await.unwrap().unwrap();
    assert_eq!(shift.turno, ShiftPeriod::Manana);
}
