// Copyright (c) 2024 Botho Foundation
//
//! Ticket-gated journal queries.

mod common;

use common::*;
use nrc::contract::{ContractError, Notification};

fn queried_timestamps(receipt: &nrc::contract::Receipt) -> Vec<u64> {
    receipt
        .notifications
        .iter()
        .map(|n| match n {
            Notification::GeoRecord(record) => record.timestamp,
            other => panic!("unexpected notification {other:?}"),
        })
        .collect()
}

fn post(ledger: &mut TestLedger<nrc::store::MemoryStore>, height: u64, who: nrc::address::Address, ts: i64) {
    ledger
        .call(height, &[who], "postGeo", &[addr(&who), text("somewhere"), int(ts)])
        .unwrap();
}

#[test]
fn test_ticket_expiry() {
    let mut ledger = TestLedger::in_memory(no_emission_params());
    ledger.deploy(1);
    ledger
        .call(2, &[ADMIN], "transferFromPool", &[addr(&ALICE), int(100)])
        .unwrap();
    ledger
        .call(2, &[ALICE], "requestTicket", &[addr(&ALICE), int(2)])
        .unwrap();
    assert_eq!(ledger.ticket(&ALICE), Some(2));

    let query = [addr(&ALICE), int(1)];
    assert!(ledger.call(2, &[ALICE], "requestGeo", &query).is_ok());
    assert!(ledger.call(3, &[ALICE], "requestGeo", &query).is_ok());
    assert_eq!(ledger.block(), 2);

    // Block 3 is past the ticket; the failed query does not advance
    assert!(matches!(
        ledger.call(4, &[ALICE], "requestGeo", &query),
        Err(ContractError::TicketExpiredOrMissing(a)) if a == ALICE
    ));
    assert_eq!(ledger.block(), 2);

    // Buying again at block 3 replaces the expiry
    ledger
        .call(4, &[ALICE], "requestTicket", &[addr(&ALICE), int(1)])
        .unwrap();
    assert_eq!(ledger.ticket(&ALICE), Some(3));
    assert!(ledger.call(4, &[ALICE], "requestGeo", &query).is_ok());
}

#[test]
fn test_query_range() {
    let mut ledger = TestLedger::in_memory(no_emission_params());
    ledger.deploy(1);

    post(&mut ledger, 2, BOB, 1);
    post(&mut ledger, 3, BOB, 2);
    post(&mut ledger, 3, CAROL, 3);
    post(&mut ledger, 4, CAROL, 4);
    ledger
        .call(5, &[ADMIN], "transferFromPool", &[addr(&ALICE), int(100)])
        .unwrap();
    ledger
        .call(5, &[ALICE], "requestTicket", &[addr(&ALICE), int(10)])
        .unwrap();
    assert_eq!(ledger.block(), 4);

    let mut query = |n: i64| {
        let receipt = ledger
            .call(5, &[ALICE], "requestGeo", &[addr(&ALICE), int(n)])
            .unwrap();
        queried_timestamps(&receipt)
    };
    assert_eq!(query(1), Vec::<u64>::new());
    assert_eq!(query(2), vec![4]);
    assert_eq!(query(3), vec![2, 3, 4]);
    assert_eq!(query(4), vec![1, 2, 3, 4]);
    assert_eq!(query(100), vec![1, 2, 3, 4]);
}

#[test]
fn test_query_does_not_touch_balances_or_entries() {
    let mut ledger = TestLedger::in_memory(no_emission_params());
    ledger.deploy(1);
    post(&mut ledger, 2, BOB, 1);
    ledger
        .call(2, &[ADMIN], "transferFromPool", &[addr(&ALICE), int(100)])
        .unwrap();
    ledger
        .call(2, &[ALICE], "requestTicket", &[addr(&ALICE), int(1)])
        .unwrap();

    let before = ledger.snapshot();
    let receipt = ledger
        .call(2, &[ALICE], "requestGeo", &[addr(&ALICE), int(1)])
        .unwrap();
    assert_eq!(queried_timestamps(&receipt), vec![1]);
    assert_eq!(ledger.snapshot(), before);
}

#[test]
fn test_post_requires_reporter_witness() {
    let mut ledger = TestLedger::in_memory(no_emission_params());
    ledger.deploy(1);

    assert!(matches!(
        ledger.call(2, &[ALICE], "postGeo", &[addr(&BOB), text("x"), int(1)]),
        Err(ContractError::AuthorizationDenied(a)) if a == BOB
    ));
    assert!(matches!(
        ledger.call(2, &[BOB], "postGeo", &[int(5), text("x"), int(1)]),
        Err(ContractError::Validation(_))
    ));
}

#[test]
fn test_negative_timestamp_is_rejected_not_rewritten() {
    let mut ledger = TestLedger::in_memory(no_emission_params());
    ledger.deploy(1);
    post(&mut ledger, 2, BOB, 0);

    let before = ledger.snapshot();
    assert!(matches!(
        ledger.call(2, &[BOB], "postGeo", &[addr(&BOB), text("x"), int(-1)]),
        Err(ContractError::Validation(_))
    ));
    assert_eq!(ledger.snapshot(), before);

    ledger
        .call(2, &[ADMIN], "transferFromPool", &[addr(&ALICE), int(100)])
        .unwrap();
    ledger
        .call(2, &[ALICE], "requestTicket", &[addr(&ALICE), int(1)])
        .unwrap();
    let receipt = ledger
        .call(2, &[ALICE], "requestGeo", &[addr(&ALICE), int(1)])
        .unwrap();
    assert_eq!(queried_timestamps(&receipt), vec![0]);
}

#[test]
fn test_numeric_location_is_stored_as_text() {
    let mut ledger = TestLedger::in_memory(no_emission_params());
    ledger.deploy(1);
    ledger
        .call(2, &[BOB], "postGeo", &[addr(&BOB), int(12345), int(7)])
        .unwrap();

    let record = ledger.contract.state().entry(1, 1).unwrap();
    assert_eq!(record.location, b"12345".to_vec());
    assert_eq!(record.timestamp, 7);
}
