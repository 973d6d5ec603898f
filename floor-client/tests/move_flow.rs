//! End-to-end move against a mocked reservation API.
//!
//! Kafana in Belgrade, 17:00-22:00, Friday 2025-01-10. T1 [2,6] holds R1
//! (Ana, 4 guests) 18:00-20:00; T2 [2,4] is free. R1 is dragged to T2 19:00.

use std::sync::Arc;

use floor_client::client::{FloorApi, NetworkHttpClient};
use floor_client::schedule::{fetch_grid, DependentView, ScheduleCache, ScheduleKey, ScheduleState};
use floor_client::{
    ClientConfig, DropTarget, FailureKind, LoadStrategy, MoveCoordinator, MutationOutcome,
    TracingNotifier,
};
use serde_json::{json, Value};
use shared::timeslot::TimeSlot;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DATE: &str = "2025-01-10";
const TZ: &str = "Europe/Belgrade";
const SLOTS: [&str; 5] = ["17:00", "18:00", "19:00", "20:00", "21:00"];

fn envelope(data: Value) -> Value {
    json!({ "code": 0, "message": "OK", "data": data })
}

fn r1() -> Value {
    json!({ "id": 1, "guestName": "Ana", "guestCount": 4, "status": "confirmed" })
}

fn cell(id: i64, min: i32, max: i32, reservation: Option<Value>) -> Value {
    match reservation {
        Some(r) => json!({
            "tableId": id, "tableName": format!("T{id}"), "minGuests": min, "maxGuests": max,
            "status": "reserved", "reservation": r
        }),
        None => json!({
            "tableId": id, "tableName": format!("T{id}"), "minGuests": min, "maxGuests": max,
            "status": "available"
        }),
    }
}

/// Cells for one slot with R1 placed on (`table`, `slots`)
fn slot_cells(slot: &str, table: i64, r1_slots: &[&str]) -> Value {
    let holds = r1_slots.contains(&slot);
    json!([
        cell(2, 2, 4, (holds && table == 2).then(r1)),
        cell(1, 2, 6, (holds && table == 1).then(r1)),
    ])
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/restaurants/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 1,
            "name": "Kafana",
            "openingTime": "17:00",
            "closingTime": "22:00",
            "timezone": TZ,
            "avgReservationDuration": 120
        }))))
        .mount(server)
        .await;
}

async fn mount_schedule(server: &MockServer, table: i64, r1_slots: &[&str]) {
    for slot in SLOTS {
        Mock::given(method("GET"))
            .and(path("/api/tables/availability"))
            .and(query_param("date", DATE))
            .and(query_param("time", slot))
            .and(query_param("timezone", TZ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(slot_cells(slot, table, r1_slots))),
            )
            .mount(server)
            .await;
    }
}

fn move_body() -> Value {
    json!({ "tableId": 2, "time": "19:00", "date": DATE, "timezone": TZ })
}

struct Harness {
    coordinator: MoveCoordinator<FloorApi<NetworkHttpClient>>,
    api: Arc<FloorApi<NetworkHttpClient>>,
    key: ScheduleKey,
}

async fn harness(server: &MockServer) -> Harness {
    mount_profile(server).await;
    mount_schedule(server, 1, &["18:00", "19:00"]).await;

    let config = ClientConfig::new(server.uri()).with_token("test-token");
    let api = Arc::new(FloorApi::new(NetworkHttpClient::new(&config).unwrap()));
    let (_, grid) = fetch_grid(api.as_ref()).await.unwrap();
    let key = ScheduleKey::new(shared::timeslot::parse_date(DATE).unwrap(), TZ);

    let cache = ScheduleCache::new();
    cache
        .load(api.as_ref(), &grid, &key, LoadStrategy::PerSlot)
        .await
        .unwrap();
    let coordinator = MoveCoordinator::new(api.clone(), cache, grid, Arc::new(TracingNotifier));
    Harness {
        coordinator,
        api,
        key,
    }
}

#[tokio::test]
async fn test_initial_schedule_is_sorted_and_placed() {
    let server = MockServer::start().await;
    let h = harness(&server).await;
    let schedule = h.coordinator.cache().get(&h.key).unwrap();

    assert_eq!(schedule.rows.len(), 5);
    for row in &schedule.rows {
        let ids: Vec<i64> = row.tables.iter().map(|c| c.table_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
    assert_eq!(schedule.slots_of(1, 1), vec![TimeSlot::at(18), TimeSlot::at(19)]);
}

#[tokio::test]
async fn test_move_succeeds_and_reload_matches_optimistic_state() {
    let server = MockServer::start().await;
    let h = harness(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/api/reservations/1"))
        .and(body_json(move_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 1, "tableId": 2, "date": DATE, "time": "19:00",
            "guestName": "Ana", "guestCount": 4, "status": "confirmed"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    h.coordinator.begin_drag(&h.key, 1, TimeSlot::at(18)).unwrap();
    let outcome = h
        .coordinator
        .drop_reservation(&h.key, DropTarget::new(2, TimeSlot::at(19)))
        .await;
    match &outcome {
        MutationOutcome::Committed(r) => {
            assert_eq!(r.table_id, 2);
            assert_eq!(r.time, TimeSlot::at(19));
        }
        other => panic!("unexpected: {:?}", other),
    }

    let cache = h.coordinator.cache();
    let optimistic = match cache.state(&h.key) {
        ScheduleState::Stale(s) => s,
        other => panic!("expected stale entry, got {:?}", other),
    };
    assert_eq!(optimistic.slots_of(2, 1), vec![TimeSlot::at(19), TimeSlot::at(20)]);
    assert!(optimistic.slots_of(1, 1).is_empty());
    assert_eq!(cache.view_generation(DependentView::Reservations(h.key.date)), 1);

    // Server now reports R1 on T2 19:00-21:00
    server.reset().await;
    mount_schedule(&server, 2, &["19:00", "20:00"]).await;
    let reloaded = cache
        .load(h.api.as_ref(), h.coordinator.grid(), &h.key, LoadStrategy::PerSlot)
        .await
        .unwrap();
    assert_eq!(reloaded, optimistic);
    assert_eq!(cache.state(&h.key), ScheduleState::Ready(optimistic));
}

#[tokio::test]
async fn test_conflict_rolls_back_exactly() {
    let server = MockServer::start().await;
    let h = harness(&server).await;
    let before = h.coordinator.cache().get(&h.key).unwrap();

    Mock::given(method("PATCH"))
        .and(path("/api/reservations/1"))
        .and(body_json(move_body()))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": 4002,
            "message": "Table 2 was just booked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    h.coordinator.begin_drag(&h.key, 1, TimeSlot::at(18)).unwrap();
    let outcome = h
        .coordinator
        .drop_reservation(&h.key, DropTarget::new(2, TimeSlot::at(19)))
        .await;

    assert_eq!(
        outcome,
        MutationOutcome::RolledBack {
            kind: FailureKind::Conflict,
            message: "Table 2 was just booked".into(),
        }
    );
    assert_eq!(h.coordinator.cache().get(&h.key).unwrap(), before);
    assert!(!h.coordinator.tracker().lock().is_pending(1));
}

#[tokio::test]
async fn test_plain_status_errors_roll_back() {
    for (status, body, kind) in [
        (409, "conflict", FailureKind::Conflict),
        (422, "too many guests", FailureKind::Validation),
        (500, "database down", FailureKind::Network),
    ] {
        let server = MockServer::start().await;
        let h = harness(&server).await;
        let before = h.coordinator.cache().get(&h.key).unwrap();

        Mock::given(method("PATCH"))
            .and(path("/api/reservations/1"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;

        h.coordinator.begin_drag(&h.key, 1, TimeSlot::at(18)).unwrap();
        let outcome = h
            .coordinator
            .drop_reservation(&h.key, DropTarget::new(2, TimeSlot::at(19)))
            .await;

        match outcome {
            MutationOutcome::RolledBack { kind: got, .. } => assert_eq!(got, kind, "status {status}"),
            other => panic!("status {status}: unexpected {:?}", other),
        }
        assert_eq!(h.coordinator.cache().get(&h.key).unwrap(), before);
    }
}

#[tokio::test]
async fn test_cancel_sends_status_and_timezone() {
    let server = MockServer::start().await;
    let h = harness(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/api/reservations/1"))
        .and(body_json(json!({ "status": "canceled", "timezone": TZ })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 1, "tableId": 1, "date": DATE, "time": "18:00",
            "guestName": "Ana", "guestCount": 4, "status": "canceled"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = h.coordinator.cancel_reservation(&h.key, 1, 1).await;
    assert!(outcome.is_committed());
    assert!(h.coordinator.cache().get(&h.key).unwrap().slots_of(1, 1).is_empty());
}
