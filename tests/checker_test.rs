mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use common::*;
use seatchecker::checker::SeatChecker;
use seatchecker::event::{CheckEvent, STATUS_FAILED, STATUS_OK};
use seatchecker::notifier::NtfyNotifier;
use seatchecker::ryanair::RyanairClient;
use seatchecker::seats::SeatState;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOPIC: &str = "seats-topic";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 4, 15, 12, 0, 0).unwrap()
}

fn first_run() -> CheckEvent {
    CheckEvent {
        ryanair_email: "john@doe.com".into(),
        ryanair_password: "password".into(),
        ntfy_topic: TOPIC.into(),
        ..Default::default()
    }
}

fn event(previous: SeatState, departure: &str) -> CheckEvent {
    CheckEvent {
        seat_state: Some(previous),
        departure: departure.into(),
        ..first_run()
    }
}

fn checker(server: &MockServer, notifier: RecordingNotifier) -> SeatChecker {
    let airline = RyanairClient::from_config(&config_for(server)).unwrap();
    SeatChecker::new(Arc::new(airline), Arc::new(notifier))
}

#[tokio::test]
async fn changed_state_notifies_once() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let out = checker
        .run_at(event(SeatState::new(8, 8, 8), ""), now(), &CancellationToken::new())
        .await;

    assert_eq!(out.status, STATUS_OK, "message: {}", out.message);
    assert!(out.message.is_empty());
    assert_eq!(out.seat_state, Some(SeatState::new(4, 0, 2)));
    assert_eq!(
        notifier.calls().await,
        vec![(TOPIC.to_string(), "Window: 4, Middle: 0, Aisle: 2".to_string())]
    );
}

#[tokio::test]
async fn unchanged_state_stays_quiet() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let out = checker
        .run_at(
            event(SeatState::new(4, 0, 2), OUTBOUND),
            now(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(out.status, STATUS_OK, "message: {}", out.message);
    assert_eq!(out.seat_state, Some(SeatState::new(4, 0, 2)));
    assert!(notifier.calls().await.is_empty());
}

#[tokio::test]
async fn feeding_output_back_is_quiet() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());
    let cancel = CancellationToken::new();

    let first = checker.run_at(first_run(), now(), &cancel).await;
    let second = checker.run_at(first.clone(), now(), &cancel).await;
    assert_eq!(first.seat_state, Some(SeatState::new(4, 0, 2)));

    assert_eq!(second.status, STATUS_OK);
    assert_eq!(second.seat_state, first.seat_state);
    assert_eq!(second.departure, first.departure);
    assert_eq!(notifier.calls().await.len(), 1);
}

#[tokio::test]
async fn first_run_notifies_even_when_fully_booked() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_orders(&server).await;
    mount_booking(&server).await;
    mount_basket(&server).await;
    mount_seatmap(&server).await;
    let every_seat: Vec<String> = (1..=4)
        .flat_map(|row| ["A", "B", "C", "D", "E", "F"].map(|col| format!("{:02}{}", row, col)))
        .collect();
    Mock::given(method("POST"))
        .and(path(SEATS_PATH))
        .respond_with(ok_json(serde_json::json!({
            "data": { "seats": [{ "unavailableSeats": every_seat, "equipmentModel": "73H" }] }
        })))
        .mount(&server)
        .await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let out = checker.run_at(first_run(), now(), &CancellationToken::new()).await;

    assert_eq!(out.status, STATUS_OK, "message: {}", out.message);
    assert_eq!(out.seat_state, Some(SeatState::new(0, 0, 0)));
    assert_eq!(
        notifier.calls().await,
        vec![(TOPIC.to_string(), "Window: 0, Middle: 0, Aisle: 0".to_string())]
    );
}

#[tokio::test]
async fn first_run_picks_earliest_future_journey() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let checker = checker(&server, RecordingNotifier::default());

    let out = checker.run_at(first_run(), now(), &CancellationToken::new()).await;
    assert_eq!(out.departure, OUTBOUND);

    // Outbound already flown: the return leg is next.
    let after_outbound = Utc.with_ymd_and_hms(2030, 5, 2, 0, 0, 0).unwrap();
    let out = checker.run_at(first_run(), after_outbound, &CancellationToken::new()).await;
    assert_eq!(out.departure, INBOUND);
}

#[tokio::test]
async fn future_stored_departure_is_kept() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let checker = checker(&server, RecordingNotifier::default());

    let out = checker
        .run_at(
            event(SeatState::new(4, 0, 2), INBOUND),
            now(),
            &CancellationToken::new(),
        )
        .await;
    assert_eq!(out.departure, INBOUND);
}

#[tokio::test]
async fn departed_flight_reports_zero_without_notifying() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let out = checker
        .run_at(
            event(SeatState::new(6, 6, 6), "2030-04-01T06:00:00Z"),
            now(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(out.status, STATUS_OK, "message: {}", out.message);
    assert_eq!(out.seat_state, Some(SeatState::new(0, 0, 0)));
    assert_eq!(out.departure, OUTBOUND);
    assert!(notifier.calls().await.is_empty());
}

#[tokio::test]
async fn seatmap_failure_skips_notification() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_orders(&server).await;
    mount_booking(&server).await;
    mount_basket(&server).await;
    mount_seats(&server).await;
    Mock::given(method("GET"))
        .and(path(SEATMAP_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let previous = event(SeatState::new(8, 8, 8), OUTBOUND);
    let out = checker
        .run_at(previous.clone(), now(), &CancellationToken::new())
        .await;

    assert_eq!(out.status, STATUS_FAILED);
    assert!(out.message.contains("row count"), "message: {}", out.message);
    assert_eq!(out.seat_state, previous.seat_state);
    assert_eq!(out.departure, previous.departure);
    assert!(notifier.calls().await.is_empty());
}

#[tokio::test]
async fn login_failure_stops_the_chain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let out = checker.run_at(first_run(), now(), &CancellationToken::new()).await;

    assert_eq!(out.status, STATUS_FAILED);
    assert!(out.message.contains("account login failed"));
    assert!(notifier.calls().await.is_empty());
}

#[tokio::test]
async fn notifier_failure_fails_the_check() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    let notifier = RecordingNotifier::failing();
    let checker = checker(&server, notifier.clone());

    let out = checker.run_at(first_run(), now(), &CancellationToken::new()).await;

    assert_eq!(out.status, STATUS_FAILED);
    assert!(out.message.contains("notification failed"));
    assert_eq!(out.seat_state, None);
    assert_eq!(notifier.calls().await.len(), 1);
}

#[tokio::test]
async fn malformed_departure_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let checker = checker(&server, RecordingNotifier::default());

    let out = checker
        .run_at(
            event(SeatState::default(), "next tuesday"),
            now(),
            &CancellationToken::new(),
        )
        .await;
    assert_eq!(out.status, STATUS_FAILED);
    assert!(out.message.contains("invalid input"));
}

#[tokio::test]
async fn cancellation_aborts_in_flight_check() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ok_json(serde_json::json!({ "customerId": "customerid", "token": "token" }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    let notifier = RecordingNotifier::default();
    let checker = checker(&server, notifier.clone());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let out = checker.run_at(first_run(), now(), &cancel).await;
    assert_eq!(out.status, STATUS_FAILED);
    assert_eq!(out.message, "check cancelled");
    assert!(notifier.calls().await.is_empty());
}

#[tokio::test]
async fn deadline_bounds_the_whole_chain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ok_json(serde_json::json!({ "customerId": "customerid", "token": "token" }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    let checker = checker(&server, RecordingNotifier::default())
        .with_deadline(Some(Duration::from_millis(100)));

    let out = checker.run_at(first_run(), now(), &CancellationToken::new()).await;
    assert_eq!(out.status, STATUS_FAILED);
    assert!(out.message.contains("deadline"), "message: {}", out.message);
}

#[tokio::test]
async fn ntfy_receives_plain_text_state() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/{}", TOPIC)))
        .and(header("Title", "Seatchecker"))
        .and(header("Tags", "airplane"))
        .and(body_string("Window: 4, Middle: 0, Aisle: 2"))
        .respond_with(ok_json(serde_json::json!({ "id": "msg" })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let airline = RyanairClient::from_config(&cfg).unwrap();
    let notifier = NtfyNotifier::from_config(&cfg).unwrap();
    let checker = SeatChecker::new(Arc::new(airline), Arc::new(notifier));

    let out = checker
        .run_at(event(SeatState::new(8, 8, 8), ""), now(), &CancellationToken::new())
        .await;
    assert_eq!(out.status, STATUS_OK, "message: {}", out.message);
}

#[tokio::test]
async fn ntfy_rejection_is_notification_error() {
    let server = MockServer::start().await;
    mount_airline(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/{}", TOPIC)))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let airline = RyanairClient::from_config(&cfg).unwrap();
    let notifier = NtfyNotifier::from_config(&cfg).unwrap();
    let checker = SeatChecker::new(Arc::new(airline), Arc::new(notifier));

    let out = checker
        .run_at(event(SeatState::new(8, 8, 8), ""), now(), &CancellationToken::new())
        .await;
    assert_eq!(out.status, STATUS_FAILED);
    assert!(out.message.contains("notification failed"));
}
