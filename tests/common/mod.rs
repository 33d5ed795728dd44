#![allow(dead_code)]

use std::sync::Arc;

use seatchecker::config::{self, Config};
use seatchecker::error::{Cause, CheckError, Result};
use seatchecker::notifier::Notifier;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PATH: &str = "/api/usrprof/v2/accountLogin";
pub const ORDERS_PATH: &str = "/api/orders/v2/orders/customerid";
pub const BOOKING_PATH: &str = "/api/bookingfa/en-gb/graphql";
pub const BASKET_PATH: &str = "/api/basketapi/en-gb/graphql";
pub const SEATS_PATH: &str = "/api/catalogapi/en-gb/graphql";
pub const SEATMAP_PATH: &str = "/api/booking/v5/en-ie/res/seatmap";

pub const OUTBOUND: &str = "2030-05-01T06:00:00Z";
pub const INBOUND: &str = "2030-05-08T18:00:00Z";

/// Seats taken on a 4-row cabin, leaving Window: 4, Middle: 0, Aisle: 2.
pub const TAKEN: [&str; 18] = [
    "01A", "01B", "01E",
    "02B", "02C", "02D", "02E", "02F",
    "03B", "03C", "03D", "03E", "03F",
    "04A", "04B", "04C", "04D", "04E",
];

/// Example config pointed at the mock server for both the airline and ntfy.
pub fn config_for(server: &MockServer) -> Config {
    let mut cfg = config::parse(config::example()).unwrap();
    cfg.ryanair.base_url = server.uri();
    cfg.ntfy.base_url = server.uri();
    cfg.http.max_retries = 0;
    cfg.http.retry_backoff_ms = 1;
    cfg.http.max_backoff_ms = 5;
    cfg
}

pub fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_partial_json(json!({ "email": "john@doe.com", "password": "password" })))
        .respond_with(ok_json(json!({ "customerId": "customerid", "token": "token" })))
        .mount(server)
        .await;
}

pub async fn mount_orders(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(query_param("active", "true"))
        .and(query_param("order", "ASC"))
        .and(header("X-Auth-Token", "token"))
        .respond_with(ok_json(json!({
            "items": [{ "flights": [{ "bookingId": "booking_id" }] }]
        })))
        .mount(server)
        .await;
}

pub async fn mount_booking(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(BOOKING_PATH))
        .and(body_partial_json(json!({
            "variables": {
                "bookingInfo": { "bookingId": "booking_id", "surrogateId": "customerid" },
                "authToken": "token",
            }
        })))
        .respond_with(ok_json(json!({
            "data": {
                "getBookingByBookingId": {
                    "tripId": "trip_id",
                    "sessionToken": "session_token",
                    "journeys": [{ "departUTC": INBOUND }, { "departUTC": OUTBOUND }],
                }
            }
        })))
        .mount(server)
        .await;
}

pub async fn mount_basket(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(BASKET_PATH))
        .and(body_partial_json(json!({
            "variables": { "tripId": "trip_id", "sessionToken": "session_token" }
        })))
        .respond_with(ok_json(json!({
            "data": { "createBasketForActiveTrip": { "id": "basket_id" } }
        })))
        .mount(server)
        .await;
}

pub async fn mount_seats(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SEATS_PATH))
        .and(body_partial_json(json!({ "variables": { "basketId": "basket_id" } })))
        .respond_with(ok_json(json!({
            "data": { "seats": [{ "unavailableSeats": TAKEN, "equipmentModel": "73H" }] }
        })))
        .mount(server)
        .await;
}

pub fn seat_map(rows: &[u32]) -> Value {
    let seat_rows: Vec<Value> = rows
        .iter()
        .map(|r| Value::Array(vec![json!({ "row": r }); 6]))
        .collect();
    json!([{ "seatRows": seat_rows }])
}

pub async fn mount_seatmap(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEATMAP_PATH))
        .and(query_param("aircraftModel", "73H"))
        .respond_with(ok_json(seat_map(&[1, 2, 3, 4])))
        .mount(server)
        .await;
}

/// Every airline endpoint answering consistently.
pub async fn mount_airline(server: &MockServer) {
    mount_login(server).await;
    mount_orders(server).await;
    mount_booking(server).await;
    mount_basket(server).await;
    mount_seats(server).await;
    mount_seatmap(server).await;
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, topic: &str, message: &str) -> Result<()> {
        self.calls
            .lock()
            .await
            .push((topic.to_string(), message.to_string()));
        if self.fail {
            return Err(CheckError::Notification(Cause::missing("ntfy unavailable")));
        }
        Ok(())
    }
}
