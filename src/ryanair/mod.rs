//! Client for the airline's account, order, booking, basket and catalogue APIs.
use async_trait::async_trait;
use std::fmt;

use crate::config::{self, Config, RyanairPaths};
use crate::error::Result;
use crate::event::Credentials;
use crate::transport::{HttpClient, TransportError};

pub mod auth;
pub mod basket;
pub mod booking;
pub mod model;
pub mod seatmap;

use seatmap::RowCountMethod;

/// Authenticated customer identity.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub customer_id: String,
    pub token: String,
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("customer_id", &self.customer_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingId(pub String);

/// Trip-scoped credentials plus the departure times of every journey.
#[derive(Clone, PartialEq, Eq)]
pub struct TripSession {
    pub trip_id: String,
    pub session_token: String,
    pub journeys: Vec<String>,
}

impl fmt::Debug for TripSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripSession")
            .field("trip_id", &self.trip_id)
            .field("session_token", &"[REDACTED]")
            .field("journeys", &self.journeys)
            .finish()
    }
}

/// Handle to a server-side pricing basket. Nothing ever releases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketId(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSnapshot {
    pub unavailable_seats: Vec<String>,
    pub equipment_model: String,
}

/// Every upstream call the seat check depends on, in pipeline order.
#[async_trait]
pub trait AirlineApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken>;

    async fn resolve_booking_id(&self, session: &SessionToken) -> Result<BookingId>;

    async fn resolve_trip_session(
        &self,
        session: &SessionToken,
        booking_id: &BookingId,
    ) -> Result<TripSession>;

    async fn create_basket(&self, trip: &TripSession) -> Result<BasketId>;

    async fn seats(&self, basket_id: &BasketId) -> Result<SeatSnapshot>;

    async fn row_count(&self, equipment_model: &str) -> Result<u32>;
}

#[derive(Clone)]
pub struct RyanairClient {
    http: HttpClient,
    paths: RyanairPaths,
    row_count_method: RowCountMethod,
}

impl fmt::Debug for RyanairClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RyanairClient")
            .field("base_url", self.http.base_url())
            .field("row_count_method", &self.row_count_method)
            .finish_non_exhaustive()
    }
}

impl RyanairClient {
    pub fn new(http: HttpClient, paths: RyanairPaths, row_count_method: RowCountMethod) -> Self {
        Self {
            http,
            paths,
            row_count_method,
        }
    }

    pub fn from_config(cfg: &Config) -> std::result::Result<Self, TransportError> {
        Self::from_settings(&cfg.ryanair, &cfg.http)
    }

    pub fn from_settings(
        ryanair: &config::Ryanair,
        http: &config::Http,
    ) -> std::result::Result<Self, TransportError> {
        let http = HttpClient::new(&ryanair.base_url, http)?;
        Ok(Self::new(http, ryanair.paths.clone(), ryanair.row_count))
    }
}

#[async_trait]
impl AirlineApi for RyanairClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        RyanairClient::login(self, credentials).await
    }

    async fn resolve_booking_id(&self, session: &SessionToken) -> Result<BookingId> {
        RyanairClient::resolve_booking_id(self, session).await
    }

    async fn resolve_trip_session(
        &self,
        session: &SessionToken,
        booking_id: &BookingId,
    ) -> Result<TripSession> {
        RyanairClient::resolve_trip_session(self, session, booking_id).await
    }

    async fn create_basket(&self, trip: &TripSession) -> Result<BasketId> {
        RyanairClient::create_basket(self, trip).await
    }

    async fn seats(&self, basket_id: &BasketId) -> Result<SeatSnapshot> {
        RyanairClient::seats(self, basket_id).await
    }

    async fn row_count(&self, equipment_model: &str) -> Result<u32> {
        RyanairClient::row_count(self, equipment_model).await
    }
}

/// Treat absent and blank strings alike.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
