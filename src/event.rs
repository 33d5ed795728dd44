//! Invocation input/output exchanged with whoever drives the checker.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seats::SeatState;

pub const STATUS_OK: u16 = 200;
pub const STATUS_FAILED: u16 = 500;

/// One check request and, once processed, its result.
///
/// The caller persists the returned event and feeds it back on the next run,
/// so `seat_state` and `departure` carry the previously observed values.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckEvent {
    pub ryanair_email: String,
    pub ryanair_password: String,
    pub ntfy_topic: String,
    /// Last observed state; absent until a check has succeeded once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_state: Option<SeatState>,
    /// RFC3339 departure of the tracked journey; empty before the first run.
    #[serde(default)]
    pub departure: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl fmt::Debug for CheckEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckEvent")
            .field("ntfy_topic", &self.ntfy_topic)
            .field("seat_state", &self.seat_state)
            .field("departure", &self.departure)
            .field("status", &self.status)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl CheckEvent {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.ryanair_email.clone(),
            password: self.ryanair_password.clone(),
        }
    }

    /// Result event for a completed check.
    pub fn succeeded(mut self, seat_state: SeatState, departure: String) -> Self {
        self.seat_state = Some(seat_state);
        self.departure = departure;
        self.status = STATUS_OK;
        self.message.clear();
        self
    }

    /// Result event for a failed check; previous state is left untouched.
    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.status = STATUS_FAILED;
        self.message = message.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Airline account login.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
