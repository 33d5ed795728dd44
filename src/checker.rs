//! One seat check: the upstream chain, the diff against the previous run and
//! the notification when something changed.
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::{CheckError, Result};
use crate::event::CheckEvent;
use crate::notifier::Notifier;
use crate::ryanair::AirlineApi;
use crate::seats::{self, SeatState};

/// What a completed check observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub seat_state: SeatState,
    pub departure: Option<DateTime<Utc>>,
    pub notified: bool,
}

pub struct SeatChecker {
    airline: Arc<dyn AirlineApi>,
    notifier: Arc<dyn Notifier>,
    deadline: Option<Duration>,
}

impl SeatChecker {
    pub fn new(airline: Arc<dyn AirlineApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            airline,
            notifier,
            deadline: None,
        }
    }

    /// Abort the whole chain once `deadline` has elapsed.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run one check. Never fails: errors are folded into the returned event.
    pub async fn run(&self, event: CheckEvent, cancel: &CancellationToken) -> CheckEvent {
        self.run_at(event, Utc::now(), cancel).await
    }

    #[instrument(skip_all, fields(topic = %event.ntfy_topic))]
    pub async fn run_at(
        &self,
        event: CheckEvent,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> CheckEvent {
        info!(previous = ?event.seat_state, departure = %event.departure, "seat check started");
        match self.check_guarded(&event, now, cancel).await {
            Ok(observation) => {
                info!(
                    current = %observation.seat_state,
                    notified = observation.notified,
                    "seat check finished"
                );
                let departure = observation
                    .departure
                    .map(format_departure)
                    .unwrap_or_default();
                event.succeeded(observation.seat_state, departure)
            }
            Err(err) => {
                error!(error = %err, "seat check failed");
                event.failed(err.to_string())
            }
        }
    }

    async fn check_guarded(
        &self,
        event: &CheckEvent,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Observation> {
        let chain = async {
            match self.deadline {
                Some(limit) => match tokio::time::timeout(limit, self.check(event, now)).await {
                    Ok(res) => res,
                    Err(_) => Err(CheckError::DeadlineExceeded(limit)),
                },
                None => self.check(event, now).await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CheckError::Cancelled),
            res = chain => res,
        }
    }

    /// The bare pipeline; the first failing step ends it.
    pub async fn check(&self, event: &CheckEvent, now: DateTime<Utc>) -> Result<Observation> {
        let stored_departure = parse_stored_departure(&event.departure)?;

        let session = self.airline.login(&event.credentials()).await?;
        let booking_id = self.airline.resolve_booking_id(&session).await?;
        let trip = self.airline.resolve_trip_session(&session, &booking_id).await?;
        let basket_id = self.airline.create_basket(&trip).await?;
        let snapshot = self.airline.seats(&basket_id).await?;
        let rows = self.airline.row_count(&snapshot.equipment_model).await?;
        let current = seats::calculate(rows, &snapshot.unavailable_seats);

        let departed = stored_departure.is_some_and(|d| d <= now);
        let departure = match stored_departure {
            Some(d) if d > now => Some(d),
            _ => next_departure(&trip.journeys, now).or(stored_departure),
        };

        if departed {
            warn!(
                departure = %event.departure,
                "tracked flight has departed; reporting zero seats"
            );
            return Ok(Observation {
                seat_state: SeatState::default(),
                departure,
                notified: false,
            });
        }

        // No previous state counts as a change.
        let notified = if event.seat_state != Some(current) {
            self.notifier
                .notify(&event.ntfy_topic, &current.to_string())
                .await?;
            true
        } else {
            false
        };

        Ok(Observation {
            seat_state: current,
            departure,
            notified,
        })
    }
}

/// Earliest journey departing strictly after `now`.
pub fn next_departure(journeys: &[String], now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    journeys
        .iter()
        .filter_map(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!(departure = %raw, "ignoring unparseable journey departure");
            }
            parsed
        })
        .filter(|d| *d > now)
        .min()
}

fn parse_stored_departure(raw: &str) -> Result<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_timestamp(raw)
        .map(Some)
        .ok_or_else(|| CheckError::InvalidInput(format!("departure {:?} is not RFC3339", raw)))
}

/// RFC3339, or a zone-less timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}

pub fn format_departure(departure: DateTime<Utc>) -> String {
    departure.to_rfc3339_opts(SecondsFormat::Secs, true)
}
