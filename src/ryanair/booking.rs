use tracing::{debug, instrument, warn};

use super::model::{
    BookingData, BookingInfo, BookingVars, GqlQuery, GqlResponse, OrdersResponse, TripInfo,
};
use super::{non_blank, BookingId, RyanairClient, SessionToken, TripSession};
use crate::error::{Cause, CheckError, Result};
use crate::transport::Request;

const AUTH_HEADER: &str = "X-Auth-Token";

const BOOKING_QUERY: &str = r#"
query GetBookingByBookingId($bookingInfo: GetBookingByBookingIdInputType, $authToken: String!) {
  getBookingByBookingId(bookingInfo: $bookingInfo, authToken: $authToken) {
    sessionToken
    tripId
    journeys {
      ...JourneysFrag
    }
  }
}
fragment JourneysFrag on BookingJourneyResponseModelType {
  departUTC
}
"#;

impl RyanairClient {
    /// Booking id of the first flight of the first active order.
    ///
    /// Orders are requested in ascending order and the head is trusted to be
    /// the nearest upcoming trip; nothing here checks departure times.
    #[instrument(skip_all)]
    pub async fn resolve_booking_id(&self, session: &SessionToken) -> Result<BookingId> {
        let req = Request::get(self.paths.orders.as_str())
            .segment(session.customer_id.as_str())
            .query("active", "true")
            .query("order", "ASC")
            .header(AUTH_HEADER, session.token.as_str());
        let res: OrdersResponse = self
            .http
            .send_json(&req)
            .await
            .map_err(|e| CheckError::Resolution(e.into()))?;

        let booking_id = first_booking_id(res).map_err(CheckError::Resolution)?;
        debug!(booking_id = %booking_id.0, "resolved booking id");
        Ok(booking_id)
    }

    /// Trip id, session token and journeys for `booking_id`.
    #[instrument(skip_all)]
    pub async fn resolve_trip_session(
        &self,
        session: &SessionToken,
        booking_id: &BookingId,
    ) -> Result<TripSession> {
        let body = GqlQuery {
            query: BOOKING_QUERY,
            variables: BookingVars {
                booking_info: BookingInfo {
                    booking_id: &booking_id.0,
                    surrogate_id: &session.customer_id,
                },
                auth_token: &session.token,
            },
        };
        let req = Request::post(self.paths.booking.as_str())
            .json(&body)
            .map_err(|e| CheckError::Resolution(e.into()))?;
        let res: GqlResponse<BookingData> = self
            .http
            .send_json(&req)
            .await
            .map_err(|e| CheckError::Resolution(e.into()))?;

        let info = res
            .into_data()
            .and_then(|data| {
                data.booking
                    .ok_or_else(|| Cause::missing("booking not found"))
            })
            .map_err(CheckError::Resolution)?;
        let trip = trip_session_from(info).map_err(CheckError::Resolution)?;
        debug!(trip_id = %trip.trip_id, journeys = trip.journeys.len(), "resolved trip session");
        Ok(trip)
    }
}

fn first_booking_id(res: OrdersResponse) -> std::result::Result<BookingId, Cause> {
    let item = res
        .items
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| Cause::missing("no active orders"))?;
    let flight = item
        .flights
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| Cause::missing("first active order has no flights"))?;
    non_blank(flight.booking_id)
        .map(BookingId)
        .ok_or_else(|| Cause::missing("first flight has no bookingId"))
}

fn trip_session_from(info: TripInfo) -> std::result::Result<TripSession, Cause> {
    let trip_id = non_blank(info.trip_id).ok_or_else(|| Cause::missing("booking has no tripId"))?;
    let session_token =
        non_blank(info.session_token).ok_or_else(|| Cause::missing("booking has no sessionToken"))?;
    let journeys: Vec<String> = info
        .journeys
        .unwrap_or_default()
        .into_iter()
        .filter_map(|j| non_blank(j.depart_utc))
        .collect();
    if journeys.is_empty() {
        warn!(%trip_id, "booking lists no journey departures");
    }
    Ok(TripSession {
        trip_id,
        session_token,
        journeys,
    })
}
