use serde::{Deserialize, Serialize};

use crate::error::Cause;

#[derive(Serialize, Debug)]
pub struct GqlQuery<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Deserialize, Debug)]
pub struct GqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GqlError>>,
}

#[derive(Deserialize, Debug)]
pub struct GqlError {
    pub message: String,
}

impl<T> GqlResponse<T> {
    /// Any reported error fails the whole response; partial data is not trusted.
    pub fn into_data(self) -> Result<T, Cause> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Cause::GraphQl(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| Cause::missing("graphql response has no data"))
    }
}

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub customer_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct OrdersResponse {
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct OrderItem {
    #[serde(default)]
    pub flights: Option<Vec<OrderFlight>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderFlight {
    pub booking_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingVars<'a> {
    pub booking_info: BookingInfo<'a>,
    pub auth_token: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo<'a> {
    pub booking_id: &'a str,
    pub surrogate_id: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct BookingData {
    #[serde(rename = "getBookingByBookingId")]
    pub booking: Option<TripInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TripInfo {
    pub trip_id: Option<String>,
    pub session_token: Option<String>,
    #[serde(default)]
    pub journeys: Option<Vec<Journey>>,
}

#[derive(Deserialize, Debug)]
pub struct Journey {
    #[serde(rename = "departUTC")]
    pub depart_utc: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BasketVars<'a> {
    pub trip_id: &'a str,
    pub session_token: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct BasketData {
    #[serde(rename = "createBasketForActiveTrip")]
    pub basket: Option<BasketRef>,
}

#[derive(Deserialize, Debug)]
pub struct BasketRef {
    pub id: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SeatsVars<'a> {
    pub basket_id: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct SeatsData {
    #[serde(default)]
    pub seats: Option<Vec<SeatAvailability>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SeatAvailability {
    #[serde(default)]
    pub unavailable_seats: Option<Vec<String>>,
    pub equipment_model: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    #[serde(default)]
    pub seat_rows: Option<Vec<Vec<SeatMapSeat>>>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct SeatMapSeat {
    #[serde(default)]
    pub row: Option<u32>,
}
