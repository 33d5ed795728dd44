//! Seat availability for a basket and cabin size for an aircraft model.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use super::model::{GqlQuery, GqlResponse, SeatMap, SeatsData, SeatsVars};
use super::{non_blank, BasketId, RyanairClient, SeatSnapshot};
use crate::error::{Cause, CheckError, Result};
use crate::transport::Request;

const SEATS_QUERY: &str = r#"
query GetSeatsQuery($basketId: String!) {
  seats(basketId: $basketId) {
    ...SeatsResponse
  }
}
fragment SeatsResponse on SeatAvailability {
  unavailableSeats
  equipmentModel
}
"#;

/// How a seat map is turned into a row count.
///
/// The two agree on contiguous cabins. They differ when row numbers are
/// skipped (many cabins have no row 13): `RowList` counts the rows actually
/// present, `MaxRow` takes the highest row number.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowCountMethod {
    #[default]
    RowList,
    MaxRow,
}

impl RowCountMethod {
    pub fn apply(self, map: &SeatMap) -> u32 {
        match self {
            RowCountMethod::RowList => row_count_by_row_list(map),
            RowCountMethod::MaxRow => row_count_by_max_row(map),
        }
    }
}

/// Length of the seat map's row list, empty rows included.
pub fn row_count_by_row_list(map: &SeatMap) -> u32 {
    map.seat_rows.as_ref().map_or(0, |rows| rows.len() as u32)
}

/// Highest row number mentioned by any seat. Seats without a row are skipped.
pub fn row_count_by_max_row(map: &SeatMap) -> u32 {
    map.seat_rows
        .iter()
        .flatten()
        .flatten()
        .filter_map(|seat| seat.row)
        .max()
        .unwrap_or(0)
}

/// Number of distinct row numbers mentioned by any seat.
pub fn distinct_rows(map: &SeatMap) -> u32 {
    map.seat_rows
        .iter()
        .flatten()
        .flatten()
        .filter_map(|seat| seat.row)
        .collect::<BTreeSet<_>>()
        .len() as u32
}

impl RyanairClient {
    /// Unavailable seat codes and the aircraft model of the basket's first flight.
    #[instrument(skip_all)]
    pub async fn seats(&self, basket_id: &BasketId) -> Result<SeatSnapshot> {
        let body = GqlQuery {
            query: SEATS_QUERY,
            variables: SeatsVars {
                basket_id: &basket_id.0,
            },
        };
        let req = Request::post(self.paths.seats.as_str())
            .json(&body)
            .map_err(|e| CheckError::SeatQuery(e.into()))?;
        let res: GqlResponse<SeatsData> = self
            .http
            .send_json(&req)
            .await
            .map_err(|e| CheckError::SeatQuery(e.into()))?;

        // TODO: the first entry is the outbound flight; pick the entry matching
        // the tracked departure once return legs matter.
        let first = res
            .into_data()
            .and_then(|data| {
                data.seats
                    .unwrap_or_default()
                    .into_iter()
                    .next()
                    .ok_or_else(|| Cause::missing("seat availability list is empty"))
            })
            .map_err(CheckError::SeatQuery)?;
        let equipment_model = non_blank(first.equipment_model).ok_or_else(|| {
            CheckError::SeatQuery(Cause::missing("seat availability has no equipmentModel"))
        })?;
        let unavailable_seats = first.unavailable_seats.unwrap_or_default();
        debug!(
            %equipment_model,
            unavailable = unavailable_seats.len(),
            "seat availability retrieved"
        );
        Ok(SeatSnapshot {
            unavailable_seats,
            equipment_model,
        })
    }

    /// Row count of `equipment_model`, using the configured counting method.
    #[instrument(skip_all, fields(equipment_model = %equipment_model))]
    pub async fn row_count(&self, equipment_model: &str) -> Result<u32> {
        let map = self.seat_map(equipment_model).await?;
        let rows = self.row_count_method.apply(&map);
        debug!(rows, method = ?self.row_count_method, "row count computed");
        Ok(rows)
    }

    /// Raw seat map of `equipment_model` (first entry of the response).
    pub async fn seat_map(&self, equipment_model: &str) -> Result<SeatMap> {
        let req = Request::get(self.paths.seatmap.as_str()).query("aircraftModel", equipment_model);
        let maps: Vec<SeatMap> = self
            .http
            .send_json(&req)
            .await
            .map_err(|e| CheckError::RowCount(e.into()))?;
        maps.into_iter().next().ok_or_else(|| {
            CheckError::RowCount(Cause::missing(format!(
                "no seat map for aircraft model {}",
                equipment_model
            )))
        })
    }
}
