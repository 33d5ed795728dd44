use tracing::{debug, instrument};

use super::model::{BasketData, BasketVars, GqlQuery, GqlResponse};
use super::{non_blank, BasketId, RyanairClient, TripSession};
use crate::error::{Cause, CheckError, Result};
use crate::transport::Request;

const CREATE_BASKET_MUTATION: &str = r#"
mutation CreateBasketForActiveTrip($tripId: String!, $sessionToken: String) {
  createBasketForActiveTrip(tripId: $tripId, sessionToken: $sessionToken) {
    ...BasketCommon
  }
}
fragment BasketCommon on BasketType {
  id
}
"#;

impl RyanairClient {
    /// Open a pricing basket for the trip. Sent exactly once: a retry could
    /// leave duplicate baskets behind.
    ///
    /// The basket is never deleted afterwards. Whether the server expires it
    /// on its own is unknown; no cleanup endpoint is called.
    #[instrument(skip_all, fields(trip_id = %trip.trip_id))]
    pub async fn create_basket(&self, trip: &TripSession) -> Result<BasketId> {
        let body = GqlQuery {
            query: CREATE_BASKET_MUTATION,
            variables: BasketVars {
                trip_id: &trip.trip_id,
                session_token: &trip.session_token,
            },
        };
        let req = Request::post(self.paths.basket.as_str())
            .json(&body)
            .map_err(|e| CheckError::Basket(e.into()))?;
        let res: GqlResponse<BasketData> = self
            .http
            .send_json(&req)
            .await
            .map_err(|e| CheckError::Basket(e.into()))?;

        let id = res
            .into_data()
            .and_then(|data| {
                data.basket
                    .and_then(|b| non_blank(b.id))
                    .ok_or_else(|| Cause::missing("basket response has no id"))
            })
            .map_err(CheckError::Basket)?;
        debug!(basket_id = %id, "basket created");
        Ok(BasketId(id))
    }
}
