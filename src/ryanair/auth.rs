use tracing::{debug, instrument};

use super::model::{LoginRequest, LoginResponse};
use super::{non_blank, RyanairClient, SessionToken};
use crate::error::{Cause, CheckError, Result};
use crate::event::Credentials;
use crate::transport::Request;

impl RyanairClient {
    /// Exchange account credentials for a customer token.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        };
        let req = Request::post(self.paths.login.as_str())
            .json(&body)
            .map_err(|e| CheckError::Auth(e.into()))?;
        let res: LoginResponse = self
            .http
            .send_json(&req)
            .await
            .map_err(|e| CheckError::Auth(e.into()))?;

        let session = session_from(res).map_err(CheckError::Auth)?;
        debug!(customer_id = %session.customer_id, "account login succeeded");
        Ok(session)
    }
}

fn session_from(res: LoginResponse) -> std::result::Result<SessionToken, Cause> {
    let customer_id = non_blank(res.customer_id)
        .ok_or_else(|| Cause::missing("login response has no customerId"))?;
    let token = non_blank(res.token).ok_or_else(|| Cause::missing("login response has no token"))?;
    Ok(SessionToken { customer_id, token })
}
