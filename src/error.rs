use std::time::Duration;
use thiserror::Error;

use crate::transport::TransportError;

/// Why a single pipeline step failed.
#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("graphql errors: {0}")]
    GraphQl(String),
    #[error("{0}")]
    MissingData(String),
}

impl Cause {
    pub fn missing(what: impl Into<String>) -> Self {
        Cause::MissingData(what.into())
    }
}

/// Terminal failure of one check invocation, tagged by the step that broke.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("account login failed: {0}")]
    Auth(#[source] Cause),
    #[error("booking resolution failed: {0}")]
    Resolution(#[source] Cause),
    #[error("basket creation failed: {0}")]
    Basket(#[source] Cause),
    #[error("seat query failed: {0}")]
    SeatQuery(#[source] Cause),
    #[error("row count lookup failed: {0}")]
    RowCount(#[source] Cause),
    #[error("notification failed: {0}")]
    Notification(#[source] Cause),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("check cancelled")]
    Cancelled,
    #[error("check exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

pub type Result<T, E = CheckError> = std::result::Result<T, E>;
