//! Push notifications about seat changes.
use async_trait::async_trait;
use std::fmt;
use tracing::{info, instrument};

use crate::config::{self, Config};
use crate::error::{Cause, CheckError, Result};
use crate::transport::{HttpClient, Request, TransportError};

const TITLE: &str = "Seatchecker";
const TAGS: &str = "airplane";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, topic: &str, message: &str) -> Result<()>;
}

/// Publishes plain-text messages to an ntfy server, one topic per subscriber.
#[derive(Clone)]
pub struct NtfyNotifier {
    http: HttpClient,
}

impl fmt::Debug for NtfyNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtfyNotifier")
            .field("base_url", self.http.base_url())
            .finish_non_exhaustive()
    }
}

impl NtfyNotifier {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(cfg: &Config) -> std::result::Result<Self, TransportError> {
        Self::from_settings(&cfg.ntfy, &cfg.http)
    }

    pub fn from_settings(
        ntfy: &config::Ntfy,
        http: &config::Http,
    ) -> std::result::Result<Self, TransportError> {
        Ok(Self::new(HttpClient::new(&ntfy.base_url, http)?))
    }

    pub fn build_request(topic: &str, message: &str) -> Request {
        Request::post("")
            .segment(topic)
            .header("Title", TITLE)
            .header("Tags", TAGS)
            .text(message)
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    #[instrument(skip_all, fields(topic = %topic))]
    async fn notify(&self, topic: &str, message: &str) -> Result<()> {
        if topic.trim().is_empty() {
            return Err(CheckError::Notification(Cause::missing(
                "notification topic is empty",
            )));
        }
        let req = Self::build_request(topic, message);
        self.http
            .send(&req)
            .await
            .map_err(|e| CheckError::Notification(e.into()))?;
        info!(message, "notification sent");
        Ok(())
    }
}
