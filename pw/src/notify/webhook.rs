//! Notifier trait and incoming-webhook implementation

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{MessageCard, NotifyError};
use crate::detector::ChangeRecord;

/// Delivers one alert per change record
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the alert once; no retry
    async fn notify(&self, record: &ChangeRecord) -> Result<(), NotifyError>;
}

/// Posts message cards to an incoming-webhook URL
#[derive(Debug, Clone)]
pub struct TeamsWebhook {
    http: Client,
    url: String,
}

impl TeamsWebhook {
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for TeamsWebhook {
    async fn notify(&self, record: &ChangeRecord) -> Result<(), NotifyError> {
        debug!(repo = %record.repo, path = %record.path, "TeamsWebhook::notify: called");
        let card = MessageCard::for_change(record);

        let resp = self.http.post(&self.url).json(&card).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "TeamsWebhook::notify: delivered");
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock notifier that records every delivered record
    #[derive(Default)]
    pub struct RecordingNotifier {
        delivered: Mutex<Vec<ChangeRecord>>,
        fail_paths: Vec<String>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Reject deliveries for this path
        pub fn failing_on(mut self, path: &str) -> Self {
            self.fail_paths.push(path.to_string());
            self
        }

        pub fn delivered(&self) -> Vec<ChangeRecord> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, record: &ChangeRecord) -> Result<(), NotifyError> {
            debug!(path = %record.path, "RecordingNotifier::notify: called");
            if self.fail_paths.contains(&record.path) {
                return Err(NotifyError::Rejected {
                    status: 400,
                    body: "scripted failure".to_string(),
                });
            }
            self.delivered.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}
