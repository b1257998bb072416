use std::sync::Arc;

use crate::config::SessionCredentials;
use crate::errors::{SdkError, VisavisError};
use crate::sdk::{SdkEventFeed, SessionDriver, SessionHandle};

/// Retries allowed after the initial connect attempt.
pub const MAX_CONNECT_RETRIES: u32 = 3;

/// Outcome of a successful connector run.
pub struct ConnectedSession {
    pub handle: Arc<dyn SessionHandle>,
    pub events: SdkEventFeed,
    /// Retries it took to get here (0 on a first-try success).
    pub retries: u32,
}

impl std::fmt::Debug for ConnectedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedSession")
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

/// Bounded immediate-retry loop around [`SessionDriver::connect`].
///
/// Transient failures are absorbed and retried with the same credentials,
/// with no backoff delay, while the retry budget lasts. The terminal
/// failure is reported exactly once, as
/// [`VisavisError::ConnectExhausted`]; nothing ever panics here.
pub struct SessionConnector {
    driver: Arc<dyn SessionDriver>,
    credentials: SessionCredentials,
    retry_count: u32,
    last_error: Option<SdkError>,
}

impl SessionConnector {
    pub fn new(driver: Arc<dyn SessionDriver>, credentials: SessionCredentials) -> Self {
        Self {
            driver,
            credentials,
            retry_count: 0,
            last_error: None,
        }
    }

    /// Drive the connect loop to completion.
    ///
    /// Consumes the connector: an instance covers exactly one session
    /// lifetime, so reconnecting after success is unrepresentable.
    pub async fn run(mut self) -> Result<ConnectedSession, VisavisError> {
        loop {
            match self.driver.connect(&self.credentials).await {
                Ok((handle, events)) => {
                    if self.retry_count > 0 {
                        tracing::info!("session connected after {} retries", self.retry_count);
                    }
                    return Ok(ConnectedSession {
                        handle,
                        events,
                        retries: self.retry_count,
                    });
                }
                Err(err) => {
                    tracing::warn!("session connect error: {err}");
                    let exhausted = self.retry_count >= MAX_CONNECT_RETRIES;
                    self.last_error = Some(err);
                    if !exhausted {
                        self.retry_count += 1;
                        tracing::info!("session connect retry {}", self.retry_count);
                        continue;
                    }
                    tracing::error!(
                        "session connect failed after {} retries",
                        self.retry_count
                    );
                    return Err(VisavisError::ConnectExhausted {
                        retries: self.retry_count,
                        last_error: self
                            .last_error
                            .take()
                            .map(|e| e.to_string())
                            .unwrap_or_default(),
                    });
                }
            }
        }
    }
}
