use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisavisError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("session connect failed after {retries} retries: {last_error}")]
    ConnectExhausted { retries: u32, last_error: String },
    #[error("session already active")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("session error: {0}")]
    Session(String),
}

/// A single transient failure reported by the vendor SDK.
///
/// Connect-time instances are absorbed by the retry loop until its budget
/// runs out; only then does the terminal `ConnectExhausted` cross the
/// component boundary.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SdkError(pub String);

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
