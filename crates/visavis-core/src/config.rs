use serde::{Deserialize, Serialize};

use crate::errors::VisavisError;

/// Credentials for one vendor SDK session.
///
/// Hosts obtain these fully formed from their booking backend; the shell
/// never mints or refreshes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCredentials {
    pub api_key: String,
    pub session_id: String,
    pub token: String,
}

impl SessionCredentials {
    pub fn new(
        api_key: impl Into<String>,
        session_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            session_id: session_id.into(),
            token: token.into(),
        }
    }

    /// Parse credentials from the JSON payload a booking backend hands out.
    pub fn from_json(payload: &str) -> Result<Self, VisavisError> {
        serde_json::from_str(payload)
            .map_err(|e| VisavisError::InvalidCredentials(format!("bad payload: {e}")))
    }

    /// Refuse incomplete credentials before any SDK call is made.
    pub fn validate(&self) -> Result<(), VisavisError> {
        for (field, value) in [
            ("api_key", &self.api_key),
            ("session_id", &self.session_id),
            ("token", &self.token),
        ] {
            if value.is_empty() {
                return Err(VisavisError::InvalidCredentials(format!("missing {field}")));
            }
        }
        Ok(())
    }
}

/// Local media options, fixed at construction time for the lifetime of the
/// owning [`SessionManager`](crate::session::SessionManager).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaOptions {
    #[serde(default = "default_true")]
    pub publish_audio: bool,
    #[serde(default = "default_true")]
    pub publish_video: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            publish_audio: true,
            publish_video: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_credentials_validate() {
        let creds = SessionCredentials::new("key", "session", "token");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn empty_field_fails_validation_naming_the_field() {
        let creds = SessionCredentials::new("key", "", "token");
        match creds.validate() {
            Err(VisavisError::InvalidCredentials(msg)) => {
                assert!(msg.contains("session_id"), "unexpected message: {msg}");
            }
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
    }

    #[test]
    fn credentials_round_trip_json() {
        let creds = SessionCredentials::new("key", "session", "token");
        let json = serde_json::to_string(&creds).unwrap();
        assert_eq!(SessionCredentials::from_json(&json).unwrap(), creds);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(SessionCredentials::from_json("not json").is_err());
        assert!(SessionCredentials::from_json(r#"{"api_key":"k"}"#).is_err());
    }

    #[test]
    fn media_options_default_publishes_both() {
        let options = MediaOptions::default();
        assert!(options.publish_audio);
        assert!(options.publish_video);
    }

    #[test]
    fn media_options_partial_json_uses_defaults() {
        let options: MediaOptions = serde_json::from_str(r#"{"publish_video":false}"#).unwrap();
        assert!(options.publish_audio);
        assert!(!options.publish_video);
    }
}
