use chrono::{DateTime, Local};
use tether_types::Error;

pub(crate) const OOPS: &str = "Oops...";
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";
pub(crate) const UNEXPECTED_RESPONSE: &str = "Unexpected response from the server!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Success,
    Error,
}

/// toast shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Notification {
    pub level: Level,
    pub title: String,
    pub text: String,
    pub at: DateTime<Local>,
}

impl Notification {
    pub(crate) fn success<T: Into<String>, U: Into<String>>(title: T, text: U) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            text: text.into(),
            at: Local::now(),
        }
    }

    pub(crate) fn error<T: Into<String>>(text: T) -> Self {
        Self {
            level: Level::Error,
            title: OOPS.to_owned(),
            text: text.into(),
            at: Local::now(),
        }
    }

    /// raw server text for transport failures, a fixed notice for bad shapes.
    pub(crate) fn from_error(err: &Error) -> Self {
        match err {
            Error::TransportFailure { message, .. } if message.trim().is_empty() => Self::error(UNKNOWN_ERROR),
            Error::TransportFailure { message, .. } => Self::error(message.as_str()),
            Error::ShapeMismatch(_) => Self::error(UNEXPECTED_RESPONSE),
            other => Self::error(other.to_string()),
        }
    }

    pub(crate) fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, UNEXPECTED_RESPONSE, UNKNOWN_ERROR};
    use tether_types::Error;

    #[test]
    fn empty_server_text_falls_back() {
        let err = Error::TransportFailure {
            status: None,
            message: " ".to_string(),
        };
        assert_eq!(Notification::from_error(&err).text, UNKNOWN_ERROR);
    }

    #[test]
    fn server_text_is_shown_raw() {
        let err = Error::TransportFailure {
            status: Some(403),
            message: "CSRF verification failed.".to_string(),
        };
        let note = Notification::from_error(&err);
        assert!(note.is_error());
        assert_eq!(note.text, "CSRF verification failed.");
    }

    #[test]
    fn shape_mismatch_is_generic() {
        let note = Notification::from_error(&Error::ShapeMismatch("missing token".to_string()));
        assert_eq!(note.text, UNEXPECTED_RESPONSE);
    }
}
