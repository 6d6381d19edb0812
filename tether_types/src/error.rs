use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Error {
    /// network unreachable, non-2xx status, or a 2xx body that is not json.
    /// `status` is `None` when no response arrived at all.
    #[error("{message}")]
    TransportFailure { status: Option<u16>, message: String },
    #[error("unexpected response from the server: {0}")]
    ShapeMismatch(String),
    #[error("an earlier submission is still in flight")]
    Busy,
    #[error("no element matches {0}")]
    MissingElement(String),
    #[error("anti-forgery token is not available")]
    MissingToken,
}

impl Error {
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
