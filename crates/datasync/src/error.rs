use thiserror::Error;

/// Why a fetch produced no data.
///
/// Cloneable so one failure can be handed to every awaiter of a deduplicated
/// request and kept next to the cached snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{path} returned HTTP {status}")]
    Status { status: u16, path: String },
    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
