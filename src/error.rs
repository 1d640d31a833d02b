//! Error type shared by the loaders, the request validation and the engine

use thiserror::Error;

/// Errors surfaced by catalog loading, request validation and quoting
#[derive(Debug, Error)]
pub enum Error {
    /// Required field missing, non-numeric limit, out-of-range value, ...
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A payout tier references a zone id absent from the zone list
    #[error("payout table references unknown zone C{zone_id}")]
    UnknownZone { zone_id: u32 },

    /// Zone ids must be unique across all locations
    #[error("zone id {zone_id} is used more than once")]
    DuplicateZone { zone_id: u32 },

    #[error("payout table has more than one tier at {min_speed_kmh} km/h")]
    DuplicateThreshold { min_speed_kmh: f64 },

    /// Catalog line that could not be parsed
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("calculation cancelled by caller")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
