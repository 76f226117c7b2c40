use crate::storage::StorageError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Input field named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
    Latitude,
    Longitude,
    Pace,
    Speed,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Elevation => "elevation",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Pace => "pace",
            Self::Speed => "speed",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// A required field is empty or not a finite number.
    #[error("{field} must be a number, got {raw:?}")]
    Parse { field: Field, raw: String },

    /// A field is outside its accepted range (non-positive input, or a
    /// derived pace or speed that overflowed).
    #[error("{field} out of range, got {value}")]
    Range { field: Field, value: f64 },

    #[error("unknown workout type {0:?} (expected running or cycling)")]
    UnknownKind(String),

    #[error("no workout with id {0}")]
    NotFound(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("encoding workouts: {0}")]
    Encode(#[from] serde_json::Error),

    /// JSON has no representation for NaN or infinity.
    #[error("workout {id} has a non-finite {field}")]
    NonFinite { id: String, field: Field },
}

impl Error {
    /// Validation failures reject a submission without side effects.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Range { .. } | Self::UnknownKind(_)
        )
    }
}
