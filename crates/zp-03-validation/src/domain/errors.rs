//! Validation failures.

use shared_types::{Millisats, Timestamp};
use thiserror::Error;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Batch has no pixels.
    #[error("placement contains no pixels")]
    EmptyBatch,

    /// Pixel lies outside the world.
    #[error("pixel {index} at ({x}, {y}) is outside 0..{world_size}")]
    InvalidCoordinates {
        index: usize,
        x: i64,
        y: i64,
        world_size: u32,
    },

    /// Pixel color is not `#rrggbb`.
    #[error("pixel {index} has invalid color {color:?}")]
    InvalidColor { index: usize, color: String },

    /// Batch is dated too far into the future.
    #[error("timestamp {timestamp} is more than {tolerance}s ahead of {now}")]
    InvalidTimestamp {
        timestamp: Timestamp,
        now: Timestamp,
        tolerance: u64,
    },

    /// Declared amount differs from the priced total.
    #[error("declared {declared} msats but the pixels cost {expected} msats")]
    AmountMismatch {
        declared: Millisats,
        expected: Millisats,
    },
}

impl ValidationError {
    pub fn is_timestamp(&self) -> bool {
        matches!(self, ValidationError::InvalidTimestamp { .. })
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::EmptyBatch => "empty",
            ValidationError::InvalidCoordinates { .. } => "coordinates",
            ValidationError::InvalidColor { .. } => "color",
            ValidationError::InvalidTimestamp { .. } => "timestamp",
            ValidationError::AmountMismatch { .. } => "amount",
        }
    }
}

/// Every violation found in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(&self.errors))]
pub struct ValidationFailure {
    pub errors: Vec<ValidationError>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Label of the first violation.
    pub fn primary_kind(&self) -> &'static str {
        self.errors.first().map(ValidationError::kind).unwrap_or("unknown")
    }
}

/// One line describing a list of violations. Long lists are elided.
pub fn summarize(errors: &[ValidationError]) -> String {
    const SHOWN: usize = 3;
    match errors.len() {
        0 => "no violations".to_string(),
        n if n <= SHOWN => errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
        n => {
            let head = errors[..SHOWN]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            format!("{head}; and {} more", n - SHOWN)
        }
    }
}
