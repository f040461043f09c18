//! Batch validator.

use shared_types::{CellCoord, Millisats, PlacementBatch, Pixel, Timestamp};
use zp_01_pricing::{quote, CostBreakdown};

use crate::algorithms::check_pixel;
use crate::config::ValidationConfig;
use crate::domain::{ValidationError, ValidationFailure, ValidationMode};

/// Validates batches against the current canvas.
///
/// The canvas is consulted through a lookup returning the timestamp of the
/// settled paint at a cell, if any.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Checks every rule and returns all violations.
    ///
    /// `now` is the local clock. Prices are computed as of the batch
    /// timestamp, falling back to `now` when the batch carries none. A
    /// timestamp beyond the skew tolerance is priced at the edge of that
    /// tolerance, so post-dating a batch never makes a repaint cheaper.
    pub fn validate<F>(
        &self,
        batch: &PlacementBatch,
        mode: ValidationMode,
        now: Timestamp,
        lookup: F,
    ) -> Result<(), ValidationFailure>
    where
        F: Fn(CellCoord) -> Option<Timestamp>,
    {
        if batch.pixels.is_empty() {
            return Err(ValidationFailure::new(vec![ValidationError::EmptyBatch]));
        }

        let mut errors: Vec<ValidationError> = batch
            .pixels
            .iter()
            .enumerate()
            .flat_map(|(index, pixel)| check_pixel(index, pixel, self.config.world_size))
            .collect();
        let pixels_ok = errors.is_empty();

        if let Some(timestamp) = batch.timestamp {
            if timestamp > now.saturating_add(self.config.max_future_skew_secs) {
                errors.push(ValidationError::InvalidTimestamp {
                    timestamp,
                    now,
                    tolerance: self.config.max_future_skew_secs,
                });
            }
        }

        if pixels_ok {
            let as_of = batch
                .timestamp
                .unwrap_or(now)
                .min(now.saturating_add(self.config.max_future_skew_secs));
            let expected = self.expected_amount(&batch.pixels, as_of, &lookup);
            if batch.amount != expected {
                errors.push(ValidationError::AmountMismatch {
                    declared: batch.amount,
                    expected,
                });
            }
        }

        if mode == ValidationMode::Optimistic {
            errors.retain(|e| !e.is_timestamp());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(errors))
        }
    }

    /// Priced total of painting `pixels` at `as_of`. Out-of-world pixels
    /// are priced as empty cells.
    pub fn expected_amount<F>(&self, pixels: &[Pixel], as_of: Timestamp, lookup: F) -> Millisats
    where
        F: Fn(CellCoord) -> Option<Timestamp>,
    {
        self.breakdown(pixels, as_of, lookup).total
    }

    /// Itemized price of painting `pixels` at `as_of`.
    pub fn breakdown<F>(&self, pixels: &[Pixel], as_of: Timestamp, lookup: F) -> CostBreakdown
    where
        F: Fn(CellCoord) -> Option<Timestamp>,
    {
        let world_size = self.config.world_size;
        quote(
            pixels
                .iter()
                .map(|p| CellCoord::from_pixel(p, world_size).and_then(&lookup)),
            as_of,
        )
    }
}
