//! Validation domain types.

mod errors;

pub use errors::{summarize, ValidationError, ValidationFailure};

use serde::{Deserialize, Serialize};

/// How strictly to treat timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every rule applies.
    #[default]
    Strict,
    /// Timestamp failures are dropped to tolerate clock skew between peers.
    Optimistic,
}
