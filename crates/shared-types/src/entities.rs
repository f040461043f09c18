//! # Core Domain Entities
//!
//! Pixels, placement batches, canvas cells and relay connection records.
//!
//! ## Clusters
//!
//! - **Painting**: `Pixel`, `PlacementBatch`
//! - **Canvas**: `CellCoord`, `CellPaint`, `CellChange`
//! - **Networking**: `RelayStatus`, `RelayRecord`

use serde::{Deserialize, Serialize};

use crate::event::EventId;

/// Amount in millisatoshis.
pub type Millisats = u64;

/// Unix time in seconds.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER A: PAINTING
// =============================================================================

/// A single colored point as carried on the wire.
///
/// Coordinates are signed so that out-of-range values survive decoding and
/// are rejected by validation instead of the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub x: i64,
    pub y: i64,
    /// Expected form `#rrggbb`. Not checked here.
    pub color: String,
}

impl Pixel {
    pub fn new(x: i64, y: i64, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color: color.into(),
        }
    }
}

/// One user submission: pixels plus the amount paid for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBatch {
    pub pixels: Vec<Pixel>,
    /// Declared total in millisatoshis.
    pub amount: Millisats,
    pub message: Option<String>,
    pub url: Option<String>,
    /// Hex public key of the painter, set once the event is signed.
    pub author: Option<String>,
    /// Creation time of the carrying event.
    pub timestamp: Option<Timestamp>,
}

impl PlacementBatch {
    pub fn new(pixels: Vec<Pixel>, amount: Millisats) -> Self {
        Self {
            pixels,
            amount,
            message: None,
            url: None,
            author: None,
            timestamp: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

// =============================================================================
// CLUSTER B: CANVAS
// =============================================================================

/// In-bounds cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Converts wire coordinates, returning `None` when outside the world.
    pub fn from_pixel(pixel: &Pixel, world_size: u32) -> Option<Self> {
        let x = u32::try_from(pixel.x).ok()?;
        let y = u32::try_from(pixel.y).ok()?;
        (x < world_size && y < world_size).then_some(Self { x, y })
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The paint currently occupying a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPaint {
    pub color: String,
    pub event_id: EventId,
    pub author: String,
    pub timestamp: Timestamp,
    /// `true` once the placement passed validation with a settled payment.
    /// Local submissions awaiting their receipt are painted with `false`.
    pub valid: bool,
}

/// Notification emitted whenever a cell's visible paint changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellChange {
    Painted { coord: CellCoord, paint: CellPaint },
    Cleared { coord: CellCoord },
}

impl CellChange {
    pub fn coord(&self) -> CellCoord {
        match self {
            CellChange::Painted { coord, .. } | CellChange::Cleared { coord } => *coord,
        }
    }
}

// =============================================================================
// CLUSTER C: NETWORKING
// =============================================================================

/// Connection state of a single relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Bookkeeping for one relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRecord {
    pub url: String,
    pub status: RelayStatus,
    /// Consecutive failures since the last successful connection.
    pub error_count: u32,
    pub last_connected: Option<Timestamp>,
}

impl RelayRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: RelayStatus::Disconnected,
            error_count: 0,
            last_connected: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == RelayStatus::Connected
    }
}
