//! # Event Handlers
//!
//! The pipeline that owns canvas state and the dispatcher feeding it.

pub mod dispatcher;
pub mod pipeline;

pub use dispatcher::Dispatcher;
pub use pipeline::{origin_label, EventPipeline, IngestOutcome};
