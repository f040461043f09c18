//! Canvas state service.

mod canvas;

pub use canvas::CanvasState;
