//! Per-pixel rules.

mod rules;

pub use rules::{check_pixel, is_valid_color};
