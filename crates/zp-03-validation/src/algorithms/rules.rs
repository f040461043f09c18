use shared_types::{CellCoord, Pixel};

use crate::domain::ValidationError;

/// `#` followed by exactly six hex digits, either case.
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Coordinate and color violations of one pixel, in that order.
pub fn check_pixel(index: usize, pixel: &Pixel, world_size: u32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if CellCoord::from_pixel(pixel, world_size).is_none() {
        errors.push(ValidationError::InvalidCoordinates {
            index,
            x: pixel.x,
            y: pixel.y,
            world_size,
        });
    }
    if !is_valid_color(&pixel.color) {
        errors.push(ValidationError::InvalidColor {
            index,
            color: pixel.color.clone(),
        });
    }
    errors
}
