//! Payload algorithms.

mod pixels;

pub use pixels::{decode_pixels, encode_pixels, MAX_DECODED_BYTES};
