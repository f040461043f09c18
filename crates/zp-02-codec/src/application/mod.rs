//! Event-level encoding and decoding.

mod codec;

pub use codec::PlacementCodec;
