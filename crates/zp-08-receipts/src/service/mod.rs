//! Receipt correlation service.

mod correlator;

pub use correlator::ReceiptCorrelator;
