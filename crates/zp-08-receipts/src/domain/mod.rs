//! Receipt correlation domain.

mod correlation;
mod errors;

pub use correlation::Correlation;
pub use errors::ReceiptError;
