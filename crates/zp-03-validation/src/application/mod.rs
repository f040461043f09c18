//! Validator service.

mod validator;

pub use validator::Validator;
