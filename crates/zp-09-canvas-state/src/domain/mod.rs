//! Canvas resolution rules.

mod rules;

pub use rules::supersedes;
