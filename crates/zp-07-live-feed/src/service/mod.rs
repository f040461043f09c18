//! Live feed service.

mod subscriber;

pub use subscriber::LiveSubscriber;
