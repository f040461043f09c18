pub mod backfill;
pub mod config;
pub mod live;
pub mod settlement;
