//! Day-bucketed totals and the dashboard / coach payloads built from them.

pub mod engine;
pub mod store;
pub mod types;

pub use store::{PgRecordStore, RecordStore};
