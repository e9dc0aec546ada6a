//! Durable local storage for schedule entries.
//!
//! One directory per category under the store root, one JSON file per
//! record, keyed by the record's normalized key. The layout is versioned;
//! opening the store creates any missing category directories and never
//! migrates existing data destructively.
//!
//! Per-category sync stamps live alongside the keyspaces and record when
//! each category was last reconciled.

pub mod error;
pub mod events;
pub mod stamp;

pub use error::StoreError;
pub use events::EventStore;
pub use stamp::SyncStamp;
