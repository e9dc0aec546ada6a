//! Data models for festival schedule entries.
//!
//! - `RemoteEvent`: one row from the remote schedule feed
//! - `EventRecord`: the locally stored entry with sample and favorite state
//! - `Category`: the fixed set of schedule categories, one keyspace each

pub mod category;
pub mod event;

pub use category::{Category, UnknownCategory};
pub use event::{EventRecord, RemoteEvent};
