//! Reconciliation of remote schedule snapshots against the local store.
//!
//! Reconciliation brings one category's local keyspace in line with the
//! latest remote rows while preserving locally-acquired state: downloaded
//! samples survive as long as their link is unchanged, and favorite flags
//! are never touched here.

pub mod reconcile;

pub use reconcile::reconcile;
