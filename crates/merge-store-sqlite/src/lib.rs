// crates/merge-store-sqlite/src/lib.rs
// ============================================================================
// Module: Merge Store SQLite Library
// Description: Public API surface for the durable session store.
// Purpose: Expose the concrete `SessionStore` implementation used by
//          `merge-cli` and the orchestrator's production wiring.
// Dependencies: merge-core, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `merge-store-sqlite` implements [`merge_core::SessionStore`] (spec §4.11)
//! over a `SQLite` database: WAL journaling, a `store_meta` schema-version
//! row, transactional reference-id allocation, and a `GROUP BY`-based
//! progress-counter recomputation rather than `+1` arithmetic.

pub mod codec;
pub mod error;
pub mod schema;
pub mod store;

pub use error::SqliteStoreError;
pub use schema::SqliteStoreConfig;
pub use store::SqliteSessionStore;
