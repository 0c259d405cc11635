//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract used by the store worker.
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Repository writes must validate items before persistence.
//! - Stale references (absent ids) are reported as "nothing changed", not
//!   as errors.

pub mod item_repo;
