//! Shopping list domain model.
//!
//! # Responsibility
//! - Define the canonical item record shared by storage, controller and UI.
//!
//! # Invariants
//! - Every persisted item is identified by a store-generated `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod item;
