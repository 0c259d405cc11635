//! Core logic for the shoplist shopping list manager.
//! This crate is the single source of truth for item invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::item::{normalize_item_name, Item, ItemId, ItemValidationError, NewItem};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::list_controller::{
    ControllerError, ControllerResult, ListController, ListSummary, Snapshot,
};
pub use service::store_worker::{
    spawn_store_worker, Completion, StoreError, StoreHandle, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
