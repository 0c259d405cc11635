//! Core use-case services.
//!
//! # Responsibility
//! - Run store I/O on a background worker.
//! - Keep the presentation layer decoupled from storage details.

pub mod list_controller;
pub mod store_worker;
