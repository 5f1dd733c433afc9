//! # voclens-core
//!
//! Core library for voclens - a customer-support VOC analytics engine.
//!
//! This library provides:
//! - Domain types for conversations, tags, teams, and report schedules
//! - Database storage layer with SQLite
//! - Tag-aware time-bucketed aggregation (daily series, weekly reports)
//! - Schedule clock with deterministic re-arming
//! - Platform sync and report publishing clients
//!
//! ## Data flow
//!
//! ```text
//! platform API ──sync──► SQLite store ──snapshot──► stats aggregation
//!                                                        │
//!                narrative API ◄── report payload ◄──────┘
//!                      │
//!                      ▼
//!            document API (published report) ──link──► team chat
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use voclens_core::{Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use sync::{SyncCoordinator, SyncResult};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod platform;
pub mod report;
pub mod schedule;
pub mod stats;
pub mod sync;
pub mod tags;
pub mod types;
