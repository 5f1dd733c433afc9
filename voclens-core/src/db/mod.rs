//! Database layer for voclens
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - JSON columns for tag-name and tag-id lists

pub mod repo;
pub mod schema;

pub use repo::Database;
