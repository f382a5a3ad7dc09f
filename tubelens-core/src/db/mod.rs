//! Database layer for tubelens
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository operations for video metrics and channel stats
//! - Checkpoint tracking so unchanged exports are not re-imported

pub mod repo;
pub mod schema;

pub use repo::{Database, ImportCheckpoint};
