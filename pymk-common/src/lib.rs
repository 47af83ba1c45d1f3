//! # pymk Common Library
//!
//! Shared code for the pymk ("people you may know") services including:
//! - Social store schema, row models and row helpers
//! - Configuration loading and root folder resolution
//! - Session token hashing and lookup
//! - Timestamp utilities

pub mod config;
pub mod db;
pub mod error;
pub mod session;
pub mod time;

pub use error::{Error, Result};
