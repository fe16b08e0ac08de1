//! Shift Type Maintenance Library
//!
//! This library provides the core functionality for the shift type cleanup
//! command: loading shift types and their referencing schedule entries,
//! computing a reconciliation plan (unused removal + duplicate merging),
//! and applying that plan against the database.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Database storage operations (load dataset, apply plan).
//! - `errors`: Error handling types.
//! - `models`: Core data models.
//! - `reconciler`: Pure shift type reconciliation logic.

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod models;
pub mod reconciler;
