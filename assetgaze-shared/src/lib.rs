//! # Assetgaze Shared Library
//!
//! This crate contains the domain types, persistence layer, and business logic
//! used by the Assetgaze API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `repository`: Storage traits with PostgreSQL and in-memory implementations
//! - `auth`: Password hashing, JWT issuance/validation, and account authorization
//! - `services`: Authentication, transaction, account, and broker services
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod repository;
pub mod services;

/// Current version of the Assetgaze shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
