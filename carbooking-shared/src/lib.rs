//! # Car Booking Shared Library
//!
//! Types, queries and business rules shared by the car booking API server and
//! the cleanup worker.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, roles, cars, bookings) and their queries
//! - `booking`: Booking periods, conflict detection and booking operations
//! - `cleanup`: Expired booking cleanup
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migrations
//! - `seed`: Demo users and fleet
//! - `shutdown`: Ctrl+C / SIGTERM handling for both binaries

pub mod auth;
pub mod booking;
pub mod cleanup;
pub mod db;
pub mod models;
pub mod seed;
pub mod shutdown;

/// Current version of the car booking shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
