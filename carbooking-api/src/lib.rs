//! # Car Booking API Server Library
//!
//! HTTP layer of the car booking backend. Business rules live in
//! `carbooking-shared`; this crate maps them onto routes.
//!
//! ## Modules
//!
//! - `app`: Application state, router and JWT layer
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
