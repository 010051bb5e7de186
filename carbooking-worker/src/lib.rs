//! # Car Booking Worker Library
//!
//! Background process that deletes expired bookings on a cron schedule.
//!
//! ## Modules
//!
//! - `config`: Worker configuration from environment variables
//! - `scheduler`: Cleanup job registration on `tokio-cron-scheduler`

pub mod config;
pub mod scheduler;
