/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and token refresh
/// - `users`: Current user profile
/// - `cars`: Fleet management and availability
/// - `bookings`: Reservations and expired-booking cleanup

pub mod auth;
pub mod bookings;
pub mod cars;
pub mod health;
pub mod users;
