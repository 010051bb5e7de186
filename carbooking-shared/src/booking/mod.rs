/// Booking rules
///
/// - [`period`]: booking intervals and the overlap test
/// - [`service`]: create, update and cancel bookings with conflict detection

pub mod period;
pub mod service;
