/// Booking operations with conflict detection
///
/// Creating or moving a booking runs in one transaction that first locks the
/// target car row (`SELECT ... FOR UPDATE`). Concurrent requests for the same
/// car therefore serialize, and the conflict check always sees every booking
/// committed before the insert.
///
/// # Example
///
/// ```no_run
/// use carbooking_shared::booking::service::{create_booking, BookingRequest};
/// use chrono::{Duration, Utc};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let request = BookingRequest {
///     car_id: 1,
///     booking_date: Utc::now() + Duration::days(7),
///     duration_days: 3,
/// };
///
/// let booking = create_booking(&pool, &request, 2).await?;
/// println!("Booked {} until {}", booking.car_registration_number, booking.end_date());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use super::period::{BookingPeriod, PeriodError};
use crate::auth::middleware::AuthContext;
use crate::models::booking::{Booking, BookingRow};

/// Error type for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Car not found with id: {0}")]
    CarNotFound(i64),

    #[error("User not found with id: {0}")]
    UserNotFound(i64),

    #[error("Booking not found with id: {0}")]
    BookingNotFound(i64),

    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),

    #[error("Car is not available for the requested period. There are {0} conflicting booking(s).")]
    Conflict(usize),

    #[error("You can only cancel your own bookings")]
    NotOwner,

    #[error("Cannot delete car with active bookings. Please cancel all bookings first.")]
    CarHasActiveBookings,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Car, start and duration of a booking to create or update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub car_id: i64,
    pub booking_date: DateTime<Utc>,
    pub duration_days: i32,
}

impl BookingRequest {
    /// Interval covered by the request
    pub fn period(&self) -> Result<BookingPeriod, PeriodError> {
        BookingPeriod::new(self.booking_date, self.duration_days)
    }
}

/// Locks a car row for the rest of the transaction
async fn lock_car(conn: &mut sqlx::PgConnection, car_id: i64) -> Result<(), BookingError> {
    let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM cars WHERE id = $1 FOR UPDATE")
        .bind(car_id)
        .fetch_optional(conn)
        .await?;

    locked.map(|_| ()).ok_or(BookingError::CarNotFound(car_id))
}

async fn ensure_no_conflict(
    conn: &mut sqlx::PgConnection,
    car_id: i64,
    period: &BookingPeriod,
    exclude: Option<i64>,
) -> Result<(), BookingError> {
    let conflicts = Booking::find_conflicting(conn, car_id, period, exclude).await?;

    if conflicts.is_empty() {
        Ok(())
    } else {
        debug!(car_id, conflicts = conflicts.len(), "Booking request conflicts");
        Err(BookingError::Conflict(conflicts.len()))
    }
}

/// Books a car for a user
///
/// # Errors
///
/// - `CarNotFound` / `UserNotFound` when either side is missing
/// - `InvalidPeriod` when the duration is below one day
/// - `Conflict` when any booking of the car overlaps the requested period
pub async fn create_booking(
    pool: &PgPool,
    request: &BookingRequest,
    user_id: i64,
) -> Result<Booking, BookingError> {
    let mut tx = pool.begin().await?;

    lock_car(&mut tx, request.car_id).await?;

    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if !user_exists {
        return Err(BookingError::UserNotFound(user_id));
    }

    let period = request.period()?;
    ensure_no_conflict(&mut tx, request.car_id, &period, None).await?;

    let booking = Booking::insert(
        &mut tx,
        BookingRow {
            car_id: request.car_id,
            user_id,
            period,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        booking_id = booking.id,
        car = %booking.car_registration_number,
        user = %booking.username,
        "Booking created"
    );

    Ok(booking)
}

/// Moves an existing booking to a new car and/or period
///
/// The booking itself is excluded from the conflict check.
pub async fn update_booking(
    pool: &PgPool,
    booking_id: i64,
    request: &BookingRequest,
) -> Result<Booking, BookingError> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(BookingError::BookingNotFound(booking_id));
    }

    lock_car(&mut tx, request.car_id).await?;

    let period = request.period()?;
    ensure_no_conflict(&mut tx, request.car_id, &period, Some(booking_id)).await?;

    let booking = Booking::replace(&mut tx, booking_id, request.car_id, period).await?;

    tx.commit().await?;

    info!(booking_id, car = %booking.car_registration_number, "Booking updated");

    Ok(booking)
}

/// Cancels a booking on behalf of its owner or an admin
pub async fn delete_booking(
    pool: &PgPool,
    booking_id: i64,
    requester: &AuthContext,
) -> Result<(), BookingError> {
    let booking = Booking::find_by_id(pool, booking_id)
        .await?
        .ok_or(BookingError::BookingNotFound(booking_id))?;

    if !requester.can_access(booking.user_id) {
        return Err(BookingError::NotOwner);
    }

    if !Booking::delete(pool, booking_id).await? {
        return Err(BookingError::BookingNotFound(booking_id));
    }

    info!(booking_id, requested_by = %requester.username, "Booking cancelled");

    Ok(())
}

/// Deletes a car unless it still has an active booking
///
/// Takes the same row lock as [`create_booking`], so a booking cannot be
/// committed between the active-booking check and the delete. Past bookings
/// are removed with the car.
pub async fn delete_car(
    pool: &PgPool,
    car_id: i64,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    let mut tx = pool.begin().await?;

    lock_car(&mut tx, car_id).await?;

    let active = Booking::find_active_for_car(&mut *tx, car_id, now).await?;
    if !active.is_empty() {
        debug!(car_id, active = active.len(), "Car delete refused");
        return Err(BookingError::CarHasActiveBookings);
    }

    sqlx::query("DELETE FROM cars WHERE id = $1")
        .bind(car_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Checks whether a car is free for `duration_days` from `start`
pub async fn is_car_available(
    pool: &PgPool,
    car_id: i64,
    start: DateTime<Utc>,
    duration_days: i32,
) -> Result<bool, BookingError> {
    let period = BookingPeriod::new(start, duration_days)?;

    let car_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cars WHERE id = $1)")
        .bind(car_id)
        .fetch_one(pool)
        .await?;
    if !car_exists {
        return Err(BookingError::CarNotFound(car_id));
    }

    let conflicts = Booking::find_conflicting(pool, car_id, &period, None).await?;
    Ok(conflicts.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_conflict_message() {
        assert_eq!(
            BookingError::Conflict(2).to_string(),
            "Car is not available for the requested period. There are 2 conflicting booking(s)."
        );
    }

    #[test]
    fn test_not_owner_message() {
        assert_eq!(
            BookingError::NotOwner.to_string(),
            "You can only cancel your own bookings"
        );
    }

    #[test]
    fn test_request_period() {
        let request = BookingRequest {
            car_id: 1,
            booking_date: Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap(),
            duration_days: 4,
        };
        let period = request.period().unwrap();
        assert_eq!(period.end(), Utc.with_ymd_and_hms(2030, 5, 5, 9, 0, 0).unwrap());

        let invalid = BookingRequest {
            duration_days: 0,
            ..request
        };
        assert!(matches!(
            invalid.period(),
            Err(PeriodError::NonPositiveDuration(0))
        ));
    }

    #[test]
    fn test_request_deserializes_rfc3339() {
        let request: BookingRequest = serde_json::from_str(
            r#"{"car_id": 3, "booking_date": "2030-01-01T10:00:00Z", "duration_days": 2}"#,
        )
        .unwrap();

        assert_eq!(request.car_id, 3);
        assert_eq!(request.duration_days, 2);
    }
}
