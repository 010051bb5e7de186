/// Expired booking cleanup
///
/// A booking is expired once its end date (`booking_date + duration_days`)
/// lies strictly before the reference instant. The cleanup loads every
/// booking, filters the expired ones, logs and deletes them.
///
/// Used by the worker's daily schedule and by the admin endpoint
/// `POST /api/bookings/cleanup-expired`.
///
/// # Example
///
/// ```no_run
/// use carbooking_shared::cleanup::cleanup_expired_bookings;
/// use chrono::Utc;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let deleted = cleanup_expired_bookings(&pool, Utc::now()).await?;
/// println!("Removed {} expired bookings", deleted);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::booking::period::format_display;
use crate::models::booking::Booking;

/// Returns the bookings that ended strictly before `now`
pub fn select_expired(bookings: &[Booking], now: DateTime<Utc>) -> Vec<&Booking> {
    bookings
        .iter()
        .filter(|booking| booking.is_expired(now))
        .collect()
}

/// Deletes every booking that ended before `now`
///
/// Returns the number of deleted bookings.
pub async fn cleanup_expired_bookings(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    info!(now = %now, "Starting cleanup of expired bookings");

    let bookings = Booking::find_all(pool).await?;
    let expired = select_expired(&bookings, now);

    for booking in &expired {
        info!(
            booking_id = booking.id,
            car = %booking.car_registration_number,
            user = %booking.username,
            end_date = %format_display(booking.end_date()),
            "Deleting expired booking"
        );
    }

    let ids: Vec<i64> = expired.iter().map(|booking| booking.id).collect();
    let deleted = Booking::delete_many(pool, &ids).await?;

    info!(deleted, scanned = bookings.len(), "Expired booking cleanup finished");

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(id: i64, start: DateTime<Utc>, days: i32) -> Booking {
        Booking {
            id,
            car_id: 1,
            car_registration_number: "SED-001".to_string(),
            user_id: 2,
            username: "john".to_string(),
            booking_date: start,
            duration_days: days,
            created_at: start,
        }
    }

    #[test]
    fn test_select_expired() {
        let now = Utc::now();
        let bookings = vec![
            // Ended four days ago
            booking(1, now - Duration::days(10), 6),
            // Still running
            booking(2, now - Duration::days(1), 3),
            // In the future
            booking(3, now + Duration::days(5), 2),
            // Ended one second ago
            booking(4, now - Duration::days(2) - Duration::seconds(1), 2),
        ];

        let ids: Vec<i64> = select_expired(&bookings, now).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_booking_ending_now_is_kept() {
        let now = Utc::now();
        let bookings = vec![booking(1, now - Duration::days(2), 2)];

        assert!(select_expired(&bookings, now).is_empty());
    }

    #[test]
    fn test_select_expired_empty() {
        assert!(select_expired(&[], Utc::now()).is_empty());
    }
}
