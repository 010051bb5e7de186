/// Booking model and database operations
///
/// Every read joins the car registration number and the owner's username so
/// callers can render a booking without extra lookups.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bookings (
///     id BIGSERIAL PRIMARY KEY,
///     car_id BIGINT NOT NULL REFERENCES cars(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     booking_date TIMESTAMPTZ NOT NULL,
///     duration_days INTEGER NOT NULL CHECK (duration_days > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A booking covers `[booking_date, booking_date + duration_days days]`. In SQL
/// the end is `booking_date + make_interval(days => duration_days)`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::booking::period::BookingPeriod;

/// Booking joined with its car registration and owner username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    /// Unique booking ID
    pub id: i64,

    pub car_id: i64,
    pub car_registration_number: String,

    pub user_id: i64,
    pub username: String,

    /// Start of the rental
    pub booking_date: DateTime<Utc>,

    /// Rental length in days (at least 1)
    pub duration_days: i32,

    pub created_at: DateTime<Utc>,
}

/// Row values for inserting or replacing a booking
#[derive(Debug, Clone, Copy)]
pub struct BookingRow {
    pub car_id: i64,
    pub user_id: i64,
    pub period: BookingPeriod,
}

const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.car_id, c.registration_number AS car_registration_number,
           b.user_id, u.username, b.booking_date, b.duration_days, b.created_at
    FROM bookings b
    JOIN cars c ON c.id = b.car_id
    JOIN users u ON u.id = b.user_id
"#;

impl Booking {
    /// End of the rental (`booking_date + duration_days`)
    pub fn end_date(&self) -> DateTime<Utc> {
        self.booking_date + Duration::days(i64::from(self.duration_days))
    }

    /// Whether the booking ended strictly before `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_date() < now
    }

    /// Inserts a booking and returns it with joined fields
    ///
    /// Runs on a connection so it can share the transaction holding the car
    /// lock.
    pub async fn insert(
        conn: &mut sqlx::PgConnection,
        row: BookingRow,
    ) -> Result<Self, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (car_id, user_id, booking_date, duration_days)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(row.car_id)
        .bind(row.user_id)
        .bind(row.period.start())
        .bind(row.period.days())
        .fetch_one(&mut *conn)
        .await?;

        Self::fetch_by_id(conn, id).await
    }

    /// Replaces car, start and duration of an existing booking
    pub async fn replace(
        conn: &mut sqlx::PgConnection,
        id: i64,
        car_id: i64,
        period: BookingPeriod,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET car_id = $2, booking_date = $3, duration_days = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(car_id)
        .bind(period.start())
        .bind(period.days())
        .execute(&mut *conn)
        .await?;

        Self::fetch_by_id(conn, id).await
    }

    async fn fetch_by_id(conn: &mut sqlx::PgConnection, id: i64) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!("{BOOKING_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Finds a booking by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let booking = sqlx::query_as::<_, Booking>(&format!("{BOOKING_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(booking)
    }

    /// Lists every booking, earliest start first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "{BOOKING_SELECT} ORDER BY b.booking_date, b.id"
        ))
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings owned by a user, earliest start first
    pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "{BOOKING_SELECT} WHERE b.user_id = $1 ORDER BY b.booking_date, b.id"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings owned by the user with the given username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "{BOOKING_SELECT} WHERE u.username = $1 ORDER BY b.booking_date, b.id"
        ))
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings of a car, earliest start first
    pub async fn find_by_car(pool: &PgPool, car_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "{BOOKING_SELECT} WHERE b.car_id = $1 ORDER BY b.booking_date, b.id"
        ))
        .bind(car_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings whose interval overlaps `[start, end]`
    pub async fn find_in_range(
        pool: &PgPool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"{BOOKING_SELECT}
            WHERE b.booking_date <= $2
              AND b.booking_date + make_interval(days => b.duration_days) >= $1
            ORDER BY b.booking_date, b.id"#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings on a car that overlap `period`
    ///
    /// `exclude` skips one booking, used when re-validating a booking that is
    /// being updated.
    pub async fn find_conflicting<'e, E>(
        executor: E,
        car_id: i64,
        period: &BookingPeriod,
        exclude: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"{BOOKING_SELECT}
            WHERE b.car_id = $1
              AND ($4::BIGINT IS NULL OR b.id <> $4)
              AND b.booking_date <= $3
              AND b.booking_date + make_interval(days => b.duration_days) >= $2
            ORDER BY b.booking_date, b.id"#
        ))
        .bind(car_id)
        .bind(period.start())
        .bind(period.end())
        .bind(exclude)
        .fetch_all(executor)
        .await?;

        Ok(bookings)
    }

    /// Lists bookings on a car that have not ended at `now`, earliest first
    pub async fn find_active_for_car<'e, E>(
        executor: E,
        car_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"{BOOKING_SELECT}
            WHERE b.car_id = $1
              AND b.booking_date + make_interval(days => b.duration_days) >= $2
            ORDER BY b.booking_date, b.id"#
        ))
        .bind(car_id)
        .bind(now)
        .fetch_all(executor)
        .await?;

        Ok(bookings)
    }

    /// Deletes a booking by ID
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes several bookings at once, returning how many rows went away
    pub async fn delete_many(pool: &PgPool, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM bookings WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking(start: DateTime<Utc>, days: i32) -> Booking {
        Booking {
            id: 1,
            car_id: 1,
            car_registration_number: "SUV-001".to_string(),
            user_id: 2,
            username: "john".to_string(),
            booking_date: start,
            duration_days: days,
            created_at: start,
        }
    }

    #[test]
    fn test_end_date() {
        let start = Utc.with_ymd_and_hms(2030, 2, 27, 8, 30, 0).unwrap();
        let b = booking(start, 3);
        assert_eq!(b.end_date(), Utc.with_ymd_and_hms(2030, 3, 2, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_is_expired_is_strict() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let b = booking(start, 2);

        assert!(!b.is_expired(b.end_date()));
        assert!(b.is_expired(b.end_date() + Duration::seconds(1)));
        assert!(!b.is_expired(start));
    }

    #[test]
    fn test_serialization_fields() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        let json = serde_json::to_value(booking(start, 2)).unwrap();

        assert_eq!(json["car_registration_number"], "SUV-001");
        assert_eq!(json["username"], "john");
        assert_eq!(json["duration_days"], 2);
        assert_eq!(json["booking_date"], "2030-01-01T10:00:00Z");
    }
}
