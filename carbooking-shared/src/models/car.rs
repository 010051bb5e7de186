/// Car model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE car_type AS ENUM ('SEDAN', 'VAN', 'SUV');
///
/// CREATE TABLE cars (
///     id BIGSERIAL PRIMARY KEY,
///     registration_number VARCHAR(32) NOT NULL UNIQUE,
///     car_type car_type NOT NULL,
///     cost_per_day_cents BIGINT NOT NULL CHECK (cost_per_day_cents >= 0),
///     capacity INTEGER NOT NULL CHECK (capacity > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use carbooking_shared::models::car::{Car, CarType, CreateCar};
/// use carbooking_shared::models::money::Money;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let car = Car::create(&pool, CreateCar {
///     registration_number: "SED-001".to_string(),
///     car_type: CarType::Sedan,
///     cost_per_day: Money::from_cents(5000)?,
///     capacity: 4,
/// }).await?;
///
/// let sedans = Car::list(&pool, Some(CarType::Sedan)).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use super::booking::Booking;
use super::money::Money;
use crate::booking::period::{format_display, BookingPeriod};

/// Vehicle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "car_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CarType {
    Sedan,
    Van,
    Suv,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Sedan => "SEDAN",
            CarType::Van => "VAN",
            CarType::Suv => "SUV",
        }
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SEDAN" => Ok(CarType::Sedan),
            "VAN" => Ok(CarType::Van),
            "SUV" => Ok(CarType::Suv),
            other => Err(format!("Unknown car type: {}", other)),
        }
    }
}

/// Car in the rental fleet
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Car {
    /// Unique car ID
    pub id: i64,

    /// Registration plate, unique across the fleet
    pub registration_number: String,

    /// Vehicle category
    #[serde(rename = "type")]
    pub car_type: CarType,

    /// Daily rental price
    #[sqlx(rename = "cost_per_day_cents")]
    pub cost_per_day: Money,

    /// Number of seats
    pub capacity: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a car (also used for full updates)
#[derive(Debug, Clone)]
pub struct CreateCar {
    pub registration_number: String,
    pub car_type: CarType,
    pub cost_per_day: Money,
    pub capacity: i32,
}

/// Car together with the booking that currently occupies it, if any
///
/// `booking_start_date` and `booking_end_date` are rendered as
/// `YYYY-MM-DD HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarView {
    pub id: i64,
    pub registration_number: String,
    #[serde(rename = "type")]
    pub car_type: CarType,
    pub cost_per_day: Money,
    pub capacity: i32,
    pub is_booked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_booking_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_by_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_by_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_end_date: Option<String>,
}

impl CarView {
    /// View without booking information
    pub fn simple(car: &Car) -> Self {
        Self {
            id: car.id,
            registration_number: car.registration_number.clone(),
            car_type: car.car_type,
            cost_per_day: car.cost_per_day,
            capacity: car.capacity,
            is_booked: false,
            current_booking_id: None,
            booked_by_user_id: None,
            booked_by_username: None,
            booking_start_date: None,
            booking_end_date: None,
        }
    }

    /// View annotated with the given occupying booking
    pub fn with_booking(car: &Car, booking: Option<&Booking>) -> Self {
        let mut view = Self::simple(car);

        if let Some(booking) = booking {
            view.is_booked = true;
            view.current_booking_id = Some(booking.id);
            view.booked_by_user_id = Some(booking.user_id);
            view.booked_by_username = Some(booking.username.clone());
            view.booking_start_date = Some(format_display(booking.booking_date));
            view.booking_end_date = Some(format_display(booking.end_date()));
        }

        view
    }
}

const CAR_COLUMNS: &str =
    "id, registration_number, car_type, cost_per_day_cents, capacity, created_at, updated_at";

impl Car {
    /// Creates a new car
    ///
    /// # Errors
    ///
    /// Returns a database error on duplicate registration number
    /// (constraint `cars_registration_number_key`).
    pub async fn create(pool: &PgPool, data: CreateCar) -> Result<Self, sqlx::Error> {
        let car = sqlx::query_as::<_, Car>(&format!(
            r#"
            INSERT INTO cars (registration_number, car_type, cost_per_day_cents, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING {CAR_COLUMNS}
            "#
        ))
        .bind(data.registration_number)
        .bind(data.car_type)
        .bind(data.cost_per_day)
        .bind(data.capacity)
        .fetch_one(pool)
        .await?;

        Ok(car)
    }

    /// Finds a car by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let car = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(car)
    }

    /// Lists cars ordered by ID, optionally filtered by type
    pub async fn list(pool: &PgPool, car_type: Option<CarType>) -> Result<Vec<Self>, sqlx::Error> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            r#"
            SELECT {CAR_COLUMNS}
            FROM cars
            WHERE ($1::car_type IS NULL OR car_type = $1)
            ORDER BY id
            "#
        ))
        .bind(car_type)
        .fetch_all(pool)
        .await?;

        Ok(cars)
    }

    /// Replaces every mutable field of a car
    ///
    /// Returns None if the car doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: CreateCar,
    ) -> Result<Option<Self>, sqlx::Error> {
        let car = sqlx::query_as::<_, Car>(&format!(
            r#"
            UPDATE cars
            SET registration_number = $2,
                car_type = $3,
                cost_per_day_cents = $4,
                capacity = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CAR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.registration_number)
        .bind(data.car_type)
        .bind(data.cost_per_day)
        .bind(data.capacity)
        .fetch_optional(pool)
        .await?;

        Ok(car)
    }

    /// Deletes a car by ID
    ///
    /// Bookings of the car are removed by cascade; callers check for active
    /// bookings first.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists cars with no booking overlapping `period`
    pub async fn find_available(
        pool: &PgPool,
        period: &BookingPeriod,
        car_type: Option<CarType>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            r#"
            SELECT {CAR_COLUMNS}
            FROM cars c
            WHERE ($3::car_type IS NULL OR c.car_type = $3)
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.car_id = c.id
                    AND b.booking_date <= $2
                    AND b.booking_date + make_interval(days => b.duration_days) >= $1
              )
            ORDER BY c.id
            "#
        ))
        .bind(period.start())
        .bind(period.end())
        .bind(car_type)
        .fetch_all(pool)
        .await?;

        Ok(cars)
    }

    /// Lists cars annotated with the first booking conflicting with `period`
    pub async fn list_for_period(
        pool: &PgPool,
        period: &BookingPeriod,
        car_type: Option<CarType>,
    ) -> Result<Vec<CarView>, sqlx::Error> {
        let cars = Car::list(pool, car_type).await?;
        let mut views = Vec::with_capacity(cars.len());

        for car in &cars {
            let conflicts = Booking::find_conflicting(pool, car.id, period, None).await?;
            views.push(CarView::with_booking(car, conflicts.first()));
        }

        Ok(views)
    }

    /// Lists cars annotated with their earliest booking still active at `now`
    pub async fn list_with_booking_info(
        pool: &PgPool,
        car_type: Option<CarType>,
        now: DateTime<Utc>,
    ) -> Result<Vec<CarView>, sqlx::Error> {
        let cars = Car::list(pool, car_type).await?;
        let mut views = Vec::with_capacity(cars.len());

        for car in &cars {
            let active = Booking::find_active_for_car(pool, car.id, now).await?;
            views.push(CarView::with_booking(car, active.first()));
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_car() -> Car {
        Car {
            id: 1,
            registration_number: "SED-001".to_string(),
            car_type: CarType::Sedan,
            cost_per_day: Money::from_cents(5000).unwrap(),
            capacity: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_car_type_parsing() {
        assert_eq!("SUV".parse::<CarType>().unwrap(), CarType::Suv);
        assert_eq!("van".parse::<CarType>().unwrap(), CarType::Van);
        assert!("truck".parse::<CarType>().is_err());
    }

    #[test]
    fn test_car_type_serde() {
        assert_eq!(serde_json::to_string(&CarType::Sedan).unwrap(), r#""SEDAN""#);
        let parsed: CarType = serde_json::from_str(r#""VAN""#).unwrap();
        assert_eq!(parsed, CarType::Van);
    }

    #[test]
    fn test_simple_view_is_not_booked() {
        let view = CarView::simple(&sample_car());

        assert!(!view.is_booked);
        assert!(view.current_booking_id.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "SEDAN");
        assert_eq!(json["cost_per_day"], "50.00");
        assert!(json.get("booked_by_username").is_none());
    }

    #[test]
    fn test_view_with_booking() {
        let car = sample_car();
        let booking = Booking {
            id: 9,
            car_id: car.id,
            user_id: 2,
            car_registration_number: car.registration_number.clone(),
            username: "john".to_string(),
            booking_date: Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap(),
            duration_days: 3,
            created_at: Utc::now(),
        };

        let view = CarView::with_booking(&car, Some(&booking));

        assert!(view.is_booked);
        assert_eq!(view.current_booking_id, Some(9));
        assert_eq!(view.booked_by_user_id, Some(2));
        assert_eq!(view.booked_by_username.as_deref(), Some("john"));
        assert_eq!(view.booking_start_date.as_deref(), Some("2030-01-01 10:00"));
        assert_eq!(view.booking_end_date.as_deref(), Some("2030-01-04 10:00"));
    }

    #[test]
    fn test_view_without_booking() {
        let view = CarView::with_booking(&sample_car(), None);
        assert_eq!(view, CarView::simple(&sample_car()));
    }
}
