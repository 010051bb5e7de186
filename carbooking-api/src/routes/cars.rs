/// Car endpoints
///
/// Any authenticated user can browse the fleet and check availability;
/// fleet management (`/simple`, `/booking-info`, create, update, delete and a
/// car's booking list) is admin only.
///
/// # Endpoints
///
/// - `GET    /api/cars?type&start_date&duration` - Cars annotated for a period
/// - `GET    /api/cars/available?type&start_date&duration` - Unbooked cars
/// - `GET    /api/cars/simple?type` - Plain car list (admin)
/// - `GET    /api/cars/booking-info?type` - Cars annotated at the current time (admin)
/// - `GET    /api/cars/:id` - Car by ID
/// - `GET    /api/cars/:id/availability?start_date&duration` - Availability check
/// - `GET    /api/cars/:id/bookings` - Bookings of one car (admin)
/// - `POST   /api/cars` - Create car (admin)
/// - `PUT    /api/cars/:id` - Update car (admin)
/// - `DELETE /api/cars/:id` - Delete car (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::bookings::BookingResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use carbooking_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    booking::{
        period::BookingPeriod,
        service::{self, is_car_available},
    },
    models::{
        booking::Booking,
        car::{Car, CarType, CarView, CreateCar},
        money::Money,
        role::Role,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create/update car request
#[derive(Debug, Deserialize, Validate)]
pub struct CarRequest {
    #[validate(length(min = 1, max = 32, message = "Registration number must be between 1 and 32 characters"))]
    pub registration_number: String,

    #[serde(rename = "type")]
    pub car_type: CarType,

    /// Daily price, `"50.00"` or `50`
    pub cost_per_day: Money,

    #[validate(range(min = 1, max = 100, message = "Capacity must be between 1 and 100"))]
    pub capacity: i32,
}

impl CarRequest {
    /// Trims the registration number so length rules apply to the stored value
    fn normalized(self) -> Self {
        Self {
            registration_number: self.registration_number.trim().to_string(),
            ..self
        }
    }

    fn into_create(self) -> CreateCar {
        CreateCar {
            registration_number: self.registration_number,
            car_type: self.car_type,
            cost_per_day: self.cost_per_day,
            capacity: self.capacity,
        }
    }
}

/// Search window for period queries
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(rename = "type")]
    pub car_type: Option<CarType>,

    pub start_date: DateTime<Utc>,

    /// Rental length in days
    pub duration: i32,
}

impl PeriodQuery {
    fn period(&self) -> ApiResult<BookingPeriod> {
        BookingPeriod::new(self.start_date, self.duration)
            .map_err(|e| ApiError::invalid_field("duration", e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub car_type: Option<CarType>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: DateTime<Utc>,
    pub duration: i32,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub car_id: i64,
    pub available: bool,
}

fn car_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Car not found with id: {}", id))
}

/// Every car (optionally of one type), each marked booked if a booking
/// overlaps the requested period
pub async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<CarView>>> {
    let period = query.period()?;
    let cars = Car::list_for_period(&state.db, &period, query.car_type).await?;

    Ok(Json(cars))
}

/// Cars with no booking overlapping the requested period
pub async fn available_cars(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<CarView>>> {
    let period = query.period()?;
    let cars = Car::find_available(&state.db, &period, query.car_type).await?;

    Ok(Json(cars.iter().map(CarView::simple).collect()))
}

pub async fn list_cars_simple(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Vec<CarView>>> {
    require_role(&auth, Role::Admin)?;

    let cars = Car::list(&state.db, query.car_type).await?;

    Ok(Json(cars.iter().map(CarView::simple).collect()))
}

/// Cars annotated with their earliest active booking
pub async fn list_cars_with_booking_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Vec<CarView>>> {
    require_role(&auth, Role::Admin)?;

    let cars = Car::list_with_booking_info(&state.db, query.car_type, Utc::now()).await?;

    Ok(Json(cars))
}

pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CarView>> {
    let car = Car::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| car_not_found(id))?;

    Ok(Json(CarView::simple(&car)))
}

pub async fn car_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let available = is_car_available(&state.db, id, query.start_date, query.duration).await?;

    Ok(Json(AvailabilityResponse {
        car_id: id,
        available,
    }))
}

pub async fn car_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    require_role(&auth, Role::Admin)?;

    if Car::find_by_id(&state.db, id).await?.is_none() {
        return Err(car_not_found(id));
    }

    let bookings = Booking::find_by_car(&state.db, id).await?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// Create a car
///
/// # Errors
///
/// - `409 Conflict`: Registration number already in use
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_car(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CarRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CarView>)> {
    require_role(&auth, Role::Admin)?;

    let Json(req) = payload?;
    let req = req.normalized();
    req.validate()?;

    let car = Car::create(&state.db, req.into_create()).await?;

    tracing::info!(
        car_id = car.id,
        registration_number = %car.registration_number,
        created_by = %auth.username,
        "Car created"
    );

    Ok((StatusCode::CREATED, Json(CarView::simple(&car))))
}

pub async fn update_car(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    payload: Result<Json<CarRequest>, JsonRejection>,
) -> ApiResult<Json<CarView>> {
    require_role(&auth, Role::Admin)?;

    let Json(req) = payload?;
    let req = req.normalized();
    req.validate()?;

    let car = Car::update(&state.db, id, req.into_create())
        .await?
        .ok_or_else(|| car_not_found(id))?;

    tracing::info!(car_id = car.id, updated_by = %auth.username, "Car updated");

    Ok(Json(CarView::simple(&car)))
}

/// Delete a car
///
/// Refused while the car has any active booking; past bookings go with it.
pub async fn delete_car(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_role(&auth, Role::Admin)?;

    service::delete_car(&state.db, id, Utc::now()).await?;

    tracing::info!(car_id = id, deleted_by = %auth.username, "Car deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_request_accepts_string_and_number_prices() {
        let req: CarRequest = serde_json::from_str(
            r#"{"registration_number":"SED-100","type":"SEDAN","cost_per_day":"55.50","capacity":5}"#,
        )
        .unwrap();
        assert_eq!(req.cost_per_day.cents(), 5550);
        assert!(req.validate().is_ok());

        let req: CarRequest = serde_json::from_str(
            r#"{"registration_number":"VAN-100","type":"VAN","cost_per_day":80,"capacity":8}"#,
        )
        .unwrap();
        assert_eq!(req.cost_per_day.cents(), 8000);
    }

    #[test]
    fn test_car_request_validation() {
        let req = CarRequest {
            registration_number: String::new(),
            car_type: CarType::Suv,
            cost_per_day: Money::from_cents(100).unwrap(),
            capacity: 0,
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("registration_number"));
        assert!(fields.contains_key("capacity"));
    }

    #[test]
    fn test_registration_is_trimmed_before_validation() {
        let req = CarRequest {
            registration_number: "  SUV-100 ".to_string(),
            car_type: CarType::Suv,
            cost_per_day: Money::from_cents(7000).unwrap(),
            capacity: 5,
        }
        .normalized();
        assert!(req.validate().is_ok());
        assert_eq!(req.into_create().registration_number, "SUV-100");

        let blank = CarRequest {
            registration_number: "   ".to_string(),
            car_type: CarType::Suv,
            cost_per_day: Money::from_cents(7000).unwrap(),
            capacity: 5,
        }
        .normalized();
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("registration_number"));
    }

    #[test]
    fn test_period_query_rejects_zero_duration() {
        let query = PeriodQuery {
            car_type: None,
            start_date: Utc::now(),
            duration: 0,
        };

        match query.period() {
            Err(ApiError::ValidationError(details)) => assert_eq!(details[0].field, "duration"),
            other => panic!("unexpected result: {:?}", other.map(|p| p.days())),
        }
    }
}
