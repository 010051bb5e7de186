/// Booking endpoints
///
/// # Endpoints
///
/// - `GET    /api/bookings?start_date&end_date` - All bookings, optionally in a range (admin)
/// - `GET    /api/bookings/my-bookings` - Caller's bookings
/// - `GET    /api/bookings/:id` - Booking by ID (owner or admin)
/// - `POST   /api/bookings` - Book a car (user or admin)
/// - `PUT    /api/bookings/:id` - Change car or period (admin)
/// - `DELETE /api/bookings/:id` - Cancel (owner or admin)
/// - `POST   /api/bookings/cleanup-expired` - Delete expired bookings now (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use carbooking_shared::{
    auth::{
        authorization::{require_any_role, require_owner_or_admin, require_role},
        middleware::AuthContext,
    },
    booking::service::{self, BookingRequest},
    cleanup::cleanup_expired_bookings,
    models::{booking::Booking, role::Role},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BOOKING_ROLES: &[Role] = &[Role::User, Role::Admin];

/// Booking as returned by the API, with its computed end date
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,

    pub end_date: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        let end_date = booking.end_date();
        Self { booking, end_date }
    }
}

fn responses(bookings: Vec<Booking>) -> Vec<BookingResponse> {
    bookings.into_iter().map(BookingResponse::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub message: &'static str,
    pub deleted_bookings: u64,
}

/// Lists every booking, or only those overlapping `[start_date, end_date]`
/// when both bounds are given
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    require_role(&auth, Role::Admin)?;

    let bookings = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(ApiError::BadRequest(
                    "start_date must not be after end_date".to_string(),
                ));
            }
            Booking::find_in_range(&state.db, start, end).await?
        }
        _ => Booking::find_all(&state.db).await?,
    };

    Ok(Json(responses(bookings)))
}

pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let bookings = Booking::find_by_username(&state.db, &auth.username).await?;

    Ok(Json(responses(bookings)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = Booking::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Booking not found with id: {}", id)))?;

    require_owner_or_admin(&auth, booking.user_id)?;

    Ok(Json(booking.into()))
}

/// Book a car for the caller
///
/// ```text
/// POST /api/bookings
///
/// { "car_id": 1, "booking_date": "2030-01-01T10:00:00Z", "duration_days": 3 }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Car does not exist
/// - `409 Conflict`: The car is already booked for part of the period
/// - `422 Unprocessable Entity`: `duration_days` below 1
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    require_any_role(&auth, BOOKING_ROLES)?;

    let Json(req) = payload?;

    let booking = service::create_booking(&state.db, &req, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn update_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> ApiResult<Json<BookingResponse>> {
    require_role(&auth, Role::Admin)?;

    let Json(req) = payload?;

    let booking = service::update_booking(&state.db, id, &req).await?;

    Ok(Json(booking.into()))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_any_role(&auth, BOOKING_ROLES)?;

    service::delete_booking(&state.db, id, &auth).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Runs the expired-booking cleanup immediately
pub async fn cleanup_expired(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CleanupResponse>> {
    require_role(&auth, Role::Admin)?;

    tracing::info!(requested_by = %auth.username, "Manual cleanup of expired bookings");

    let deleted_bookings = cleanup_expired_bookings(&state.db, Utc::now()).await?;

    Ok(Json(CleanupResponse {
        message: "Cleanup completed successfully",
        deleted_bookings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_booking_response_includes_end_date() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        let booking = Booking {
            id: 1,
            car_id: 2,
            car_registration_number: "SED-001".to_string(),
            user_id: 3,
            username: "john".to_string(),
            booking_date: start,
            duration_days: 3,
            created_at: start - Duration::days(1),
        };

        let json = serde_json::to_value(BookingResponse::from(booking)).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["car_registration_number"], "SED-001");
        assert_eq!(json["booking_date"], "2030-01-01T10:00:00Z");
        assert_eq!(json["end_date"], "2030-01-04T10:00:00Z");
    }

    #[test]
    fn test_cleanup_response_shape() {
        let json = serde_json::to_value(CleanupResponse {
            message: "Cleanup completed successfully",
            deleted_bookings: 4,
        })
        .unwrap();

        assert_eq!(json["deleted_bookings"], 4);
        assert_eq!(json["message"], "Cleanup completed successfully");
    }
}
