/// Current user endpoint

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use carbooking_shared::{
    auth::middleware::AuthContext,
    models::user::{User, UserProfile},
};

/// `GET /api/user/me`
///
/// Returns `{id, username, email, roles}` for the token's subject. Roles are
/// read from the database, so they reflect grants made after login.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with id: {}", auth.user_id)))?;

    Ok(Json(user.profile(&state.db).await?))
}
