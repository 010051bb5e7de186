/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use carbooking_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = carbooking_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use carbooking_shared::auth::middleware::authenticate;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # public
/// └── /api/
///     ├── /auth/{register,login,refresh}   # public
///     ├── /user/me                         # any authenticated user
///     ├── /cars/...                        # reads for users, writes for admins
///     └── /bookings/...                    # role and ownership checked per handler
/// ```
///
/// # Middleware Stack
///
/// Applied in order (innermost first):
/// 1. JWT authentication (everything under `/api` except `/api/auth`)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let user_routes = Router::new().route("/me", get(routes::users::me));

    let car_routes = Router::new()
        .route(
            "/",
            get(routes::cars::list_cars).post(routes::cars::create_car),
        )
        .route("/available", get(routes::cars::available_cars))
        .route("/simple", get(routes::cars::list_cars_simple))
        .route("/booking-info", get(routes::cars::list_cars_with_booking_info))
        .route(
            "/:id",
            get(routes::cars::get_car)
                .put(routes::cars::update_car)
                .delete(routes::cars::delete_car),
        )
        .route("/:id/availability", get(routes::cars::car_availability))
        .route("/:id/bookings", get(routes::cars::car_bookings));

    let booking_routes = Router::new()
        .route(
            "/",
            get(routes::bookings::list_bookings).post(routes::bookings::create_booking),
        )
        .route("/my-bookings", get(routes::bookings::my_bookings))
        .route("/cleanup-expired", post(routes::bookings::cleanup_expired))
        .route(
            "/:id",
            get(routes::bookings::get_booking)
                .put(routes::bookings::update_booking)
                .delete(routes::bookings::delete_booking),
        );

    let protected_routes = Router::new()
        .nest("/user", user_routes)
        .nest("/cars", car_routes)
        .nest("/bookings", booking_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer access token and injects the caller's `AuthContext`
/// into the request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(
        user_id = auth_context.user_id,
        username = %auth_context.username,
        "Authenticated request"
    );

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
