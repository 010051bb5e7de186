/// Database models for the car booking backend
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `role`: Authorization roles and user-role grants
/// - `user`: User accounts and authentication
/// - `car`: Fleet vehicles and availability listings
/// - `booking`: Car reservations and conflict lookups
/// - `money`: Fixed-point price amounts
///
/// # Example
///
/// ```no_run
/// use carbooking_shared::models::user::{User, CreateUser};
/// use carbooking_shared::models::role::Role;
/// use carbooking_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "jane".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     roles: vec![Role::User],
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod booking;
pub mod car;
pub mod money;
pub mod role;
pub mod user;
