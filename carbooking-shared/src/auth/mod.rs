/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength policy
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: Bearer token extraction and the request `AuthContext`
/// - [`authorization`]: Role and ownership checks
///
/// # Example
///
/// ```no_run
/// use carbooking_shared::auth::password::{hash_password, verify_password};
/// use carbooking_shared::auth::jwt::{issue_token_pair, validate_access_token};
/// use carbooking_shared::models::role::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user123")?;
/// assert!(verify_password("user123", &hash)?);
///
/// let tokens = issue_token_pair(2, "john", vec![Role::User], "secret-key")?;
/// let claims = validate_access_token(&tokens.access_token, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
