/// Role model
///
/// Users hold one or more roles through the `user_roles` join table.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE role_name AS ENUM ('ROLE_ADMIN', 'ROLE_USER');
///
/// CREATE TABLE roles (
///     id BIGSERIAL PRIMARY KEY,
///     name role_name NOT NULL UNIQUE
/// );
///
/// CREATE TABLE user_roles (
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role_id BIGINT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
///     PRIMARY KEY (user_id, role_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

/// Authorization roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role_name")]
pub enum Role {
    /// Manages the fleet and every booking
    #[sqlx(rename = "ROLE_ADMIN")]
    #[serde(rename = "ROLE_ADMIN")]
    Admin,

    /// Books cars and manages own bookings
    #[sqlx(rename = "ROLE_USER")]
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Role {
    /// Converts role to its stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::User => "ROLE_USER",
        }
    }

    /// All known roles
    pub fn all() -> [Role; 2] {
        [Role::Admin, Role::User]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_ADMIN" => Ok(Role::Admin),
            "ROLE_USER" => Ok(Role::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl Role {
    /// Lists the roles granted to a user
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Role>, sqlx::Error> {
        let roles = sqlx::query_scalar::<_, Role>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(roles)
    }

    /// Grants a role to a user
    ///
    /// Granting a role the user already holds is a no-op.
    pub async fn grant<'e, E>(executor: E, user_id: i64, role: Role) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Makes sure every role row exists
    pub async fn ensure_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        for role in Role::all() {
            sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(role)
                .execute(pool)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "ROLE_ADMIN");
        assert_eq!(Role::User.as_str(), "ROLE_USER");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("ROLE_USER".parse::<Role>().unwrap(), Role::User);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&vec![Role::Admin, Role::User]).unwrap();
        assert_eq!(json, r#"["ROLE_ADMIN","ROLE_USER"]"#);

        let parsed: Role = serde_json::from_str(r#""ROLE_USER""#).unwrap();
        assert_eq!(parsed, Role::User);
    }
}
