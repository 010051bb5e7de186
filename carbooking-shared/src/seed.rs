/// Demo data seeding
///
/// Creates the default accounts and the sixteen-car demo fleet. Seeding is
/// idempotent: existing usernames and registration numbers are left alone.
///
/// | Username | Password     | Roles                   |
/// |----------|--------------|-------------------------|
/// | admin    | admin123     | ROLE_ADMIN              |
/// | john     | user123      | ROLE_USER               |
/// | jane     | user123      | ROLE_USER               |
/// | manager  | manager123   | ROLE_ADMIN, ROLE_USER   |

use sqlx::PgPool;
use tracing::{debug, info};

use crate::auth::password::{hash_password, PasswordError};
use crate::models::car::CarType;
use crate::models::role::Role;
use crate::models::user::{CreateUser, User};

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Counts of rows created by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users_created: usize,
    pub cars_created: usize,
}

struct SeedUser {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    roles: &'static [Role],
}

const USERS: &[SeedUser] = &[
    SeedUser {
        username: "admin",
        email: "admin@carbooking.com",
        password: "admin123",
        roles: &[Role::Admin],
    },
    SeedUser {
        username: "john",
        email: "john@example.com",
        password: "user123",
        roles: &[Role::User],
    },
    SeedUser {
        username: "jane",
        email: "jane@example.com",
        password: "user123",
        roles: &[Role::User],
    },
    SeedUser {
        username: "manager",
        email: "manager@carbooking.com",
        password: "manager123",
        roles: &[Role::Admin, Role::User],
    },
];

/// Demo fleet: registration number, type, price in cents, seats
const CARS: &[(&str, CarType, i64, i32)] = &[
    ("SED-001", CarType::Sedan, 5000, 4),
    ("SED-002", CarType::Sedan, 5500, 5),
    ("SED-003", CarType::Sedan, 6000, 5),
    ("VAN-001", CarType::Van, 8000, 8),
    ("VAN-002", CarType::Van, 8500, 9),
    ("VAN-003", CarType::Van, 9000, 10),
    ("SUV-001", CarType::Suv, 7000, 5),
    ("SUV-002", CarType::Suv, 7200, 5),
    ("SUV-003", CarType::Suv, 7500, 6),
    ("SUV-004", CarType::Suv, 7500, 6),
    ("SUV-005", CarType::Suv, 7800, 7),
    ("SUV-006", CarType::Suv, 7800, 7),
    ("SUV-007", CarType::Suv, 8000, 7),
    ("SUV-008", CarType::Suv, 8200, 7),
    ("SUV-009", CarType::Suv, 8500, 8),
    ("SUV-010", CarType::Suv, 9000, 8),
];

/// Seeds roles, demo users and the demo fleet
pub async fn seed_data(pool: &PgPool) -> Result<SeedSummary, SeedError> {
    Role::ensure_all(pool).await?;

    let users_created = seed_users(pool).await?;
    let cars_created = seed_cars(pool).await?;

    info!(users_created, cars_created, "Seed data loaded");

    Ok(SeedSummary {
        users_created,
        cars_created,
    })
}

async fn seed_users(pool: &PgPool) -> Result<usize, SeedError> {
    let mut created = 0;

    for seed in USERS {
        if User::find_by_username(pool, seed.username).await?.is_some() {
            debug!(username = seed.username, "Seed user already exists");
            continue;
        }

        User::create(
            pool,
            CreateUser {
                username: seed.username.to_string(),
                email: seed.email.to_string(),
                password_hash: hash_password(seed.password)?,
                roles: seed.roles.to_vec(),
            },
        )
        .await?;

        created += 1;
    }

    Ok(created)
}

async fn seed_cars(pool: &PgPool) -> Result<usize, SeedError> {
    let mut created = 0;

    for (registration_number, car_type, cents, capacity) in CARS {
        let result = sqlx::query(
            r#"
            INSERT INTO cars (registration_number, car_type, cost_per_day_cents, capacity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (registration_number) DO NOTHING
            "#,
        )
        .bind(*registration_number)
        .bind(*car_type)
        .bind(*cents)
        .bind(*capacity)
        .execute(pool)
        .await?;

        created += result.rows_affected() as usize;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_fleet_shape() {
        assert_eq!(CARS.len(), 16);

        let registrations: HashSet<_> = CARS.iter().map(|c| c.0).collect();
        assert_eq!(registrations.len(), CARS.len());

        let count = |t: CarType| CARS.iter().filter(|c| c.1 == t).count();
        assert_eq!(count(CarType::Sedan), 3);
        assert_eq!(count(CarType::Van), 3);
        assert_eq!(count(CarType::Suv), 10);
    }

    #[test]
    fn test_seed_users() {
        let manager = USERS.iter().find(|u| u.username == "manager").unwrap();
        assert_eq!(manager.roles, &[Role::Admin, Role::User]);

        let admins = USERS.iter().filter(|u| u.roles.contains(&Role::Admin)).count();
        assert_eq!(admins, 2);
    }
}
