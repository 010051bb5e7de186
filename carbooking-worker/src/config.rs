/// Worker configuration
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUN_MIGRATIONS`: Apply pending migrations at startup (default: true)
/// - `CLEANUP_CRON`: Six-field cron expression, evaluated in UTC
///   (default: `0 0 2 * * *`, daily at 02:00)
/// - `CLEANUP_ON_STARTUP`: Run one cleanup pass before scheduling (default: false)

use std::env;

/// Daily at 02:00 UTC (sec min hour day month weekday)
pub const DEFAULT_CLEANUP_CRON: &str = "0 0 2 * * *";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub cleanup_cron: String,
    pub cleanup_on_startup: bool,
}

fn env_flag(name: &str, default: bool) -> anyhow::Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{} must be a boolean, got '{}'", name, value),
        },
        Err(_) => Ok(default),
    }
}

/// Rejects expressions that are not 6 or 7 whitespace-separated fields
///
/// The scheduler parses the fields themselves; this catches the common
/// mistake of passing a five-field crontab line.
pub fn check_cron_fields(expr: &str) -> anyhow::Result<()> {
    let fields = expr.split_whitespace().count();
    if !(6..=7).contains(&fields) {
        anyhow::bail!(
            "CLEANUP_CRON must have 6 or 7 fields (sec min hour day month weekday [year]), got {}: '{}'",
            fields,
            expr
        );
    }
    Ok(())
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let cleanup_cron =
            env::var("CLEANUP_CRON").unwrap_or_else(|_| DEFAULT_CLEANUP_CRON.to_string());
        check_cron_fields(&cleanup_cron)?;

        Ok(Self {
            database_url,
            max_connections,
            run_migrations: env_flag("RUN_MIGRATIONS", true)?,
            cleanup_cron,
            cleanup_on_startup: env_flag("CLEANUP_ON_STARTUP", false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cron_is_valid() {
        assert!(check_cron_fields(DEFAULT_CLEANUP_CRON).is_ok());
        assert!(check_cron_fields("0 30 3 * * Mon-Fri 2030").is_ok());
    }

    #[test]
    fn test_five_field_cron_rejected() {
        let err = check_cron_fields("0 2 * * *").unwrap_err();
        assert!(err.to_string().contains("got 5"));
    }
}
