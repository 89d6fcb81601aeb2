use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("REFURB_ENV", "development"))?;
    let log_level = or_default("REFURB_LOG_LEVEL", "info");

    let catalog_path = PathBuf::from(or_default(
        "REFURB_CATALOG_PATH",
        "./data/competitor_prices.json",
    ));
    let history_dir = PathBuf::from(or_default("REFURB_HISTORY_DIR", "./data/msrp_history"));
    let vendors_path = PathBuf::from(or_default("REFURB_VENDORS_PATH", "./config/vendors.yaml"));
    let pages_dir = PathBuf::from(or_default("REFURB_PAGES_DIR", "./data/pages"));

    let max_pages = parse_usize("REFURB_MAX_PAGES", "20")?;
    let max_empty_pages = parse_usize("REFURB_MAX_EMPTY_PAGES", "2")?;
    let title_max_chars = parse_usize("REFURB_TITLE_MAX_CHARS", "200")?;

    if max_pages == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REFURB_MAX_PAGES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if max_empty_pages == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REFURB_MAX_EMPTY_PAGES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let min_intel_generation = match lookup("REFURB_MIN_INTEL_GENERATION") {
        Ok(raw) if !raw.trim().is_empty() => {
            Some(
                raw.trim()
                    .parse::<u8>()
                    .map_err(|e| ConfigError::InvalidEnvVar {
                        var: "REFURB_MIN_INTEL_GENERATION".to_string(),
                        reason: e.to_string(),
                    })?,
            )
        }
        _ => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        history_dir,
        vendors_path,
        pages_dir,
        max_pages,
        max_empty_pages,
        title_max_chars,
        min_intel_generation,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REFURB_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
