use crate::app_config::{AppConfig, ApolloMode, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values count as unset so `.env` templates with blank keys behave.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("ONSET_ENV", "development"))?;
    let log_level = or_default("ONSET_LOG_LEVEL", "info");

    // Checked when a search client is built, so offline commands still run.
    let apollo = match (optional("ONSET_APOLLO_RELAY_URL"), optional("APOLLO_API_KEY")) {
        (Some(url), _) => Some(ApolloMode::Relay { url }),
        (None, Some(api_key)) => Some(ApolloMode::Direct {
            api_key,
            base_url: or_default("ONSET_APOLLO_BASE_URL", "https://api.apollo.io/v1"),
        }),
        (None, None) => None,
    };

    let apollo_request_timeout_secs = parse_u64("ONSET_APOLLO_REQUEST_TIMEOUT_SECS", "30")?;
    let apollo_page_size = parse_u32("ONSET_APOLLO_PAGE_SIZE", "25")?;
    if apollo_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ONSET_APOLLO_PAGE_SIZE".to_string(),
            reason: "page size must be at least 1".to_string(),
        });
    }
    let user_agent = or_default("ONSET_USER_AGENT", "onset/0.1 (lead-collection)");

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_base_url = or_default("ONSET_OPENAI_BASE_URL", "https://api.openai.com/v1");
    let openai_model = or_default("ONSET_OPENAI_MODEL", "gpt-4o");
    let enrich_min_interval_ms = parse_u64("ONSET_ENRICH_MIN_INTERVAL_MS", "1100")?;
    let enrich_cooldown_secs = parse_u64("ONSET_ENRICH_COOLDOWN_SECS", "65")?;

    let export_dir = PathBuf::from(or_default("ONSET_EXPORT_DIR", "."));
    let presets_path = PathBuf::from(or_default("ONSET_PRESETS_PATH", "./config/presets.yaml"));

    Ok(AppConfig {
        env,
        log_level,
        apollo,
        apollo_request_timeout_secs,
        apollo_page_size,
        user_agent,
        openai_api_key,
        openai_base_url,
        openai_model,
        enrich_min_interval_ms,
        enrich_cooldown_secs,
        export_dir,
        presets_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ONSET_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
