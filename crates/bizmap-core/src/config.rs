use crate::app_config::{Environment, ExplorerConfig};
use crate::ConfigError;

/// Load explorer configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_explorer_config() -> Result<ExplorerConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_explorer_config_from_env()
}

/// Load explorer configuration from environment variables already in the process.
///
/// Unlike [`load_explorer_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_explorer_config_from_env() -> Result<ExplorerConfig, ConfigError> {
    build_explorer_config(|key| std::env::var(key))
}

/// Parse and validate configuration from an arbitrary env lookup.
fn build_explorer_config<F>(lookup: F) -> Result<ExplorerConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = require("BIZMAP_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "BIZMAP_API_BASE_URL",
            "must start with http:// or https://".to_string(),
        ));
    }

    let env = parse_environment(&or_default("BIZMAP_ENV", "development"))?;
    let log_level = or_default("BIZMAP_LOG_LEVEL", "info");

    let page_size = or_default("BIZMAP_PAGE_SIZE", "20")
        .parse::<usize>()
        .map_err(|e| invalid("BIZMAP_PAGE_SIZE", e.to_string()))?;
    if page_size == 0 {
        return Err(invalid("BIZMAP_PAGE_SIZE", "must be at least 1".to_string()));
    }

    let search_debounce_ms = parse_u64("BIZMAP_SEARCH_DEBOUNCE_MS", "300")?;
    let request_timeout_secs = parse_u64("BIZMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BIZMAP_USER_AGENT", "bizmap/0.1 (directory-explorer)");
    let max_retries = parse_u32("BIZMAP_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("BIZMAP_RETRY_BACKOFF_BASE_SECS", "1")?;

    let cluster_max_zoom = or_default("BIZMAP_CLUSTER_MAX_ZOOM", "14")
        .parse::<u8>()
        .map_err(|e| invalid("BIZMAP_CLUSTER_MAX_ZOOM", e.to_string()))?;
    if cluster_max_zoom > 24 {
        return Err(invalid(
            "BIZMAP_CLUSTER_MAX_ZOOM",
            "must be between 0 and 24".to_string(),
        ));
    }

    let cluster_radius_px = or_default("BIZMAP_CLUSTER_RADIUS_PX", "50")
        .parse::<f64>()
        .map_err(|e| invalid("BIZMAP_CLUSTER_RADIUS_PX", e.to_string()))?;
    if !(cluster_radius_px.is_finite() && cluster_radius_px > 0.0) {
        return Err(invalid(
            "BIZMAP_CLUSTER_RADIUS_PX",
            "must be a positive number".to_string(),
        ));
    }

    let location_timeout_secs = parse_u64("BIZMAP_LOCATION_TIMEOUT_SECS", "10")?;

    Ok(ExplorerConfig {
        api_base_url,
        env,
        log_level,
        page_size,
        search_debounce_ms,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        cluster_max_zoom,
        cluster_radius_px,
        location_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIZMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
