// File: crates/elements_cronofy/src/auth.rs
use elements_config::CronofyConfig;
use url::Url;
use tracing::info;
use uuid::Uuid;

/// Scope requested when a developer connects their calendar.
pub const AUTHORIZATION_SCOPE: &str = "read_write";

fn data_center_suffix(data_center: &str) -> String {
    match data_center.trim().to_lowercase().as_str() {
        "" | "us" => String::new(),
        dc => format!("-{}", dc),
    }
}

/// Base URL of the REST API for the configured data center.
pub fn api_base_url(config: &CronofyConfig) -> String {
    config.api_base_url.clone().unwrap_or_else(|| {
        format!(
            "https://api{}.cronofy.com",
            data_center_suffix(&config.data_center)
        )
    })
}

/// Base URL of the web app (authorization pages) for the configured data center.
pub fn app_base_url(config: &CronofyConfig) -> String {
    config.app_base_url.clone().unwrap_or_else(|| {
        format!(
            "https://app{}.cronofy.com",
            data_center_suffix(&config.data_center)
        )
    })
}

/// Builds the URL a developer opens to grant the demo access to a calendar.
/// Cronofy redirects back to `redirect_uri` with `?code=...`.
pub fn authorization_url(
    config: &CronofyConfig,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, url::ParseError> {
    let base = format!("{}/oauth/authorize", app_base_url(config).trim_end_matches('/'));
    Url::parse_with_params(
        &base,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", AUTHORIZATION_SCOPE),
            ("state", state),
        ],
    )
}

/// Logs the authorization URL with a fresh random state.
pub fn print_authorization_url(config: &CronofyConfig, redirect_uri: &str) {
    if config.client_id.is_empty() {
        info!("CLIENT_ID not set; skipping Cronofy authorization URL");
        return;
    }
    let state = Uuid::new_v4().to_string();
    match authorization_url(config, redirect_uri, &state) {
        Ok(url) => info!("🔐 Cronofy authorization URL:\n{}", url),
        Err(e) => info!("Could not build Cronofy authorization URL: {}", e),
    }
}
