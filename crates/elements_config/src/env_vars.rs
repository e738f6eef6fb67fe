//! Environment variable handling for the Elements booking demo.
//!
//! Two naming schemes are supported. The structured one mirrors the config
//! tree (`ELEMENTS__CRONOFY__SUB`), the plain one is what the demo's `.env`
//! file has always used (`SUB`, `CLIENT_ID`, ...). Plain names win.

use std::env;

/// The default prefix for structured configuration environment variables
pub const DEFAULT_PREFIX: &str = "ELEMENTS";

/// The separator for structured configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// Plain environment variable names and the config path each one overrides.
pub const PLAIN_ENV_VARS: &[(&str, &str)] = &[
    ("CLIENT_ID", "cronofy.client_id"),
    ("CLIENT_SECRET", "cronofy.client_secret"),
    ("DATA_CENTER", "cronofy.data_center"),
    ("ACCESS_TOKEN", "cronofy.access_token"),
    ("SUB", "cronofy.sub"),
    ("ORIGIN", "web.origin"),
    ("CALLBACK_URL", "web.callback_url"),
    ("PORT", "server.port"),
];

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `server.host` becomes `ELEMENTS__SERVER__HOST`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Returns `(config path, value)` for every plain env var that is set and non-empty.
pub fn plain_overrides() -> Vec<(&'static str, String)> {
    PLAIN_ENV_VARS
        .iter()
        .filter_map(|(name, path)| {
            env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (*path, v))
        })
        .collect()
}

/// Check if a path holds a secret that must never be logged
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret") || path_lower.contains("token")
}
