use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

pub mod env_vars;
pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Sources, lowest precedence first: `config/default.toml`,
/// `config/<RUN_ENV>.toml`, `<PREFIX>__SECTION__KEY` env vars, then the plain
/// env vars listed in [`env_vars::PLAIN_ENV_VARS`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let mut builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator(env_vars::CONFIG_SEPARATOR));

    for (path, value) in env_vars::plain_overrides() {
        if env_vars::is_secret_path(path) {
            debug!("config override {} = ****", path);
        } else {
            debug!("config override {} = {}", path, value);
        }
        builder = builder.set_override(path, value)?;
    }

    let config: AppConfig = builder.build()?.try_deserialize()?;
    validate(&config)?;
    Ok(config)
}

/// Rejects a contact list the callback route could not resolve, and warns
/// about credentials the demo cannot work without. Missing credentials are
/// not fatal: pages still render with a sentinel element token.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let required = [
        ("CLIENT_ID", "cronofy.client_id", config.cronofy.client_id.as_str()),
        ("CLIENT_SECRET", "cronofy.client_secret", config.cronofy.client_secret.as_str()),
        ("ACCESS_TOKEN", "cronofy.access_token", config.cronofy.access_token.as_str()),
        ("SUB", "cronofy.sub", config.cronofy.sub.as_str()),
    ];
    for (name, path, value) in required {
        if value.is_empty() {
            warn!(
                "{} (or {}) is not set; Cronofy calls will fail",
                name,
                env_vars::config_path_to_env_var(path)
            );
        }
    }

    if config.contacts.is_empty() {
        warn!("No contacts configured; real-time scheduling has nobody to invite");
    }
    // Callbacks carry `?id=<n>` and resolve it as the n-th contact.
    for (index, contact) in config.contacts.iter().enumerate() {
        let expected = (index + 1).to_string();
        if contact.id != expected {
            return Err(ConfigError::Message(format!(
                "contact {} ({}) has id {:?}; contact ids must be their 1-based position, expected {:?}",
                index + 1,
                contact.name,
                contact.id,
                expected
            )));
        }
    }
    Ok(())
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// `DOTENV_OVERRIDE` names an alternative file; otherwise `.env` is used.
/// Returns the path that was (or would have been) loaded.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
