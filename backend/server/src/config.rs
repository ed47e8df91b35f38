use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub static_dir: String,
    pub moderator_username: String,
    pub moderator_password: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "3000")?,
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379")?,
            static_dir: try_load("STATIC_DIR", "public")?,
            moderator_username: try_load("MODERATOR_USERNAME", "moderator")?,
            moderator_password: read_secret("MODERATOR_PASSWORD")?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value: {e}"))
}

/// Docker secret first, then the plain environment variable.
fn read_secret(secret_name: &str) -> Result<String> {
    let path = format!("/run/secrets/{secret_name}");

    match read_to_string(&path) {
        Ok(secret) => Ok(secret.trim().to_string()),
        Err(e) => {
            warn!("Failed to read {secret_name} from file: {e}");

            var(secret_name)
                .map(|secret| secret.trim().to_string())
                .filter(|secret| !secret.is_empty())
                .with_context(|| format!("Secret {secret_name} missing from {path} and environment"))
        }
    }
}
