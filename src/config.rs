use anyhow::{bail, Context};
use rand::RngCore;
use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_CREATE_WINDOW_SECS: i64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub master_password: Option<String>,
    pub session_secret: Vec<u8>,
    pub cookie_secure: bool,
    pub create_window_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match non_empty_var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("PORT has invalid value '{value}'"))?,
            None => DEFAULT_PORT,
        };

        let data_path = non_empty_var("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                base.join("data").join("stats.json")
            });

        let master_password = non_empty_var("MASTER_PASSWORD");
        if master_password.is_none() {
            tracing::warn!("MASTER_PASSWORD not set, master access disabled");
        }

        let session_secret = match non_empty_var("SESSION_SECRET") {
            Some(secret) => secret.into_bytes(),
            None => {
                tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
                random_secret()
            }
        };

        let cookie_secure = match non_empty_var("COOKIE_SECURE") {
            Some(value) => parse_flag("COOKIE_SECURE", &value)?,
            None => false,
        };

        let create_window_secs = match non_empty_var("LEAGUE_CREATE_WINDOW_SECS") {
            Some(value) => parse_window_secs("LEAGUE_CREATE_WINDOW_SECS", &value)?,
            None => DEFAULT_CREATE_WINDOW_SECS,
        };

        Ok(Self {
            port,
            data_path,
            master_password,
            session_secret,
            cookie_secure,
            create_window_secs,
        })
    }
}

fn non_empty_var(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn random_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

fn parse_flag(var_name: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{var_name} must be a boolean, got '{other}'"),
    }
}

fn parse_window_secs(var_name: &str, raw: &str) -> anyhow::Result<i64> {
    let secs = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("{var_name} has invalid value '{raw}'"))?;
    if secs < 0 {
        bail!("{var_name} must not be negative");
    }
    Ok(secs)
}
