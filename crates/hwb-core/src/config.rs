use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Typed configuration, built once at startup and passed into the poller.
///
/// A missing required variable is fatal: `load()` fails, the caller logs and
/// exits, and the poll loop is never entered.
#[derive(Clone, Debug)]
pub struct Config {
    // Required credentials
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: i64,

    // Polling
    pub endpoint: String,
    pub retry_time: Duration,
    pub http_timeout: Duration,

    // Error-relay guard
    pub notify_failure_limit: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let practicum_token = require_env("PRACTICUM_TOKEN")?;
        let telegram_token = require_env("TELEGRAM_TOKEN")?;
        let telegram_chat_id = require_env("TELEGRAM_CHAT_ID")?
            .trim()
            .parse::<i64>()
            .map_err(|_| {
                Error::Config("TELEGRAM_CHAT_ID must be a numeric chat id".to_string())
            })?;

        let endpoint = env_str("ENDPOINT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let retry_time = Duration::from_secs(env_u64("RETRY_TIME").unwrap_or(600));
        let http_timeout = Duration::from_secs(env_u64("HTTP_TIMEOUT").unwrap_or(30));
        let notify_failure_limit = env_u32("NOTIFY_FAILURE_LIMIT").unwrap_or(3);

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            retry_time,
            http_timeout,
            notify_failure_limit,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let Some((key, val)) = parse_dotenv_line(raw) else {
            continue;
        };
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv_line(raw: &str) -> Option<(String, String)> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (k, v) = line.split_once('=')?;
    let key = k.trim();
    if key.is_empty() {
        return None;
    }

    let mut val = v.trim().to_string();
    // Strip optional surrounding quotes.
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        val = val[1..val.len() - 1].to_string();
    }

    Some((key.to_string(), val))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
