use std::time::Duration;

use crate::errors::{NewsfeedError, NewsfeedResult};

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> NewsfeedResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = std::env::var("NEWSFEED_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("newsfeed.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./newsfeed.db".to_string())
        });

        let fetch_timeout = match std::env::var("NEWSFEED_FETCH_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_timeout(&raw)?),
            Err(_) => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let user_agent = std::env::var("NEWSFEED_USER_AGENT")
            .unwrap_or_else(|_| default_user_agent());

        Ok(Self {
            db_path,
            fetch_timeout,
            user_agent,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./newsfeed.db".to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("newsfeed/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_timeout(raw: &str) -> NewsfeedResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(NewsfeedError::Config(format!(
            "NEWSFEED_FETCH_TIMEOUT_SECS must be a positive integer, got '{}'",
            raw
        ))),
    }
}
