use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const SESSION_FILE_NAME: &str = ".booking_session.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the environment. Every setting has a
    /// fallback so the client always starts.
    pub fn from_env() -> Self {
        let api_url = env::var("API_GATEWAY_URL").unwrap_or_else(|_| {
            warn!("API_GATEWAY_URL not set, using {}", DEFAULT_API_URL);
            DEFAULT_API_URL.to_string()
        });

        let session_file = env::var("BOOKING_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(SESSION_FILE_NAME)
            });

        let timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("HTTP_TIMEOUT_SECS={:?} is not a number, using default", raw);
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_file,
            timeout: Duration::from_secs(timeout),
        }
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            session_file: PathBuf::from(SESSION_FILE_NAME),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
