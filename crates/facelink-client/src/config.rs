use std::path::PathBuf;
use std::time::Duration;

/// Service endpoint used when `FACELINK_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://face-recognition-api-orcin.vercel.app/";

/// Client configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the face-recognition service.
    pub base_url: String,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (send + server time + read).
    pub request_timeout_secs: u64,
    /// File holding the saved administrator credentials.
    pub credentials_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 30,
            request_timeout_secs: 30,
            credentials_path: default_credentials_path(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `FACELINK_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let credentials_path = std::env::var("FACELINK_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.credentials_path);

        Self {
            base_url: std::env::var("FACELINK_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            connect_timeout_secs: env_u64(
                "FACELINK_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            request_timeout_secs: env_u64(
                "FACELINK_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            credentials_path,
        }
    }

    /// Same defaults, pointed at another service.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `$XDG_CONFIG_HOME/facelink/credentials.toml`, falling back to `~/.config`.
fn default_credentials_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("facelink")
        .join("credentials.toml")
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.credentials_path.ends_with("facelink/credentials.toml"));
    }

    #[test]
    fn test_with_base_url_keeps_other_defaults() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_u64_falls_back_on_garbage() {
        assert_eq!(env_u64("FACELINK_TEST_UNSET_VARIABLE", 7), 7);
    }
}
