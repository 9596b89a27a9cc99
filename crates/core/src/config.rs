//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup (the binary reads the environment) and then
//! passed into the client. Library code never reads process-wide environment variables, which
//! keeps tests independent of the host environment.

use crate::constants::DEFAULT_TIMEOUT_SECS;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_base_url: String,
    request_timeout: Duration,
    auth_file: PathBuf,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// A trailing `/` on the base URL is dropped so endpoint paths can be appended verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the base URL is empty or not `http(s)://`, or if
    /// the timeout is zero.
    pub fn new(
        api_base_url: impl Into<String>,
        request_timeout: Duration,
        auth_file: PathBuf,
    ) -> CoreResult<Self> {
        let api_base_url = api_base_url.into().trim().trim_end_matches('/').to_string();
        if api_base_url.is_empty() {
            return Err(CoreError::InvalidInput(
                "api_base_url cannot be empty".into(),
            ));
        }
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(CoreError::InvalidInput(format!(
                "api_base_url must start with http:// or https://, got {api_base_url:?}"
            )));
        }
        if request_timeout.is_zero() {
            return Err(CoreError::InvalidInput(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            request_timeout,
            auth_file,
        })
    }

    /// Base URL with any trailing slash removed.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Join an absolute endpoint path (`/api/...`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Location of the persisted staff credentials.
    pub fn auth_file(&self) -> &Path {
        &self.auth_file
    }
}

/// Parse the request timeout from an optional string value holding whole seconds.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn timeout_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = match value {
        None => DEFAULT_TIMEOUT_SECS,
        Some(v) => v.parse::<u64>().map_err(|e| {
            CoreError::InvalidInput(format!("timeout must be whole seconds, got {v:?}: {e}"))
        })?,
    };

    if secs == 0 {
        return Err(CoreError::InvalidInput(
            "timeout must be greater than zero".into(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_and_joins_paths() {
        let cfg = ClientConfig::new(
            "http://localhost:8080/",
            Duration::from_secs(5),
            PathBuf::from("auth.json"),
        )
        .expect("valid config");
        assert_eq!(cfg.api_base_url(), "http://localhost:8080");
        assert_eq!(
            cfg.endpoint("/api/public/forms/abc"),
            "http://localhost:8080/api/public/forms/abc"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        for bad in ["", "   ", "localhost:8080", "ftp://host"] {
            let err = ClientConfig::new(bad, Duration::from_secs(5), PathBuf::from("a.json"))
                .expect_err("should reject");
            assert!(matches!(err, CoreError::InvalidInput(_)), "{bad}");
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::new("https://api.example.com", Duration::ZERO, PathBuf::new())
            .expect_err("zero timeout");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("timeout")));
    }

    #[test]
    fn timeout_env_value_defaults_and_parses() {
        assert_eq!(
            timeout_from_env_value(None).expect("default"),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(
            timeout_from_env_value(Some("  ".into())).expect("blank is default"),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(
            timeout_from_env_value(Some("12".into())).expect("parse"),
            Duration::from_secs(12)
        );
        assert!(timeout_from_env_value(Some("0".into())).is_err());
        assert!(timeout_from_env_value(Some("ten".into())).is_err());
    }
}
