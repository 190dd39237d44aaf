use std::time::Duration;

/// Fetcher behaviour that is not part of an individual request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetcherConfig {
    /// Fail a request with [`FetchError::Timeout`](crate::FetchError) if it
    /// has not settled after this long. `None` waits forever.
    pub timeout: Option<Duration>,
    /// When set, observing the empty key parks the fetcher in `Idle` instead
    /// of issuing a request for `""`.
    pub skip_empty_key: bool,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl FetcherConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_skip_empty_key(mut self, skip_empty_key: bool) -> Self {
        self.skip_empty_key = skip_empty_key;
        self
    }

    /// Read the config from the environment, loading a `.env` file first if
    /// there is one.
    ///
    /// Optional environment variables:
    /// - FETCH_TIMEOUT_MS: request deadline in milliseconds (unset or 0 for
    ///   no deadline)
    /// - FETCH_SKIP_EMPTY_KEY: `true`/`false`/`1`/`0` (default false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let timeout = match lookup("FETCH_TIMEOUT_MS") {
            None => None,
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        name: "FETCH_TIMEOUT_MS",
                        expected: "a whole number of milliseconds",
                        value,
                    });
                }
            },
        };

        let skip_empty_key = match lookup("FETCH_SKIP_EMPTY_KEY") {
            None => false,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" | "" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "FETCH_SKIP_EMPTY_KEY",
                        expected: "a boolean",
                        value,
                    });
                }
            },
        };

        Ok(FetcherConfig {
            timeout,
            skip_empty_key,
        })
    }
}
