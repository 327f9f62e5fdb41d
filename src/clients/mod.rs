pub mod dataforseo;
pub mod instagram;

pub use dataforseo::DataForSeoClient;
pub use instagram::InstagramClient;

use std::time::Duration;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across all provider clients to enable connection pooling and avoid
/// socket exhaustion.
pub fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("vendry/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Errors from external vendor-data providers. Zero results is never an
/// error; this type covers transport and upstream failures only.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider is disabled in config or credentials are missing.
    #[error("provider disabled or credentials missing")]
    Disabled,

    #[error("authentication failed")]
    Auth,

    #[error("rate limited by provider")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("response decode error: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether a retry could plausibly succeed. Auth and client errors never
    /// recover on their own; retrying them only burns billed calls.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Timeout | Self::Network(_) => true,
            Self::Http { status } => *status >= 500,
            Self::Disabled | Self::Auth | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// One retry policy for every provider call site. The clients themselves
/// never retry, so each billed call stays visible to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Run `op` with jittered exponential backoff on retryable failures.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    let backoff = self.base_delay_ms.saturating_mul(1 << attempt);
                    let jitter = rand::random_range(0..=self.base_delay_ms / 2);
                    tracing::debug!(
                        attempt = attempt + 1,
                        backoff_ms = backoff + jitter,
                        error = %e,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
