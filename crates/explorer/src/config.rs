use std::time::Duration;

use runtime::window::Viewport;
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";
pub const DEFAULT_K: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    /// Base URL the endpoint paths are appended to.
    pub api_base: String,
    /// Neighbor count sent with every neighborhood request. Not bounded here;
    /// the backend decides what is valid.
    pub k: usize,
    pub request_timeout: Duration,
    pub viewport: Viewport,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            k: DEFAULT_K,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            viewport: Viewport::default(),
        }
    }
}

impl ExplorerConfig {
    /// Defaults overridden by `EXPLORER_API_BASE`, `EXPLORER_K` and
    /// `EXPLORER_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base) = lookup("EXPLORER_API_BASE").filter(|s| !s.trim().is_empty()) {
            config.api_base = base.trim().to_string();
        }
        if let Some(raw) = lookup("EXPLORER_K") {
            match raw.trim().parse() {
                Ok(k) => config.k = k,
                Err(_) => warn!("ignoring EXPLORER_K={raw:?}: not a non-negative integer"),
            }
        }
        if let Some(raw) = lookup("EXPLORER_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(_) => warn!("ignoring EXPLORER_TIMEOUT_SECS={raw:?}"),
            }
        }

        config
    }

    /// `api_base` joined with `path`, without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
