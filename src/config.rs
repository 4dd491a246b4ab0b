//! Runner configuration.

/// Environment variable overriding [`RunConfig::stack_size`], in bytes.
pub const STACK_SIZE_ENV: &str = "WINDIGO_STACK_SIZE";

/// Configuration for a test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Stack size for each execution-unit thread. `None` uses the platform default.
    pub stack_size: Option<usize>,
    /// Log filter used by `run_all` when `RUST_LOG` is not set.
    pub default_log_filter: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            stack_size: None,
            default_log_filter: "info".to_string(),
        }
    }
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (an environment-like key/value source).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(STACK_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => self.stack_size = Some(size),
                _ => tracing::warn!(variable = STACK_SIZE_ENV, value = %raw, "ignoring invalid stack size"),
            }
        }
        self
    }

    /// Set the execution-unit stack size
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Set the fallback log filter
    pub fn with_default_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_log_filter = filter.into();
        self
    }
}
