use thiserror::Error;

/// Default number of files processed concurrently.
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Error type for invalid batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Settings for one triage batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageConfig {
    /// Maximum number of per-file pipelines in flight at once.
    pub concurrency: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self { concurrency: DEFAULT_CONCURRENCY }
    }
}

impl TriageConfig {
    /// Build a config with a custom concurrency cap.
    pub fn with_concurrency(concurrency: usize) -> Result<Self, ConfigError> {
        let config = Self { concurrency };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}
