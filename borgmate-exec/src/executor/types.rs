use crate::retry::RetryConfig;

#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    pub retry: RetryConfig,
}

impl ExecutorConfig {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            retry: RetryConfig { max_attempts },
        }
    }
}
