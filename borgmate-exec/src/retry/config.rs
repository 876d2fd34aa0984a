#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Upper bound on invocations of the external operation per request,
    /// counting the first one.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}
