/// Runtime configuration for session-token signing and verification.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Symmetric HS256 signing secret, process-wide and read-only after startup.
    pub secret: String,
    /// Lifetime of an issued token in seconds.
    pub ttl_seconds: i64,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u64,
}

impl TokenConfig {
    /// Construct config with the default 60 minute lifetime and exact expiry.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds: 60 * 60,
            leeway_seconds: 0,
        }
    }

    /// Adjust the token lifetime.
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}
