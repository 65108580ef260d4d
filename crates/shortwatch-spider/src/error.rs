use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to access validator file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize validator record: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request to telephony provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("telephony provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("{failed} of {total} alert calls could not be placed")]
    Incomplete { failed: usize, total: usize },
}
