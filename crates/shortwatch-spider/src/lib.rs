/// Validator cache: the ETag/Last-Modified pair kept between runs.
pub mod cache;

pub mod config;
mod error;

/// Stock name extraction through the [Anthropic Messages API].
///
/// [Anthropic Messages API]: https://docs.anthropic.com/en/api/messages
pub mod extract;

/// Conditional polling of the RSS feed.
pub mod feed;

/// Outbound alert calls through the [Twilio Calls API].
///
/// [Twilio Calls API]: https://www.twilio.com/docs/voice/api/call-resource
pub mod notify;

pub mod pipeline;

pub use error::{CacheError, ConfigError, NotifyError};

/// Shortcut for required API elements.
pub mod http {
    pub use reqwest::Client as HttpClient;
}

/// Build the shared HTTP client, identified by `user_agent`.
pub fn std_client_build(user_agent: &str) -> anyhow::Result<http::HttpClient> {
    let client = reqwest::ClientBuilder::new()
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Format the time since `time`, for trailing log messages.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}
