//! Runtime configuration, read from the process environment (and `.env`).
//!
//! Every component receives its own section at construction, so tests can
//! point any of them at a local double.

use crate::ConfigError;

pub const DEFAULT_FEED_URL: &str = "https://muddywatersresearch.com/feed/?post_type=reports";
pub const DEFAULT_STATE_FILE: &str = "muddy_waters_state.bin";
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const DEFAULT_TWILIO_URL: &str = "https://api.twilio.com";
pub const DEFAULT_PUBLISHER: &str = "Muddywaters";

#[derive(Clone, Debug)]
pub struct Config {
    pub user_agent: String,
    pub state_file: String,
    pub feed: FeedConfig,
    pub anthropic: AnthropicConfig,
    pub twilio: TwilioConfig,
    pub alert: AlertConfig,
}

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub api_url: String,
}

#[derive(Clone, Debug)]
pub struct AlertConfig {
    /// Caller ID; must be a number owned by the Twilio account.
    pub from_number: String,
    pub to_numbers: Vec<String>,
    /// Name read out in the announcement, e.g. "Muddywaters".
    pub publisher: String,
}

impl Config {
    /// Read the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenv::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional =
            |name: &str, default: &str| -> String { or_default(&lookup, name, default) };

        let max_tokens = lookup("ANTHROPIC_MAX_TOKENS").filter(|raw| !raw.trim().is_empty());
        let max_tokens = match max_tokens {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|err| ConfigError::Invalid {
                    name: "ANTHROPIC_MAX_TOKENS",
                    reason: err.to_string(),
                })?,
            None => DEFAULT_MAX_TOKENS,
        };

        let to_numbers = parse_numbers(&required("ALERT_NUMBERS")?);
        if to_numbers.is_empty() {
            return Err(ConfigError::Invalid {
                name: "ALERT_NUMBERS",
                reason: "no phone numbers listed".to_string(),
            });
        }

        Ok(Self {
            user_agent: optional(
                "USER_AGENT",
                concat!("shortwatch/", env!("CARGO_PKG_VERSION")),
            ),
            state_file: state_file(&lookup),
            feed: FeedConfig {
                url: optional("FEED_URL", DEFAULT_FEED_URL),
            },
            anthropic: AnthropicConfig {
                api_key: required("ANTHROPIC_API_KEY")?,
                api_url: optional("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_URL),
                model: optional("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
                max_tokens,
            },
            twilio: TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: required("TWILIO_AUTH_TOKEN")?,
                api_url: optional("TWILIO_API_URL", DEFAULT_TWILIO_URL),
            },
            alert: AlertConfig {
                from_number: required("TWILIO_FROM_NUMBER")?,
                to_numbers,
                publisher: publisher(&lookup),
            },
        })
    }
}

/// Path of the validator file, as `run` and `reset` both resolve it.
pub fn state_file_from_env() -> String {
    state_file(|name| dotenv::var(name).ok())
}

/// Publisher named in the announcement, as `run` and `preview` both resolve it.
pub fn publisher_from_env() -> String {
    publisher(|name| dotenv::var(name).ok())
}

pub fn state_file<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    or_default(&lookup, "STATE_FILE", DEFAULT_STATE_FILE)
}

pub fn publisher<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    or_default(&lookup, "ALERT_PUBLISHER", DEFAULT_PUBLISHER)
}

/// A blank value counts as unset.
fn or_default<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Split a comma-separated list of phone numbers, dropping blanks.
fn parse_numbers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .map(String::from)
        .collect()
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> HashMap<String, String> {
        env(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_FROM_NUMBER", "+15550000000"),
            ("ALERT_NUMBERS", "+15551111111, +15552222222,"),
        ])
    }

    #[test]
    fn defaults_fill_optional_values() {
        let vars = minimal();
        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.state_file, DEFAULT_STATE_FILE);
        assert_eq!(config.anthropic.model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(config.anthropic.max_tokens, 100);
        assert_eq!(config.twilio.api_url, DEFAULT_TWILIO_URL);
        assert_eq!(config.alert.publisher, "Muddywaters");
        assert_eq!(
            config.alert.to_numbers,
            vec!["+15551111111".to_string(), "+15552222222".to_string()]
        );
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let mut vars = minimal();
        vars.remove("TWILIO_AUTH_TOKEN");
        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();

        assert!(matches!(err, ConfigError::Missing("TWILIO_AUTH_TOKEN")));
    }

    #[test]
    fn empty_number_list_is_rejected() {
        let mut vars = minimal();
        vars.insert("ALERT_NUMBERS".into(), " , ,".into());
        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "ALERT_NUMBERS",
                ..
            }
        ));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let mut vars = minimal();
        vars.insert("STATE_FILE".into(), "  ".into());
        vars.insert("ALERT_PUBLISHER".into(), "".into());
        let lookup = |name: &str| vars.get(name).cloned();
        let config = Config::from_lookup(lookup).unwrap();

        assert_eq!(config.state_file, DEFAULT_STATE_FILE);
        assert_eq!(config.alert.publisher, DEFAULT_PUBLISHER);
        // reset and preview resolve the same values
        assert_eq!(state_file(lookup), config.state_file);
        assert_eq!(publisher(lookup), config.alert.publisher);
    }

    #[test]
    fn explicit_values_are_kept() {
        let mut vars = minimal();
        vars.insert("STATE_FILE".into(), "/var/lib/shortwatch/state.bin".into());
        vars.insert("ALERT_PUBLISHER".into(), "Hindenburg".into());
        let lookup = |name: &str| vars.get(name).cloned();
        let config = Config::from_lookup(lookup).unwrap();

        assert_eq!(state_file(lookup), "/var/lib/shortwatch/state.bin");
        assert_eq!(state_file(lookup), config.state_file);
        assert_eq!(publisher(lookup), "Hindenburg");
        assert_eq!(publisher(lookup), config.alert.publisher);
    }

    #[test]
    fn bad_max_tokens_is_rejected() {
        let mut vars = minimal();
        vars.insert("ANTHROPIC_MAX_TOKENS".into(), "lots".into());

        assert!(Config::from_lookup(|name| vars.get(name).cloned()).is_err());
    }
}
