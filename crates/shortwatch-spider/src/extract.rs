use crate::config::AnthropicConfig;
use crate::http::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, trace};

/// Substituted for the stock name whenever extraction fails.
pub const UNKNOWN_STOCK: &str = "unknown stock";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A response shape the stock name may be found in.
type Parser = fn(&Value) -> Option<String>;

/// Tried in order; the first non-empty match wins.
const PARSERS: [(&str, Parser); 3] = [
    ("content_blocks", content_blocks),
    ("message_history", message_history),
    ("legacy_completion", legacy_completion),
];

/// Client for the language model that reads the feed.
pub struct ExtractionClient {
    http_client: HttpClient,
    config: AnthropicConfig,
}

impl ExtractionClient {
    pub fn new(http_client: HttpClient, config: AnthropicConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Ask the model for the latest stock named in `feed_content`.
    ///
    /// Returns [`UNKNOWN_STOCK`] on any failure; never errors.
    pub async fn extract_stock_name(&self, feed_content: &str) -> String {
        info!("sending feed content to the Anthropic API ...");
        let time = std::time::Instant::now();

        let stock = match self.complete(feed_content).await {
            Ok(response) => parse_stock_name(&response).unwrap_or_else(|| {
                error!("no stock name found in any known response shape");
                UNKNOWN_STOCK.to_string()
            }),
            Err(err) => {
                error!("failed to call the Anthropic API, error({err})");
                UNKNOWN_STOCK.to_string()
            }
        };

        info!(
            "extracted stock name: {stock}, {}",
            crate::time_elapsed(time)
        );
        stock
    }

    async fn complete(&self, feed_content: &str) -> anyhow::Result<Value> {
        let prompt = prompt(feed_content);
        let request = MessagesRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic API returned HTTP {status}, response({body})");
            return Err(anyhow::anyhow!("Anthropic API returned HTTP {status}"));
        }

        let json: Value = response.json().await?;
        debug!(
            "API response: {}",
            serde_json::to_string_pretty(&json).unwrap_or_default()
        );
        Ok(json)
    }
}

fn prompt(feed_content: &str) -> String {
    format!(
        "Please tell the latest stock that has been mentioned. \
        Please tell only the full stock name and no other information. \
        Here is an RSS feed content: {feed_content}\n\n"
    )
}

/// Run each [`PARSERS`] strategy over a completion response.
pub fn parse_stock_name(response: &Value) -> Option<String> {
    PARSERS.iter().find_map(|(name, parser)| {
        let found = parser(response);
        trace!("parser {name}: {found:?}");
        found
    })
}

// `{"content": [{"type": "text", "text": "..."}]}`
fn content_blocks(response: &Value) -> Option<String> {
    non_empty(response.get("content")?.as_array()?.first()?.get("text")?)
}

// `{"messages": [..., {"content": [{"text": "..."}]}]}`
fn message_history(response: &Value) -> Option<String> {
    response
        .get("messages")?
        .as_array()?
        .last()?
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|part| part.get("text"))
        .and_then(non_empty)
}

// `{"completion": "..."}`
fn legacy_completion(response: &Value) -> Option<String> {
    non_empty(response.get("completion")?)
}

fn non_empty(text: &Value) -> Option<String> {
    let text = text.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
