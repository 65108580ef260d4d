use crate::config::{AlertConfig, TwilioConfig};
use crate::http::*;
use crate::NotifyError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};

/// What is spoken on each alert call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertScript {
    pub announcement: String,
    pub spelling: String,
}

impl AlertScript {
    pub fn new(publisher: &str, stock_name: &str) -> Self {
        let sentence = format!("{publisher} has released a short report on {stock_name}.");
        Self {
            announcement: format!("Hello, Short report alert! {sentence} {sentence}"),
            spelling: spell(stock_name),
        }
    }

    /// Render as inline TwiML: a one second pause, the announcement, then the spelling.
    pub fn twiml(&self) -> String {
        format!(
            "<Response>\
                <Pause length=\"1\"/>\
                <Say voice=\"alice\" language=\"en-US\">{}</Say>\
                <Say voice=\"alice\" language=\"en-US\">{}</Say>\
            </Response>",
            escape_xml(&self.announcement),
            escape_xml(&self.spelling),
        )
    }
}

/// Spell `name` letter by letter, each followed by a full stop so the voice pauses.
///
/// ```rust
/// use shortwatch_spider::notify::spell;
///
/// assert_eq!(spell("AB"), "A. B.");
/// ```
pub fn spell(name: &str) -> String {
    let letters: Vec<String> = name.chars().map(String::from).collect();
    format!("{}.", letters.join(". "))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Provider acknowledgement of a placed call.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CallReceipt {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Something that can place an outbound call speaking `twiml`.
#[async_trait]
pub trait Telephony: Send + Sync {
    async fn place_call(
        &self,
        to: &str,
        from: &str,
        twiml: &str,
    ) -> Result<CallReceipt, NotifyError>;
}

/// [`Telephony`] over the Twilio REST API.
pub struct TwilioClient {
    http_client: HttpClient,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(http_client: HttpClient, config: TwilioConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl Telephony for TwilioClient {
    async fn place_call(
        &self,
        to: &str,
        from: &str,
        twiml: &str,
    ) -> Result<CallReceipt, NotifyError> {
        let url = format!(
            "{base}/2010-04-01/Accounts/{sid}/Calls.json",
            base = self.config.api_url.trim_end_matches('/'),
            sid = self.config.account_sid,
        );

        let response = self
            .http_client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", from), ("Twiml", twiml)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Places one alert call per configured number.
pub struct Notifier<T> {
    telephony: T,
    config: AlertConfig,
}

impl<T: Telephony> Notifier<T> {
    pub fn new(telephony: T, config: AlertConfig) -> Self {
        Self { telephony, config }
    }

    pub fn telephony(&self) -> &T {
        &self.telephony
    }

    /// Call every configured number, in order, announcing `stock_name`.
    ///
    /// A failed call does not stop the remaining ones; if any failed, the
    /// whole alert is reported as [`NotifyError::Incomplete`].
    pub async fn notify(&self, stock_name: &str) -> Result<Vec<CallReceipt>, NotifyError> {
        let twiml = AlertScript::new(&self.config.publisher, stock_name).twiml();
        debug!("alert script: {twiml}");

        info!("triggering phone calls for stock: {stock_name}");
        let total = self.config.to_numbers.len();
        let mut receipts = Vec::with_capacity(total);
        for number in &self.config.to_numbers {
            match self
                .telephony
                .place_call(number, &self.config.from_number, &twiml)
                .await
            {
                Ok(receipt) => {
                    info!("call initiated to {number}, call SID: {}", receipt.sid);
                    receipts.push(receipt);
                }
                Err(err) => error!("failed to place call to {number}, error({err})"),
            }
        }

        let failed = total - receipts.len();
        if failed > 0 {
            return Err(NotifyError::Incomplete { failed, total });
        }

        Ok(receipts)
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
