#![allow(dead_code)]

use async_trait::async_trait;
use shortwatch_spider::cache::{CacheRecord, ValidatorStore};
use shortwatch_spider::config::{AlertConfig, AnthropicConfig, FeedConfig};
use shortwatch_spider::notify::{CallReceipt, Telephony};
use shortwatch_spider::{CacheError, NotifyError};
use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Reports</title>
<item><title>Muddy Waters is short Alpha Corp</title></item>
</channel></rss>"#;

pub fn feed_config(base: &str) -> FeedConfig {
    FeedConfig {
        url: format!("{base}/feed/"),
    }
}

pub fn anthropic_config(base: &str) -> AnthropicConfig {
    AnthropicConfig {
        api_key: "sk-test".to_string(),
        api_url: format!("{base}/v1/messages"),
        model: "claude-3-5-haiku-20241022".to_string(),
        max_tokens: 100,
    }
}

pub fn alert_config(numbers: &[&str]) -> AlertConfig {
    AlertConfig {
        from_number: "+15550000000".to_string(),
        to_numbers: numbers.iter().map(|n| n.to_string()).collect(),
        publisher: "Muddywaters".to_string(),
    }
}

/// A phone line that records every call, failing for the numbers in `unreachable`.
#[derive(Default)]
pub struct RecordingPhone {
    pub calls: Mutex<Vec<PlacedCall>>,
    pub unreachable: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct PlacedCall {
    pub to: String,
    pub from: String,
    pub twiml: String,
}

impl RecordingPhone {
    pub fn failing_for(number: &str) -> Self {
        Self {
            unreachable: vec![number.to_string()],
            ..Default::default()
        }
    }

    pub fn placed(&self) -> Vec<PlacedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Telephony for RecordingPhone {
    async fn place_call(
        &self,
        to: &str,
        from: &str,
        twiml: &str,
    ) -> Result<CallReceipt, NotifyError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(PlacedCall {
            to: to.to_string(),
            from: from.to_string(),
            twiml: twiml.to_string(),
        });

        if self.unreachable.iter().any(|n| n == to) {
            return Err(NotifyError::Provider {
                status: 400,
                body: "unreachable".to_string(),
            });
        }

        Ok(CallReceipt {
            sid: format!("CA{:04}", calls.len()),
            status: Some("queued".to_string()),
        })
    }
}

/// A store that starts empty and rejects every write.
#[derive(Default)]
pub struct FailingStore {
    pub save_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValidatorStore for FailingStore {
    async fn load(&self) -> Result<CacheRecord, CacheError> {
        Ok(CacheRecord::default())
    }

    async fn save(&self, _record: &CacheRecord) -> Result<(), CacheError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Io(Error::new(
            ErrorKind::PermissionDenied,
            "read-only state directory",
        )))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
