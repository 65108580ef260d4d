//! One poll → extract → notify pass, as run by the scheduler.

use crate::cache::ValidatorStore;
use crate::extract::ExtractionClient;
use crate::feed::{FeedStatus, UpdateChecker};
use crate::notify::{CallReceipt, Notifier, Telephony};
use tracing::info;

#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing new (or nothing usable) in the feed.
    Idle(FeedStatus),

    /// The feed changed and every alert call was placed.
    Alerted {
        stock: String,
        calls: Vec<CallReceipt>,
    },
}

pub async fn run_once<S, T>(
    checker: &UpdateChecker<S>,
    extractor: &ExtractionClient,
    notifier: &Notifier<T>,
) -> anyhow::Result<RunOutcome>
where
    S: ValidatorStore,
    T: Telephony,
{
    let time = std::time::Instant::now();

    info!("checking for feed updates ...");
    let body = match checker.check_for_update().await {
        FeedStatus::Updated { body } if !body.trim().is_empty() => body,
        status => {
            info!("no update; nothing to do");
            return Ok(RunOutcome::Idle(status));
        }
    };

    let stock = extractor.extract_stock_name(&body).await;
    let calls = notifier.notify(&stock).await?;

    info!(
        "alerted {} number(s) about {stock}, {}",
        calls.len(),
        crate::time_elapsed(time)
    );

    Ok(RunOutcome::Alerted { stock, calls })
}
