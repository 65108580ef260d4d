use shortwatch_spider::cache::{FileStore, ValidatorStore};
use shortwatch_spider::config::{self, Config};
use shortwatch_spider::extract::ExtractionClient;
use shortwatch_spider::feed::UpdateChecker;
use shortwatch_spider::notify::{AlertScript, Notifier, TwilioClient};
use shortwatch_spider::pipeline::{run_once, RunOutcome};
use tracing::{debug, error, info};

/// Run one poll → extract → notify pass.
pub(crate) async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(|err| {
        error!("invalid configuration: {err}");
        err
    })?;
    debug!("configuration loaded: feed {}", config.feed.url);

    let http_client = shortwatch_spider::std_client_build(&config.user_agent)?;
    let checker = UpdateChecker::new(
        http_client.clone(),
        config.feed,
        FileStore::new(&config.state_file),
    );
    let extractor = ExtractionClient::new(http_client.clone(), config.anthropic);
    let notifier = Notifier::new(TwilioClient::new(http_client, config.twilio), config.alert);

    match run_once(&checker, &extractor, &notifier).await {
        Ok(RunOutcome::Idle(status)) => debug!("finished without alerting: {status:?}"),
        Ok(RunOutcome::Alerted { stock, calls }) => {
            info!("alert for {stock} delivered to {} number(s)", calls.len())
        }
        Err(err) => {
            error!("run failed: {err}");
            return Err(err);
        }
    }

    Ok(())
}

/// Delete the stored validators.
pub(crate) async fn reset() -> anyhow::Result<()> {
    let path = config::state_file_from_env();
    FileStore::new(&path).clear().await?;
    info!("validators cleared from {path}");
    Ok(())
}

/// Print the TwiML an alert for `stock` would speak.
pub(crate) fn preview(stock: &str) {
    let publisher = config::publisher_from_env();
    println!("{}", AlertScript::new(&publisher, stock).twiml());
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
