mod cli;
mod watch;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level, and open the .env file
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // set the trace level
    preprocess(match cli.trace.unwrap_or(TraceLevel::INFO) {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::ERROR => Level::ERROR,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::TRACE => Level::TRACE,
        TraceLevel::WARN => Level::WARN,
    })?;
    trace!("command line input recorded: {cli:?}");

    // read cli inputs
    use cli::Commands::*;
    match cli.command.unwrap_or(Run) {
        // `shortwatch [run]`: one scheduled pass
        Run => watch::run().await?,

        // `shortwatch reset`: drop the stored validators
        Reset => watch::reset().await?,

        // `shortwatch preview <STOCK>`: print the TwiML only
        Preview { stock } => watch::preview(&stock),
    }

    Ok(())
}
