use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sets the level of tracing (default: INFO).
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the feed once; on a new report, extract the stock and phone the alert list.
    Run,

    /// Forget the stored ETag/Last-Modified, so the next run treats the feed as new.
    Reset,

    /// Print the call script for a stock name, without calling anyone.
    Preview {
        /// The stock name to announce.
        stock: String,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}
