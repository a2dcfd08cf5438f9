use crate::render::{
    run_analytics, run_listings, run_predict, run_preview, AnalyticsArgs, FormArgs, ListingsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use property_insight::config::AppConfig;
use property_insight::error::AppError;
use property_insight::telemetry::{self, LogSink};

#[derive(Parser, Debug)]
#[command(
    name = "Property Insight",
    about = "Value properties, browse listings and chart the market from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Show the normalized record and model features for a property form
    Preview(FormArgs),
    /// Run both registered models and print the valuation report
    Predict(FormArgs),
    /// Filter listings and show their projected prices
    Listings(ListingsArgs),
    /// Render the market analytics charts as text
    Analytics(AnalyticsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Preview(args) => run_preview(&report_config()?, args),
        Command::Predict(args) => run_predict(&report_config()?, args).await,
        Command::Listings(args) => run_listings(&report_config()?, args),
        Command::Analytics(args) => run_analytics(&report_config()?, args),
    }
}

/// Reports print to stdout, so their logs go to stderr.
fn report_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    Ok(config)
}
