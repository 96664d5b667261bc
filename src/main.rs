mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use weathermaker_core::Config;
use weathermaker_forecast::HttpForecastCollector;
use weathermaker_postcard::PostcardComposer;
use weathermaker_store::ForecastStore;

use cli::{Cli, Command};
use error::AppError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    weathermaker_core::init(cli.verbosity());

    run(cli).await.map_err(report)
}

/// User-facing message on top, the underlying error as its cause
fn report(e: AppError) -> anyhow::Error {
    let hint = e.user_message();
    anyhow::Error::new(e).context(hint)
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    let collector = HttpForecastCollector::from_config(&config.provider)?;
    let store = ForecastStore::open(&config.storage.database_path)?;
    let mut out = std::io::stdout();

    match cli.command {
        Command::StoreForecast { start, end } => {
            let forecast = commands::store_forecast(&collector, &store, start, end).await?;
            writeln!(out, "Stored {} day(s) from {} to {}", forecast.len(), start, end)?;
        }
        Command::GetForecast { start, end, format } => {
            commands::get_forecast(&store, start, end, format, &mut out)?;
        }
        Command::MakeImage { date, window_name } => {
            let composer = PostcardComposer::new(&config.postcard)?;
            let path = commands::make_image(&collector, &composer, date, &window_name).await?;
            writeln!(out, "Postcard written to {}", path.display())?;
        }
        Command::Recent { days } => {
            let today = chrono::Local::now().date_naive();
            commands::recent(&collector, &store, today, days, &mut out).await?;
        }
    }

    Ok(())
}
