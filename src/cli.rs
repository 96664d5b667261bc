use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use weathermaker_core::Verbosity;

/// Fetch daily forecasts, keep them in a local database and render postcards
#[derive(Debug, Parser)]
#[command(name = "weathermaker", version, about)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every day from START to END (inclusive) and save it
    StoreForecast {
        /// First day, YYYY-MM-DD
        start: NaiveDate,
        /// Last day, YYYY-MM-DD
        end: NaiveDate,
    },

    /// Print stored forecasts from START to END (inclusive)
    GetForecast {
        start: NaiveDate,
        end: NaiveDate,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Render a postcard for DATE into WINDOW_NAME.png
    MakeImage {
        date: NaiveDate,
        window_name: String,
    },

    /// Store and print the last few days, ending today
    Recent {
        #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("weathermaker").chain(args.iter().copied()))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_store_forecast_dates() {
        let cli = parse(&["store-forecast", "2021-06-19", "2021-06-21"]).unwrap();
        match cli.command {
            Command::StoreForecast { start, end } => {
                assert_eq!(start, date("2021-06-19"));
                assert_eq!(end, date("2021-06-21"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(parse(&["store-forecast", "2021-13-01", "2021-06-21"]).is_err());
        assert!(parse(&["get-forecast", "yesterday", "2021-06-21"]).is_err());
    }

    #[test]
    fn test_get_forecast_format() {
        let cli = parse(&["get-forecast", "2021-06-19", "2021-06-21"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::GetForecast { format: OutputFormat::Text, .. }
        ));

        let cli = parse(&["get-forecast", "2021-06-19", "2021-06-21", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::GetForecast { format: OutputFormat::Json, .. }
        ));
    }

    #[test]
    fn test_make_image_args() {
        let cli = parse(&["make-image", "2021-06-01", "Postcard"]).unwrap();
        match cli.command {
            Command::MakeImage { date: d, window_name } => {
                assert_eq!(d, date("2021-06-01"));
                assert_eq!(window_name, "Postcard");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_recent_defaults_to_a_week() {
        let cli = parse(&["recent"]).unwrap();
        assert!(matches!(cli.command, Command::Recent { days: 7 }));
        assert!(parse(&["recent", "--days", "0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["recent", "-v", "--config", "/tmp/wm.toml"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/wm.toml")));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(parse(&["-v", "-q", "recent"]).is_err());
        assert_eq!(parse(&["-q", "recent"]).unwrap().verbosity(), Verbosity::Quiet);
    }
}
