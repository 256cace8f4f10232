//! Command-line and environment configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "aq_server")]
#[command(about = "Daily PM2.5 forecast service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the feature index, load the model and serve GET /forecast
    Serve(ServeConfig),

    /// Write the feature table used for training as CSV
    Features {
        #[command(flatten)]
        data: DataArgs,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the range of forecastable dates
    Range {
        #[command(flatten)]
        data: DataArgs,
    },
}

/// Location of the daily observation file
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Daily observation file (CSV or Parquet)
    #[arg(short, long, env = "AQ_DATA_PATH", default_value = "data/agrimonia_daily.csv")]
    pub data: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Address to bind
    #[arg(long, env = "AQ_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "AQ_PORT", default_value_t = 8000)]
    pub port: u16,

    #[command(flatten)]
    pub data: DataArgs,

    /// Trained model artifact (JSON)
    #[arg(short, long, env = "AQ_MODEL_PATH", default_value = "models/aq_daily_model.json")]
    pub model: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "aq_server", "serve", "--port", "9000", "--data", "in.csv", "--model", "m.json",
        ])
        .unwrap();

        match cli.command {
            Command::Serve(config) => {
                assert_eq!(config.port, 9000);
                assert_eq!(config.data.data, PathBuf::from("in.csv"));
                assert_eq!(config.model, PathBuf::from("m.json"));
            }
            other => panic!("Expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_features_requires_output() {
        assert!(Cli::try_parse_from(["aq_server", "features"]).is_err());

        let cli = Cli::try_parse_from(["aq_server", "features", "-o", "out.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Features { .. }));
    }
}
