//! # aq_server
//!
//! Serves daily PM2.5 forecasts over HTTP and exports the feature table.

use aq_forecast::export::write_features_file;
use aq_forecast::ForecastPipeline;
use aq_server::config::{Cli, Command, ServeConfig};
use aq_server::{app, ServerError};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn serve(config: ServeConfig) -> Result<(), ServerError> {
    // Startup is all-or-nothing; the listener only binds once the service is ready.
    let service = ForecastPipeline::bootstrap(&config.data.data, &config.model)?;

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        "aq_server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?
    );

    axum::serve(listener, app(Arc::new(service)))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    match cli.command {
        Command::Serve(config) => serve(config).await,
        Command::Features { data, output } => {
            let index = ForecastPipeline::index_from_path(&data.data)?;
            write_features_file(&index, &output)?;
            println!("Wrote {} feature rows to {}", index.len(), output.display());
            Ok(())
        }
        Command::Range { data } => {
            let index = ForecastPipeline::index_from_path(&data.data)?;
            if let Some((min, max)) = index.range() {
                println!("{} to {} ({} dates)", min, max, index.len());
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aq_server=info,aq_forecast=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
