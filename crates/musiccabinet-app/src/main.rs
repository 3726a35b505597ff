use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use musiccabinet_app::application::services::ConfigService;
use musiccabinet_app::presentation::bootstrap::build_app_state;
use musiccabinet_app::presentation::cli::{self, Cli};
use musiccabinet_infrastructure::logging::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = match &args.config_dir {
        Some(dir) => ConfigService::in_dir(dir)?,
        None => ConfigService::new()?,
    };
    let config = Arc::new(config);

    init_logger(&config.log_dir(), config.get_log_level().as_str())?;
    tracing::info!("🚀 MusicCabinet {} starting...", env!("CARGO_PKG_VERSION"));

    let state = build_app_state(config, args.database.as_deref()).await?;
    cli::run(args.command, &state).await
}
