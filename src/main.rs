#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use zbxwatch::cli;
use zbxwatch::daemon::{self, config::WatcherConfiguration, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Settings may come from a .env file; real environment variables win
    dotenvy::dotenv().ok();
    let args = cli::parse_args();

    logging::init_logger()?;
    log::info!("Zabbix media watcher started");

    let config = WatcherConfiguration::resolve(args).context("Failed to load configuration")?;

    daemon::run_daemon(config).await
}
