//! Sample runner for the managed MySQL service client.
//!
//! Picks a scenario from the command line, runs it against the
//! configured control plane and cleans up any left-over resources when
//! the scenario fails or the process is interrupted.

use ::std::{process::ExitCode, sync::Arc};

use ::mydbs_client::{Credentials, ResourceClient};
use ::mydbs_common::{
    config::{Args, Config, Sample},
    error::Result,
    tokio,
    tracing::{error, info},
    tracing_subscriber,
};
use ::mydbs_manager::{
    backup::BackupManager,
    db_instance::DbInstanceManager,
    shutdown::{run_with_cleanup, CleanupSettings, ManagerPair, ShutdownRegistry},
};

mod backup_sample;
mod db_instance_sample;
mod setup;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    match run().await {
        Ok(()) => {
            info!("Sample finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Sample failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse_args();
    let config = Config::read_config(&args.config_path)?;
    let credentials = config.credentials.as_ref().map(Credentials::from_config);
    let client = ResourceClient::new(&config.endpoint, credentials);

    let pair = ManagerPair {
        instances: Arc::new(DbInstanceManager::new(client.clone(), &config)),
        backups: Arc::new(BackupManager::new(client, &config)),
    };
    let registry = ShutdownRegistry::global();
    registry.register(pair.clone());
    let settings = CleanupSettings::from(&config.cleanup);

    match args.sample {
        Sample::DbInstance => {
            run_with_cleanup(registry, &settings, db_instance_sample::run(&pair, &config)).await
        }
        Sample::Backup => {
            run_with_cleanup(registry, &settings, backup_sample::run(&pair, &config)).await
        }
    }
}
