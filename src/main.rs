use std::{process, sync::Arc};

use clap::Parser;
use log::{error, info, LevelFilter};
use tokio::sync::Mutex;

use quotebin::{App, Cli, Config, FileStore, KeyValueStore, QuoteStore, Result, SettingsStore};

pub fn initialize_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let local: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.store_path())?);
    let settings = SettingsStore::load(Arc::clone(&local));
    let quotes = QuoteStore::new(&config, local);

    let app = App::new(
        Arc::new(Mutex::new(quotes)),
        Arc::new(Mutex::new(settings)),
        cli.offline,
    );
    app.run(cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    info!("Application shutting down");
}
