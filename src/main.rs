use std::sync::Arc;

use bq_crafter::{
  app::App,
  cache::{CatalogCache, DiskCache, NoCache},
  catalog::bigquery::{BigQueryClient, ClientOptions},
  cli::Cli,
  clipboard::SystemClipboard,
  config::Config,
  utils::{get_cache_dir, initialize_logging, initialize_panic_handler},
};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

async fn tokio_main() -> Result<()> {
  initialize_logging()?;

  initialize_panic_handler()?;

  let args = Cli::parse();
  args.validate()?;
  let project = args.resolve_project()?;
  let config = Config::new().wrap_err("failed to load configuration")?;

  let options = ClientOptions {
    access_token: args.access_token.clone(),
    credentials: args.credentials.clone(),
    emulator: args.emulator.clone(),
  };
  let catalog = BigQueryClient::connect(&project, options).await?;

  let cache: Arc<dyn CatalogCache> = if args.no_cache || !config.cache.enabled {
    Arc::new(NoCache)
  } else {
    Arc::new(DiskCache::new(get_cache_dir(), config.cache.ttl_hours))
  };

  tracing::info!("opening project {project}");
  let mut app = App::new(config, &project, Arc::new(catalog), cache, Arc::new(SystemClipboard::new()))
    .tick_rate(args.tick_rate)
    .frame_rate(args.frame_rate);
  app.run().await?;

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
