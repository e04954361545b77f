use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};

use crate::{catalog::gcloud, utils::version};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 1.0)]
  pub tick_rate: f64,

  #[arg(
    short('r'),
    long,
    value_name = "FLOAT",
    help = "Frame rate, i.e. number of frames per second",
    default_value_t = 4.0
  )]
  pub frame_rate: f64,

  #[arg(short('p'), long, value_name = "PROJECT_ID", help = "BigQuery project to open (defaults to the gcloud project)")]
  pub project: Option<String>,

  #[arg(long, value_name = "PATH", help = "Service account key file")]
  pub credentials: Option<PathBuf>,

  #[arg(long, value_name = "URL", help = "BigQuery emulator endpoint; disables authentication")]
  pub emulator: Option<String>,

  #[arg(long, env = "BQ_CRAFTER_ACCESS_TOKEN", hide_env_values = true, value_name = "TOKEN", help = "OAuth access token")]
  pub access_token: Option<String>,

  #[arg(long, help = "Do not read or write the local metadata cache")]
  pub no_cache: bool,
}

impl Cli {
  /// Checks that can fail before the terminal is taken over.
  pub fn validate(&self) -> Result<()> {
    if let Some(path) = &self.credentials {
      if !path.exists() {
        return Err(eyre!("credentials file not found: {}", path.display()));
      }
    }
    if self.tick_rate <= 0.0 || self.frame_rate <= 0.0 {
      return Err(eyre!("tick and frame rates must be positive"));
    }
    Ok(())
  }

  /// The project to open: the flag, then `GOOGLE_CLOUD_PROJECT`, then
  /// `GCP_PROJECT`, then the active gcloud configuration.
  pub fn resolve_project(&self) -> Result<String> {
    self.resolve_project_with(|name| std::env::var(name).ok(), gcloud::default_project)
  }

  pub fn resolve_project_with(
    &self,
    env: impl Fn(&str) -> Option<String>,
    gcloud_default: impl FnOnce() -> Option<String>,
  ) -> Result<String> {
    let non_empty = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    non_empty(self.project.clone())
      .or_else(|| non_empty(env("GOOGLE_CLOUD_PROJECT")))
      .or_else(|| non_empty(env("GCP_PROJECT")))
      .or_else(|| non_empty(gcloud_default()))
      .ok_or_else(|| eyre!("no project found. Run 'gcloud config set project PROJECT_ID' or pass --project"))
  }
}
