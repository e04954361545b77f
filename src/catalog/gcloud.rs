//! Thin wrappers around the `gcloud` CLI for credentials and project
//! discovery.

use std::path::Path;

use color_eyre::eyre::{eyre, Result};
use tokio::process::Command;

use super::Project;

const GCLOUD: &str = "gcloud";

/// The project of the active gcloud configuration, if one is set.
pub fn default_project() -> Option<String> {
  let output = std::process::Command::new(GCLOUD).args(["config", "get-value", "project"]).output().ok()?;
  if !output.status.success() {
    return None;
  }
  parse_config_value(&String::from_utf8_lossy(&output.stdout))
}

fn parse_config_value(raw: &str) -> Option<String> {
  let value = raw.trim();
  if value.is_empty() || value == "(unset)" {
    None
  } else {
    Some(value.to_string())
  }
}

pub async fn access_token() -> Result<String> {
  let stdout = run(&["auth", "print-access-token"]).await?;
  let token = stdout.trim().to_string();
  if token.is_empty() {
    return Err(eyre!("gcloud returned an empty access token"));
  }
  Ok(token)
}

pub async fn activate_service_account(key_file: &Path) -> Result<()> {
  let key_file = key_file.to_string_lossy();
  run(&["auth", "activate-service-account", "--key-file", key_file.as_ref()]).await?;
  Ok(())
}

pub async fn list_projects() -> Result<Vec<Project>> {
  let stdout = run(&["projects", "list", "--format=value(projectId,name)"]).await?;
  Ok(parse_project_list(&stdout))
}

/// Parses `projectId<whitespace>name` lines; the name defaults to the id.
fn parse_project_list(raw: &str) -> Vec<Project> {
  let mut projects: Vec<Project> = raw
    .lines()
    .filter_map(|line| {
      let mut parts = line.split_whitespace();
      let id = parts.next()?.to_string();
      let name = parts.collect::<Vec<_>>().join(" ");
      let name = if name.is_empty() { id.clone() } else { name };
      Some(Project { id, name })
    })
    .collect();
  projects.sort_by(|a, b| a.id.cmp(&b.id));
  projects
}

async fn run(args: &[&str]) -> Result<String> {
  let output =
    Command::new(GCLOUD).args(args).output().await.map_err(|e| eyre!("Failed to execute gcloud: {}", e))?;
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(eyre!("gcloud {} failed: {}", args.join(" "), stderr.trim()));
  }
  Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
