use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pv_design_core::{config::Config, telemetry::init_tracing, CalculationRequest};
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    init_tracing(&cfg.logging);

    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: pv-design <request.toml|request.json>")?;

    let request = read_request(&path)?;
    info!(path = %path.display(), design = %request.design.name, "running calculation");

    let report = request.run(&cfg)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_request(path: &Path) -> Result<CalculationRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let request = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON request {}", path.display()))?,
        _ => toml::from_str(&raw)
            .with_context(|| format!("invalid TOML request {}", path.display()))?,
    };
    Ok(request)
}
