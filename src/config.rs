use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::sources::QuerySpec;

#[derive(Debug, Deserialize, Clone)]
pub struct FamilyConfig {
    pub name: String,
    pub query: QuerySpec,
    pub paths: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub run_id: String,
    /// Per-source row cap.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Where snapshots are created; the OS temp dir when unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    pub families: Vec<FamilyConfig>,
}

fn default_max_results() -> u32 {
    1000
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p).with_context(|| format!("reading config {}", p.display()))?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes).context("parsing config")?;
    validate(&config)?;
    if config.run_id.trim().is_empty() {
        config.run_id = generate_run_id();
    }

    let config_hash = hash_bytes(&bytes);

    Ok(LoadedConfig { config, config_hash })
}

fn validate(config: &Config) -> Result<()> {
    if config.max_results == 0 {
        bail!("max_results must be at least 1");
    }
    let mut names = HashSet::new();
    for family in &config.families {
        let name = family.name.trim();
        if name.is_empty() {
            bail!("browser family with empty name");
        }
        if !names.insert(name.to_ascii_lowercase()) {
            bail!("duplicate browser family {name}");
        }
        family
            .query
            .validate()
            .with_context(|| format!("query for family {name}"))?;
    }
    Ok(())
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

fn generate_run_id() -> String {
    let now = chrono::Utc::now();
    format!("{}_{}", now.format("%Y%m%dT%H%M%SZ"), rand_suffix())
}

fn rand_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{:08x}", nanos)
}
