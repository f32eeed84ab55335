//! # Utility Module
//!
//! Family filtering, output directory preparation and small helpers shared
//! by the binary and the pipeline.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
#[cfg(unix)]
use tracing::warn;

use crate::config::Config;
use crate::metadata::ExportFormat;

/// Convert CLI output format to the export enum
pub fn format_from_cli(format: crate::cli::OutputFormat) -> ExportFormat {
    match format {
        crate::cli::OutputFormat::Csv => ExportFormat::Csv,
        crate::cli::OutputFormat::Jsonl => ExportFormat::Jsonl,
    }
}

/// Keep only the requested families (case-insensitive). Returns requested
/// names that matched nothing.
pub fn filter_families(cfg: &mut Config, names: Option<&[String]>) -> Vec<String> {
    let Some(names) = names else {
        return Vec::new();
    };
    let wanted: Vec<String> = names
        .iter()
        .map(|n| n.trim().to_ascii_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    let unknown = wanted
        .iter()
        .filter(|w| !cfg.families.iter().any(|f| f.name.eq_ignore_ascii_case(w)))
        .cloned()
        .collect();

    cfg.families
        .retain(|f| wanted.iter().any(|w| f.name.eq_ignore_ascii_case(w)));
    unknown
}

/// Desktop, then home, then `./output`.
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("./output"))
}

/// Ensure output directory exists and is writable, warning on unsafe permissions.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(anyhow!(
                "output path is not a directory: {}",
                path.display()
            ));
        }
    } else {
        std::fs::create_dir_all(path)?;
    }

    let probe_path = path.join(".histcarve_write_probe");
    match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe_path);
        }
        Err(err) => {
            return Err(anyhow!(
                "output directory is not writable: {} ({})",
                path.display(),
                err
            ));
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o002 != 0 {
            warn!("output directory is world-writable: {}", path.display());
        }
    }

    Ok(())
}

/// Reduce a family name to something usable in file names.
pub fn file_safe(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
