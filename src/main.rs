use anyhow::{Context, Result};
use tracing::{info, warn};

use histcarve::{cli, config, logging, pipeline, sources, util};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let mut cfg = loaded.config;
    if let Some(max_results) = cli_opts.max_results {
        cfg.max_results = max_results;
    }
    if let Some(temp_dir) = cli_opts.temp_dir.clone() {
        cfg.temp_dir = Some(temp_dir);
    }
    let unknown_families = util::filter_families(&mut cfg, cli_opts.families.as_deref());
    for unknown in unknown_families {
        warn!("unknown browser family in --families: {unknown}");
    }
    if cli_opts.families.is_some() && cfg.families.is_empty() {
        warn!("no browser families enabled after applying --families filter");
    }

    let output_dir = cli_opts
        .output
        .clone()
        .unwrap_or_else(util::default_output_dir);
    util::ensure_output_dir(&output_dir)
        .with_context(|| format!("preparing output directory {}", output_dir.display()))?;

    let temp_root = cfg.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&temp_root)
        .with_context(|| format!("preparing snapshot directory {}", temp_root.display()))?;

    info!(
        "starting run_id={} output={} max_results={} families={} config_hash={}",
        cfg.run_id,
        output_dir.display(),
        cfg.max_results,
        cfg.families.len(),
        loaded.config_hash
    );

    let opts = pipeline::RunOptions {
        max_results: cfg.max_results,
        temp_root,
        format: util::format_from_cli(cli_opts.format),
        generated_at: chrono::Utc::now(),
    };
    let ctx = sources::TemplateContext::from_system();
    let summary = pipeline::run_pipeline(&cfg.families, &ctx, &output_dir, &opts);

    info!(
        "histcarve run finished: {} sources found, {} failed, {} records in {} files under {}",
        summary.sources_found(),
        summary.sources_failed(),
        summary.records_exported(),
        summary.exports().len(),
        summary.output_dir.display()
    );
    Ok(())
}
