//! Top-level command execution: wire CLI arguments into a configured
//! pipeline run and write the artifacts.

use crate::cli::Cli;
use crate::config::PipelineConfig;
use crate::io::artifact::{artifact_from_navigable, write_json};
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Rayon thread stack size (8MB)
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Configure rayon global thread pool once at startup
pub fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(RAYON_STACK_SIZE);

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        // Already configured - this is fine, just ignore
        eprintln!("Note: Thread pool already configured: {}", e);
    }
}

/// Merge CLI overrides into the loaded configuration.
fn apply_overrides(mut config: PipelineConfig, cli: &Cli) -> PipelineConfig {
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if cli.no_parallel {
        config.parallel.enabled = false;
    }
    if cli.jobs > 0 {
        config.parallel.max_concurrency = Some(cli.jobs);
    }
    config
}

/// Run the full pipeline and write the navigable result artifact.
pub fn run(cli: Cli) -> Result<()> {
    let config = apply_overrides(PipelineConfig::load(cli.config.as_deref())?, &cli);
    configure_thread_pool(cli.jobs);

    let output_path = config.output_path.clone();
    let mut pipeline = Pipeline::new(config)?;
    let navigable = pipeline.run(cli.force)?;

    write_json(&output_path, &artifact_from_navigable(&navigable))?;

    if let Some(maps_path) = &cli.dump_maps {
        pipeline.dump_stage_maps(maps_path)?;
    }
    Ok(())
}
