// clearmark-cli/src/config.rs
//
// Resolves the effective `CoreConfig` for a command. Layers apply in order:
// built-in defaults, the `--config` TOML file, `CLEARMARK_*` environment
// variables, then command-line flags. A flag only overrides when given.

use anyhow::Context;
use clearmark_core::config::{CoreConfigBuilder, EraseStrategy};
use clearmark_core::CoreConfig;

use crate::cli::{ConfigArgs, EraserArgs, PipelineArgs};

/// Builds the defaults + file + environment layers, then applies the
/// detection flags.
pub fn load_base_config(args: &ConfigArgs) -> anyhow::Result<CoreConfig> {
    let mut config = match &args.config {
        Some(path) => CoreConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        None => CoreConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid CLEARMARK_* environment variable")?;

    let mut builder = CoreConfigBuilder::from_config(config);
    if let Some(threshold) = args.threshold {
        builder = builder.luma_threshold(threshold);
    }
    Ok(builder.build())
}

/// Applies the eraser flags.
///
/// `--eraser-program` replaces the whole invocation: the default script
/// argument is dropped unless `--eraser-arg` supplies arguments again.
pub fn apply_eraser_args(config: CoreConfig, args: &EraserArgs) -> CoreConfig {
    let program = args
        .eraser_program
        .clone()
        .or_else(|| (!args.eraser_args.is_empty()).then(|| config.eraser.program.clone()));
    let mut builder = CoreConfigBuilder::from_config(config);
    if let Some(program) = program {
        builder = builder.eraser_command(program, args.eraser_args.clone());
    }
    if let Some(sigma) = args.blur {
        builder = builder.erase_strategy(EraseStrategy::Blur).blur_sigma(sigma);
    }
    if args.no_passthrough {
        builder = builder.passthrough_unprocessed(false);
    }
    if args.progress {
        builder = builder.show_progress(true);
    }
    builder.build()
}

/// Applies the ffmpeg pipeline flags.
pub fn apply_pipeline_args(config: CoreConfig, args: &PipelineArgs) -> CoreConfig {
    let mut builder = CoreConfigBuilder::from_config(config);
    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir.clone());
    }
    if let Some(fps) = args.fps {
        builder = builder.fps(fps);
    }
    if args.keep_intermediates {
        builder = builder.keep_intermediates(true);
    }
    if args.no_audio {
        builder = builder.merge_audio(false);
    }
    builder.build()
}
