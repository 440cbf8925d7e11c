// clearmark-cli/src/commands/erase.rs
//
// Implementation of the `erase` command: walks an existing folder of frames
// and writes cleaned copies to a mirrored output folder.

use anyhow::bail;
use clearmark_core::external::StdCommandRunner;
use clearmark_core::processing::{walk, WalkOptions, WatermarkEraser};
use log::info;

use crate::cli::EraseArgs;
use crate::config::{apply_eraser_args, load_base_config};

pub fn run_erase(args: EraseArgs) -> anyhow::Result<()> {
    if !args.input_dir.is_dir() {
        bail!(
            "Input path '{}' is not a directory",
            args.input_dir.display()
        );
    }

    let config = load_base_config(&args.config)?;
    let config = apply_eraser_args(config, &args.eraser);
    config.validate()?;

    let runner = StdCommandRunner;
    let eraser = WatermarkEraser::new(&runner, &config.eraser, &config.detection);
    let options = WalkOptions {
        passthrough_unprocessed: config.passthrough_unprocessed,
        show_progress: config.show_progress,
    };

    info!(
        "Erasing watermarks from '{}' into '{}'",
        args.input_dir.display(),
        args.output_dir.display()
    );
    let summary = walk(&args.input_dir, &args.output_dir, &eraser, options)?;

    println!(
        "{} frames: {} erased, {} without watermark, {} copied through, {} failed",
        summary.total(),
        summary.erased,
        summary.untouched,
        summary.passed_through,
        summary.failed
    );
    Ok(())
}
