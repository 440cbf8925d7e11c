// clearmark-cli/src/commands/detect.rs
//
// Implementation of the `detect` command: prints one JSON object per image,
// `{"path": ..., "region": {...}}`, with `region` null when nothing is found.

use anyhow::Context;
use clearmark_core::{detect_file, Region};
use serde::Serialize;
use std::io::{self, Write};

use crate::cli::DetectArgs;
use crate::config::load_base_config;

#[derive(Debug, Serialize)]
struct DetectionLine {
    path: String,
    region: Option<Region>,
}

pub fn run_detect(args: DetectArgs) -> anyhow::Result<()> {
    let config = load_base_config(&args.config)?;
    config.detection.validate()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for path in &args.images {
        let region = detect_file(path, &config.detection)
            .with_context(|| format!("Failed to scan '{}'", path.display()))?;
        let line = DetectionLine {
            path: path.display().to_string(),
            region,
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }
    Ok(())
}
