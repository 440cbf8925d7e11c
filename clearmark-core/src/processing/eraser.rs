// ============================================================================
// clearmark-core/src/processing/eraser.rs
// ============================================================================
//
// WATERMARK ERASER: Detect, Then Erase One Frame
//
// The eraser decodes a frame, asks the scanner for the watermark box and, if
// one is found, produces a cleaned copy of the frame at the output path:
//
// - EraseStrategy::External runs the configured program as
//   `<program> [args...] <input> <output> <width> <height> <left> <top>`
//   and expects it to write the output file.
// - EraseStrategy::Blur blurs the region in-process and composites it back.
//
// A frame without a watermark is reported as EraseOutcome::NoWatermark and
// nothing is written; the walker decides what to do with it.

use std::path::Path;

use image::imageops;
use log::{debug, trace};

use crate::config::{EraseStrategy, EraserConfig};
use crate::error::{external_tool_error, CoreError, CoreResult};
use crate::external::CommandRunner;
use crate::scanner::{self, DetectionParams, Region};

/// Result of erasing a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseOutcome {
    /// The region was found and the cleaned frame written.
    Erased(Region),
    /// The frame has no detectable watermark.
    NoWatermark,
}

/// Something that can clean one frame from `input` into `output`.
pub trait FrameEraser {
    fn erase_frame(&self, input: &Path, output: &Path) -> CoreResult<EraseOutcome>;
}

/// The standard eraser: scanner plus one of the [`EraseStrategy`] backends.
pub struct WatermarkEraser<'a, R: CommandRunner> {
    runner: &'a R,
    eraser: &'a EraserConfig,
    detection: &'a DetectionParams,
}

impl<'a, R: CommandRunner> WatermarkEraser<'a, R> {
    pub fn new(runner: &'a R, eraser: &'a EraserConfig, detection: &'a DetectionParams) -> Self {
        Self {
            runner,
            eraser,
            detection,
        }
    }

    fn run_external(&self, input: &Path, output: &Path, region: Region) -> CoreResult<()> {
        let mut args = self.eraser.args.clone();
        args.extend([
            input.to_string_lossy().into_owned(),
            output.to_string_lossy().into_owned(),
            region.width.to_string(),
            region.height.to_string(),
            region.left.to_string(),
            region.top.to_string(),
        ]);

        let result = self.runner.run(&self.eraser.program, &args)?;
        if !result.stdout.trim().is_empty() {
            trace!("{}: {}", self.eraser.program, result.stdout.trim());
        }
        if !result.success() {
            let code = result
                .exit_code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(external_tool_error(
                &self.eraser.program,
                format!(
                    "exited with {code} for {}: {}",
                    input.display(),
                    result.stderr.trim()
                ),
            ));
        }
        if !output.is_file() {
            return Err(external_tool_error(
                &self.eraser.program,
                format!("reported success but wrote no {}", output.display()),
            ));
        }
        Ok(())
    }

    fn blur_region(
        &self,
        image: &image::DynamicImage,
        output: &Path,
        region: Region,
    ) -> CoreResult<()> {
        let patch = image
            .crop_imm(region.left, region.top, region.width, region.height)
            .blur(self.eraser.blur_sigma);
        let mut cleaned = image.clone();
        imageops::overlay(
            &mut cleaned,
            &patch,
            i64::from(region.left),
            i64::from(region.top),
        );
        cleaned.save(output).map_err(|source| CoreError::Encode {
            path: output.to_path_buf(),
            source,
        })
    }
}

impl<R: CommandRunner> FrameEraser for WatermarkEraser<'_, R> {
    fn erase_frame(&self, input: &Path, output: &Path) -> CoreResult<EraseOutcome> {
        let image = scanner::open_image(input)?;
        let Some(region) = scanner::detect(&image, self.detection) else {
            debug!("No watermark detected in {}", input.display());
            return Ok(EraseOutcome::NoWatermark);
        };

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match self.eraser.strategy {
            EraseStrategy::External => self.run_external(input, output, region)?,
            EraseStrategy::Blur => self.blur_region(&image, output, region)?,
        }

        trace!(
            "Erased {}x{} at ({}, {}) in {}",
            region.width,
            region.height,
            region.left,
            region.top,
            input.display()
        );
        Ok(EraseOutcome::Erased(region))
    }
}
