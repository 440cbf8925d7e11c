//! Walker behavior with the real eraser over frames on disk.

use clearmark_core::config::{EraseStrategy, EraserConfig};
use clearmark_core::external::StdCommandRunner;
use clearmark_core::processing::{walk, WalkOptions, WatermarkEraser};
use clearmark_core::scanner::DetectionParams;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_frames(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for index in 1..=4u32 {
        let mut img = RgbImage::from_pixel(160, 90, Rgb([250, 250, 250]));
        // Every other frame carries a mark in the bottom-right band.
        if index % 2 == 1 {
            for y in 82..86 {
                for x in (100..140).step_by(3) {
                    img.put_pixel(x, y, Rgb([10, 10, 10]));
                }
            }
        }
        img.save(dir.join(format!("frame_{index:04}.png")))?;
    }
    Ok(())
}

fn blur_config() -> EraserConfig {
    EraserConfig {
        strategy: EraseStrategy::Blur,
        blur_sigma: 2.0,
        ..EraserConfig::default()
    }
}

#[test]
fn test_walk_is_idempotent_into_fresh_directories() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempdir()?;
    write_frames(input.path())?;
    let first = tempdir()?;
    let second = tempdir()?;

    let eraser_config = blur_config();
    let detection = DetectionParams::default();
    let eraser = WatermarkEraser::new(&StdCommandRunner, &eraser_config, &detection);

    let summary_a = walk(input.path(), first.path(), &eraser, WalkOptions::default())?;
    let summary_b = walk(input.path(), second.path(), &eraser, WalkOptions::default())?;

    assert_eq!(summary_a, summary_b);
    assert_eq!(summary_a.erased, 2);
    assert_eq!(summary_a.untouched, 2);
    assert_eq!(summary_a.passed_through, 2);

    for index in 1..=4u32 {
        let name = format!("frame_{index:04}.png");
        assert_eq!(
            fs::read(first.path().join(&name))?,
            fs::read(second.path().join(&name))?,
            "{name} differs between runs"
        );
    }
    Ok(())
}

#[test]
fn test_walk_keeps_sequence_contiguous_when_eraser_fails() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempdir()?;
    write_frames(input.path())?;
    let output = tempdir()?;

    // A program that cannot be found fails every marked frame.
    let eraser_config = EraserConfig {
        program: "clearmark-missing-eraser-42".to_string(),
        ..EraserConfig::default()
    };
    let detection = DetectionParams::default();
    let eraser = WatermarkEraser::new(&StdCommandRunner, &eraser_config, &detection);

    let summary = walk(input.path(), output.path(), &eraser, WalkOptions::default())?;
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.untouched, 2);
    assert_eq!(summary.passed_through, 4);

    clearmark_core::frames::verify_contiguous(output.path(), "png", 4)?;
    Ok(())
}
