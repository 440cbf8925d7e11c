use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn clearmark_cmd() -> Command {
    let mut cmd = Command::cargo_bin("clearmark").expect("Failed to find clearmark binary");
    cmd.env_remove("CLEARMARK_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_frame(path: &Path, width: u32, height: u32, mark: Option<(u32, u32, u32, u32)>) {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    if let Some((x0, y0, x1, y1)) = mark {
        for y in y0..y1 {
            for x in (x0..x1).step_by(2) {
                img.put_pixel(x, y, Rgb([10, 10, 10]));
            }
        }
    }
    img.save(path).unwrap();
}

#[test]
fn test_help_lists_commands() {
    clearmark_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("process"))
        .stdout(contains("serve"));
}

#[test]
fn test_detect_prints_region_json() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let marked = dir.path().join("marked.png");
    let clean = dir.path().join("clean.png");

    let mut img = RgbImage::from_pixel(1280, 720, Rgb([255, 255, 255]));
    for y in 660..700 {
        for x in 780..980 {
            img.put_pixel(x, y, Rgb([20, 20, 20]));
        }
    }
    img.save(&marked)?;
    write_frame(&clean, 320, 240, None);

    clearmark_cmd()
        .arg("detect")
        .arg(&marked)
        .arg(&clean)
        .assert()
        .success()
        .stdout(contains(r#""region":{"left":780,"top":660,"width":199,"height":23}"#))
        .stdout(contains(r#""region":null"#));
    Ok(())
}

#[test]
fn test_detect_fails_on_undecodable_image() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"not an image")?;

    clearmark_cmd()
        .arg("detect")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(contains("Error:"));
    Ok(())
}

#[test]
fn test_process_nonexistent_input_fails() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;
    clearmark_cmd()
        .args(["process", "-i", "/definitely/not/here.mp4", "-o"])
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("Invalid input path"));
    Ok(())
}

#[test]
fn test_process_directory_without_videos_succeeds() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    std::fs::write(input_dir.path().join("readme.txt"), "no videos here")?;

    clearmark_cmd()
        .arg("process")
        .arg("-i")
        .arg(input_dir.path())
        .arg("-o")
        .arg(output_dir.path())
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_invalid_env_override_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let frame = dir.path().join("frame_0001.png");
    write_frame(&frame, 64, 64, None);

    clearmark_cmd()
        .env("CLEARMARK_FPS", "fast")
        .arg("detect")
        .arg(&frame)
        .assert()
        .failure()
        .stderr(contains("CLEARMARK_FPS"));
    Ok(())
}

#[test]
fn test_erase_with_blur_mirrors_frames() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    write_frame(
        &input_dir.path().join("frame_0001.png"),
        200,
        200,
        Some((130, 182, 170, 188)),
    );
    write_frame(&input_dir.path().join("frame_0002.png"), 200, 200, None);

    clearmark_cmd()
        .arg("erase")
        .arg("-i")
        .arg(input_dir.path())
        .arg("-o")
        .arg(output_dir.path())
        .args(["--blur", "3"])
        .assert()
        .success()
        .stdout(contains("1 erased"));

    assert!(output_dir.path().join("frame_0001.png").is_file());
    assert!(output_dir.path().join("frame_0002.png").is_file());
    Ok(())
}
