//! Watermark region detection by luminance thresholding.
//!
//! The watermark is assumed to sit in a fixed, screen-relative window in the
//! bottom-right corner of every frame. Within that window every pixel darker
//! than a threshold is treated as "ink", and the tight bounding box of the ink
//! is reported in the coordinate space of the full image.
//!
//! All functions here are pure over the pixel buffer; only [`detect_file`]
//! touches the filesystem.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Default luminance threshold (0-255). Pixels strictly below it are ink.
pub const DEFAULT_LUMA_THRESHOLD: u8 = 200;

/// Default horizontal start of the search window, as a fraction of width.
pub const DEFAULT_LEFT_FRACTION: f64 = 0.6;

/// Default vertical start of the search window, as a fraction of height.
pub const DEFAULT_TOP_FRACTION: f64 = 0.9;

/// Default search window width, as a fraction of image width.
pub const DEFAULT_WIDTH_FRACTION: f64 = 0.4;

/// Default search window height, as a fraction of image height.
pub const DEFAULT_HEIGHT_FRACTION: f64 = 0.05;

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clips the rectangle to an image of `image_width` x `image_height`.
    pub fn clip_to(&self, image_width: u32, image_height: u32) -> Region {
        let left = self.left.min(image_width);
        let top = self.top.min(image_height);
        Region {
            left,
            top,
            width: self.right().min(image_width) - left,
            height: self.bottom().min(image_height) - top,
        }
    }
}

/// Tunables for watermark detection.
///
/// The fractions place the coarse search window; the defaults encode the prior
/// that the watermark sits in the bottom-right corner of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub luma_threshold: u8,
    pub left_fraction: f64,
    pub top_fraction: f64,
    pub width_fraction: f64,
    pub height_fraction: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            luma_threshold: DEFAULT_LUMA_THRESHOLD,
            left_fraction: DEFAULT_LEFT_FRACTION,
            top_fraction: DEFAULT_TOP_FRACTION,
            width_fraction: DEFAULT_WIDTH_FRACTION,
            height_fraction: DEFAULT_HEIGHT_FRACTION,
        }
    }
}

impl DetectionParams {
    /// Checks that every fraction lies in `[0, 1]`.
    pub fn validate(&self) -> CoreResult<()> {
        let fractions = [
            ("left_fraction", self.left_fraction),
            ("top_fraction", self.top_fraction),
            ("width_fraction", self.width_fraction),
            ("height_fraction", self.height_fraction),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn scaled(dimension: u32, fraction: f64) -> u32 {
    // f64::round rounds halves away from zero, which is half-up for positives.
    (f64::from(dimension) * fraction).round() as u32
}

/// Computes the coarse search window for an image of the given size, clipped
/// to the image bounds.
pub fn search_region(width: u32, height: u32, params: &DetectionParams) -> Region {
    Region {
        left: scaled(width, params.left_fraction),
        top: scaled(height, params.top_fraction),
        width: scaled(width, params.width_fraction),
        height: scaled(height, params.height_fraction),
    }
    .clip_to(width, height)
}

/// Finds the ink bounding box inside an already-cropped luminance buffer.
///
/// Coordinates in the result are relative to `luma`. Mirrors the sentinel
/// scheme of the detector: minimums start at the buffer size, maximums at
/// zero, and the extent is `max - min`, so a box that collapses to zero width
/// or height is reported as no detection.
pub fn ink_bounds(luma: &GrayImage, threshold: u8) -> Option<Region> {
    let (width, height) = luma.dimensions();
    let (mut min_x, mut max_x) = (width, 0u32);
    let (mut min_y, mut max_y) = (height, 0u32);

    for (x, y, pixel) in luma.enumerate_pixels() {
        if pixel.0[0] < threshold {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    Some(Region {
        left: min_x,
        top: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

/// Detects the watermark bounding box in `image`.
///
/// Returns `None` when the search window contains no ink, or when the ink
/// collapses to a zero-width or zero-height box.
pub fn detect(image: &DynamicImage, params: &DetectionParams) -> Option<Region> {
    let window = search_region(image.width(), image.height(), params);
    if window.is_empty() {
        return None;
    }

    let luma = image
        .crop_imm(window.left, window.top, window.width, window.height)
        .to_luma8();

    ink_bounds(&luma, params.luma_threshold).map(|found| Region {
        left: window.left + found.left,
        top: window.top + found.top,
        width: found.width,
        height: found.height,
    })
}

/// Opens `path` and runs [`detect`] on it.
pub fn detect_file(path: &Path, params: &DetectionParams) -> CoreResult<Option<Region>> {
    let image = open_image(path)?;
    Ok(detect(&image, params))
}

pub(crate) fn open_image(path: &Path) -> CoreResult<DynamicImage> {
    image::open(path).map_err(|source| CoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn white_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    fn fill(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Rgb([value, value, value]));
            }
        }
    }

    #[test]
    fn test_search_region_defaults() {
        let region = search_region(1280, 720, &DetectionParams::default());
        assert_eq!(region, Region::new(768, 648, 512, 36));
    }

    #[test]
    fn test_search_region_is_clipped() {
        let params = DetectionParams {
            left_fraction: 0.8,
            width_fraction: 0.5,
            ..DetectionParams::default()
        };
        let region = search_region(100, 100, &params);
        assert_eq!(region.left, 80);
        assert_eq!(region.right(), 100);
    }

    #[test]
    fn test_region_clip_outside_image() {
        let clipped = Region::new(150, 150, 10, 10).clip_to(100, 100);
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_detects_block_in_window() {
        let mut img = white_image(1280, 720);
        // Fully inside the 768..1280 x 648..684 window.
        fill(&mut img, 900, 655, 1000, 675, 0);
        let region = detect(&DynamicImage::ImageRgb8(img), &DetectionParams::default());
        assert_eq!(region, Some(Region::new(900, 655, 99, 19)));
    }

    #[test]
    fn test_reference_frame_scenario() {
        let mut img = white_image(1280, 720);
        fill(&mut img, 780, 660, 980, 700, 20);
        let region = detect(&DynamicImage::ImageRgb8(img), &DetectionParams::default());
        // Rows beyond 683 fall outside the 36-row search band.
        assert_eq!(region, Some(Region::new(780, 660, 199, 23)));
    }

    #[test]
    fn test_ink_outside_window_is_ignored() {
        let mut img = white_image(640, 360);
        fill(&mut img, 10, 10, 200, 100, 0);
        assert_eq!(detect(&DynamicImage::ImageRgb8(img), &DetectionParams::default()), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut img = white_image(200, 200);
        fill(&mut img, 130, 181, 150, 189, 200);
        let params = DetectionParams::default();
        assert_eq!(detect(&DynamicImage::ImageRgb8(img.clone()), &params), None);

        fill(&mut img, 130, 181, 150, 189, 199);
        assert!(detect(&DynamicImage::ImageRgb8(img), &params).is_some());
    }

    #[test]
    fn test_single_pixel_collapses_to_none() {
        let mut img = white_image(200, 200);
        fill(&mut img, 150, 185, 151, 186, 0);
        assert_eq!(detect(&DynamicImage::ImageRgb8(img), &DetectionParams::default()), None);
    }

    #[test]
    fn test_single_row_collapses_to_none() {
        let mut img = white_image(200, 200);
        fill(&mut img, 130, 185, 170, 186, 0);
        assert_eq!(detect(&DynamicImage::ImageRgb8(img), &DetectionParams::default()), None);
    }

    #[test]
    fn test_tiny_images_do_not_panic() {
        let params = DetectionParams::default();
        for (w, h) in [(1, 1), (1, 50), (50, 1), (2, 2), (3, 40)] {
            let img = DynamicImage::ImageLuma8(GrayImage::new(w, h));
            assert_eq!(detect(&img, &params), None, "{w}x{h}");
        }
    }

    #[test]
    fn test_zero_offset_region_is_accepted() {
        let params = DetectionParams {
            left_fraction: 0.0,
            top_fraction: 0.0,
            width_fraction: 1.0,
            height_fraction: 1.0,
            ..DetectionParams::default()
        };
        let mut img = white_image(50, 50);
        fill(&mut img, 0, 0, 10, 10, 0);
        let region = detect(&DynamicImage::ImageRgb8(img), &params);
        assert_eq!(region, Some(Region::new(0, 0, 9, 9)));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let mut img = white_image(320, 240);
        fill(&mut img, 250, 218, 300, 227, 40);
        let img = DynamicImage::ImageRgb8(img);
        let params = DetectionParams::default();
        let first = detect(&img, &params);
        for _ in 0..5 {
            assert_eq!(detect(&img, &params), first);
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_fraction() {
        let params = DetectionParams {
            top_fraction: 1.5,
            ..DetectionParams::default()
        };
        assert!(matches!(params.validate(), Err(CoreError::Config(_))));
        assert!(DetectionParams::default().validate().is_ok());
    }
}
