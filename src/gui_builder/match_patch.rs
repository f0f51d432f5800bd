//! Exact pixel-equality matching primitives
//!
//! Every comparison here is byte-exact over RGBA: no thresholds, no colour
//! conversion. Rows are compared as raw slices of the underlying buffers.

use super::mask::Mask;
use super::region::Region;
use image::{Rgba, RgbaImage};

const CHANNELS: usize = 4;

fn row_slice(image: &RgbaImage, x: u32, y: u32, width: u32) -> &[u8] {
    let start = (y as usize * image.width() as usize + x as usize) * CHANNELS;
    &image.as_raw()[start..start + width as usize * CHANNELS]
}

/// True when `needle` lies wholly inside `haystack` at `(x, y)` and every pixel is equal.
pub fn matches_at(haystack: &RgbaImage, needle: &RgbaImage, x: u32, y: u32) -> bool {
    let (needle_w, needle_h) = needle.dimensions();
    if x as u64 + needle_w as u64 > haystack.width() as u64
        || y as u64 + needle_h as u64 > haystack.height() as u64
    {
        return false;
    }
    (0..needle_h).all(|row| row_slice(haystack, x, y + row, needle_w) == row_slice(needle, 0, row, needle_w))
}

/// Scan rightward along row `y` from `x_start` for the first exact match of `needle`.
pub fn seek_right(haystack: &RgbaImage, needle: &RgbaImage, x_start: u32, y: u32) -> Option<u32> {
    let last = haystack.width().checked_sub(needle.width())?;
    (x_start..=last).find(|&x| matches_at(haystack, needle, x, y))
}

/// Scan downward along column `x` from `y_start` for the first exact match of `needle`.
pub fn seek_down(haystack: &RgbaImage, needle: &RgbaImage, x: u32, y_start: u32) -> Option<u32> {
    let last = haystack.height().checked_sub(needle.height())?;
    (y_start..=last).find(|&y| matches_at(haystack, needle, x, y))
}

/// Per-pixel equality against a solid colour over `region`; pixels outside the image never match.
pub fn color_mask(image: &RgbaImage, region: &Region, color: Rgba<u8>) -> Mask {
    Mask::from_fn(region.dx, region.dy, |mx, my| {
        image.get_pixel_checked(region.x + mx, region.y + my) == Some(&color)
    })
}

/// Inclusive bounding box of all pixels with non-zero alpha, or `None` for a fully transparent image.
pub fn opaque_bounds(image: &RgbaImage) -> Option<Region> {
    let (width, height) = image.dimensions();
    let mut rows = vec![false; height as usize];
    let mut cols = vec![false; width as usize];
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            rows[y as usize] = true;
            cols[x as usize] = true;
        }
    }

    let row_min = rows.iter().position(|&r| r)? as u32;
    let row_max = rows.iter().rposition(|&r| r)? as u32;
    let col_min = cols.iter().position(|&c| c)? as u32;
    let col_max = cols.iter().rposition(|&c| c)? as u32;
    Some(Region::new(
        row_min,
        col_min,
        row_max - row_min + 1,
        col_max - col_min + 1,
    ))
}

/// Zero the colour channels of fully transparent pixels so they compare equal.
pub fn clear_transparent(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        if pixel[3] == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

/// True while any pixel still open in `coverage` carries non-zero data.
///
/// `coverage` must have the image's dimensions.
pub fn has_uncovered_content(image: &RgbaImage, coverage: &Mask) -> bool {
    image
        .enumerate_pixels()
        .any(|(x, y, pixel)| coverage.get(x, y) && pixel.0 != [0, 0, 0, 0])
}
