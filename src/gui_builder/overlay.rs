//! Debug overlay: outlines of detected regions drawn over the source

use super::detector::Detection;
use super::region::Region;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use image::{Rgba, RgbaImage};

const ANCHOR_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);
const SCATTERED_COLOR: Rgba<u8> = Rgba([0, 255, 255, 255]);

/// Copy of `source` with every detected region outlined, panel anchors in a
/// separate colour. Zero-sized regions are skipped.
pub fn draw_regions(source: &RgbaImage, detection: &Detection) -> RgbaImage {
    let mut overlay = source.clone();
    outline(&mut overlay, detection.anchors(), ANCHOR_COLOR);
    outline(&mut overlay, detection.scattered(), SCATTERED_COLOR);
    overlay
}

fn outline(overlay: &mut RgbaImage, regions: &[Region], color: Rgba<u8>) {
    for region in regions.iter().filter(|r| r.is_valid()) {
        let rect = Rect::at(region.x as i32, region.y as i32).of_size(region.dx, region.dy);
        draw_hollow_rect_mut(overlay, rect, color);
    }
}
