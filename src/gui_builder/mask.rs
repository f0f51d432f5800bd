//! Boolean pixel grids used for coverage tracking and interior match masks

use image::{GrayImage, Luma, imageops};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const SET: Luma<u8> = Luma([255]);
const CLEAR: Luma<u8> = Luma([0]);

fn luma(value: bool) -> Luma<u8> {
    if value { SET } else { CLEAR }
}

/// Single-channel grid with `width` columns and `height` rows; non-zero cells are `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pixels: GrayImage,
}

impl Mask {
    pub fn new(width: u32, height: u32, value: bool) -> Self {
        Self {
            pixels: GrayImage::from_pixel(width, height, luma(value)),
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        Self {
            pixels: GrayImage::from_fn(width, height, |x, y| luma(f(x, y))),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(height, width)`, matching the order of region geometry.
    pub fn shape(&self) -> (u32, u32) {
        (self.height(), self.width())
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y)[0] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.pixels.put_pixel(x, y, luma(value));
    }

    /// Set every cell of the rectangle to `value`, clipped to the grid.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, value: bool) {
        if width == 0 || height == 0 || x >= self.width() || y >= self.height() {
            return;
        }
        let rect = Rect::at(x as i32, y as i32).of_size(width, height);
        draw_filled_rect_mut(&mut self.pixels, rect, luma(value));
    }

    /// Number of `true` cells.
    pub fn count(&self) -> usize {
        self.pixels.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn all(&self) -> bool {
        self.pixels.pixels().all(|p| p[0] != 0)
    }

    /// Copy of the rectangle at `(x, y)`, clipped to the grid.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Mask {
        Self {
            pixels: imageops::crop_imm(&self.pixels, x, y, width, height).to_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips_to_grid() {
        let mut mask = Mask::new(4, 3, true);
        mask.fill_rect(2, 1, 10, 10, false);

        assert_eq!(mask.count(), 12 - 4);
        assert!(mask.get(1, 1));
        assert!(!mask.get(2, 1));
        assert!(!mask.get(3, 2));
        assert!(mask.get(3, 0));
    }

    #[test]
    fn test_fill_rect_outside_grid_is_noop() {
        let mut mask = Mask::new(2, 2, true);
        mask.fill_rect(5, 5, 3, 3, false);
        assert!(mask.all());

        mask.fill_rect(0, 0, 0, 2, false);
        assert!(mask.all());
    }

    #[test]
    fn test_crop_keeps_values() {
        let mask = Mask::from_fn(4, 4, |x, y| x == y);
        let cropped = mask.crop(1, 1, 2, 2);

        assert_eq!(cropped.shape(), (2, 2));
        assert!(cropped.get(0, 0));
        assert!(cropped.get(1, 1));
        assert!(!cropped.get(1, 0));
    }

    #[test]
    fn test_set_round_trips() {
        let mut mask = Mask::new(3, 2, false);
        mask.set(2, 1, true);
        assert!(mask.get(2, 1));
        assert_eq!(mask.count(), 1);
    }
}
