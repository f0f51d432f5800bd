//! Repaints a canvas from detected regions using a target template set

use super::{
    config::TemplateMode,
    error::{GuiBuildError, GuiBuildResult},
    region::Region,
    template::TemplateLibrary,
};
use image::RgbaImage;
use std::path::Path;

/// Paints regions with a target library's templates, scaled by its multiplier.
pub struct GuiCompositor<'a> {
    library: &'a TemplateLibrary,
    scale: u32,
}

impl<'a> GuiCompositor<'a> {
    /// Use the scale multiplier declared in the library's configuration file.
    pub fn new(library: &'a TemplateLibrary) -> GuiBuildResult<Self> {
        let scale = library.config()?.scale_multiplier;
        Ok(Self { library, scale })
    }

    /// Paint every region, lowest layer first, onto a transparent canvas of
    /// `(height * scale, width * scale)`.
    pub fn build(&self, regions: &[Region], height: u32, width: u32) -> GuiBuildResult<RgbaImage> {
        let too_large = || GuiBuildError::CanvasTooLarge {
            height,
            width,
            scale: self.scale,
        };
        let canvas_width = width.checked_mul(self.scale).ok_or_else(too_large)?;
        let canvas_height = height.checked_mul(self.scale).ok_or_else(too_large)?;
        let mut canvas = RgbaImage::new(canvas_width, canvas_height);
        let ordered = self.library.order_by_layer(regions.to_vec())?;
        for region in &ordered {
            self.paint(&mut canvas, region)?;
        }
        log::info!(
            "Composited {} regions onto {}x{} canvas (scale {})",
            ordered.len(),
            canvas.width(),
            canvas.height(),
            self.scale
        );
        Ok(canvas)
    }

    fn paint(&self, canvas: &mut RgbaImage, region: &Region) -> GuiBuildResult<()> {
        let name = region.name().ok_or(GuiBuildError::UnnamedRegion {
            y: region.y,
            x: region.x,
        })?;
        let template = self.library.get(name)?;
        let meta = template.metadata;
        let region = region.scaled(self.scale as f64);

        let (region_y, region_x) = (region.y as i64, region.x as i64);
        let origin_y = region_y + meta.dy as i64;
        let origin_x = region_x + meta.dx as i64;

        match meta.mode {
            TemplateMode::Stamp => place(canvas, &template.image, origin_y, origin_x, name),
            TemplateMode::Tile => {
                let tiled = tile(&template.image, region.dy, region.dx);
                place(canvas, &tiled, region_y, region_x, name)
            }
            TemplateMode::TileX => {
                let tiled = tile(&template.image, template.height(), region.dx);
                place(canvas, &tiled, origin_y, region_x, name)
            }
            TemplateMode::TileY => {
                let tiled = tile(&template.image, region.dy, template.width());
                place(canvas, &tiled, region_y, origin_x, name)
            }
        }
    }
}

/// Repeat `template` enough times to cover `height x width`, cropped to exactly that size.
fn tile(template: &RgbaImage, height: u32, width: u32) -> RgbaImage {
    let (tile_w, tile_h) = template.dimensions();
    if tile_w == 0 || tile_h == 0 {
        return RgbaImage::new(0, 0);
    }
    RgbaImage::from_fn(width, height, |x, y| *template.get_pixel(x % tile_w, y % tile_h))
}

/// Overwrite the canvas with `image` at `(y, x)`; the whole image must fit.
fn place(canvas: &mut RgbaImage, image: &RgbaImage, y: i64, x: i64, name: &str) -> GuiBuildResult<()> {
    let (canvas_width, canvas_height) = canvas.dimensions();
    if y < 0
        || x < 0
        || y + image.height() as i64 > canvas_height as i64
        || x + image.width() as i64 > canvas_width as i64
    {
        return Err(GuiBuildError::OutOfBounds {
            template: name.to_string(),
            y,
            x,
            height: image.height(),
            width: image.width(),
            canvas_height,
            canvas_width,
        });
    }
    image::imageops::replace(canvas, image, x, y);
    Ok(())
}

/// Compositing entry point: paint `regions` with the templates in `target_dir`.
///
/// `size` is the source `(height, width)`; the library's `configuration.json`
/// supplies the scale multiplier.
pub fn build_gui(regions: &[Region], size: (u32, u32), target_dir: &Path) -> GuiBuildResult<RgbaImage> {
    let library = TemplateLibrary::open(target_dir)?;
    GuiCompositor::new(&library)?.build(regions, size.0, size.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui_builder::error::ErrorKind;
    use image::Rgba;
    use tempfile::TempDir;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    /// 2-column pattern so tiling phase is observable
    fn striped(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| if x % 2 == 0 { RED } else { GREEN })
    }

    fn library_with(templates: &[(&str, RgbaImage, Option<&str>)], scale: u32) -> (TempDir, TemplateLibrary) {
        let tmp = TempDir::new().unwrap();
        for (name, image, meta) in templates {
            image.save(tmp.path().join(format!("{name}.png"))).unwrap();
            if let Some(meta) = meta {
                std::fs::write(tmp.path().join(format!("{name}.json")), meta).unwrap();
            }
        }
        std::fs::write(
            tmp.path().join("configuration.json"),
            format!(r#"{{"scale_multiplier": {scale}}}"#),
        )
        .unwrap();
        let library = TemplateLibrary::open(tmp.path()).unwrap();
        (tmp, library)
    }

    fn painted_inside(canvas: &RgbaImage, region: &Region) -> bool {
        (region.y..region.lower()).all(|y| (region.x..region.right()).all(|x| canvas.get_pixel(x, y)[3] != 0))
    }

    #[test]
    fn test_tile_covers_region_for_any_template_size() {
        let region = Region::named(1, 2, 5, 7, "fill");
        for (tw, th) in [(2, 2), (3, 4), (7, 5), (9, 8), (1, 9), (10, 1)] {
            let (_tmp, library) = library_with(
                &[("fill", RgbaImage::from_pixel(tw, th, RED), Some(r#"{"mode": "tile"}"#))],
                1,
            );
            let canvas = GuiCompositor::new(&library)
                .unwrap()
                .build(std::slice::from_ref(&region), 8, 10)
                .unwrap();

            assert!(painted_inside(&canvas, &region), "template {tw}x{th} left a gap");
            // nothing outside the region
            assert_eq!(canvas.pixels().filter(|p| p[3] != 0).count(), 35);
        }
    }

    #[test]
    fn test_tile_ignores_offset_and_repeats_pattern() {
        let (_tmp, library) = library_with(
            &[("fill", striped(2, 1), Some(r#"{"mode": "tile", "dx": 3, "dy": 3}"#))],
            1,
        );
        let region = Region::named(0, 1, 2, 3, "fill");
        let canvas = GuiCompositor::new(&library).unwrap().build(&[region], 2, 4).unwrap();

        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*canvas.get_pixel(1, 0), RED);
        assert_eq!(*canvas.get_pixel(2, 0), GREEN);
        assert_eq!(*canvas.get_pixel(3, 1), RED);
    }

    #[test]
    fn test_tile_x_keeps_native_height() {
        let (_tmp, library) = library_with(
            &[("bar", RgbaImage::from_pixel(2, 1, RED), Some(r#"{"mode": "tile-x", "dy": 1}"#))],
            1,
        );
        let region = Region::named(0, 1, 3, 5, "bar");
        let canvas = GuiCompositor::new(&library).unwrap().build(&[region], 4, 8).unwrap();

        for x in 1..6 {
            assert_eq!(*canvas.get_pixel(x, 1), RED);
            assert_eq!(canvas.get_pixel(x, 0)[3], 0);
            assert_eq!(canvas.get_pixel(x, 2)[3], 0);
        }
        assert_eq!(canvas.get_pixel(6, 1)[3], 0);
    }

    #[test]
    fn test_tile_y_keeps_native_width() {
        let (_tmp, library) = library_with(
            &[("col", RgbaImage::from_pixel(1, 3, GREEN), Some(r#"{"mode": "tile-y", "dx": 2}"#))],
            1,
        );
        let region = Region::named(1, 0, 4, 3, "col");
        let canvas = GuiCompositor::new(&library).unwrap().build(&[region], 6, 4).unwrap();

        for y in 1..5 {
            assert_eq!(*canvas.get_pixel(2, y), GREEN);
            assert_eq!(canvas.get_pixel(0, y)[3], 0);
        }
        assert_eq!(canvas.get_pixel(2, 5)[3], 0);
    }

    #[test]
    fn test_stamp_applies_offset_and_scale() {
        let (_tmp, library) = library_with(
            &[("dot", RgbaImage::from_pixel(2, 2, RED), Some(r#"{"dx": 1, "dy": 0}"#))],
            2,
        );
        let region = Region::named(1, 1, 1, 1, "dot");
        let canvas = GuiCompositor::new(&library).unwrap().build(&[region], 3, 3).unwrap();

        assert_eq!(canvas.dimensions(), (6, 6));
        // scaled origin (2, 2) plus dx=1
        assert_eq!(*canvas.get_pixel(3, 2), RED);
        assert_eq!(*canvas.get_pixel(4, 3), RED);
        assert_eq!(canvas.get_pixel(2, 2)[3], 0);
        assert_eq!(canvas.pixels().filter(|p| p[3] != 0).count(), 4);
    }

    #[test]
    fn test_higher_layer_paints_last() {
        let (_tmp, library) = library_with(
            &[
                ("top", RgbaImage::from_pixel(1, 1, GREEN), Some(r#"{"layer": 150}"#)),
                ("bottom", RgbaImage::from_pixel(1, 1, RED), Some(r#"{"layer": 50}"#)),
            ],
            1,
        );
        let regions = vec![Region::named(0, 0, 1, 1, "top"), Region::named(0, 0, 1, 1, "bottom")];
        let canvas = GuiCompositor::new(&library).unwrap().build(&regions, 1, 1).unwrap();
        assert_eq!(*canvas.get_pixel(0, 0), GREEN);
    }

    #[test]
    fn test_negative_offset_is_bounds_error() {
        let (_tmp, library) = library_with(
            &[("dot", RgbaImage::from_pixel(1, 1, RED), Some(r#"{"dx": -1}"#))],
            1,
        );
        let err = GuiCompositor::new(&library)
            .unwrap()
            .build(&[Region::named(0, 0, 1, 1, "dot")], 2, 2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
    }

    #[test]
    fn test_oversized_stamp_is_bounds_error() {
        let (_tmp, library) = library_with(&[("big", RgbaImage::from_pixel(3, 3, RED), None)], 1);
        let err = GuiCompositor::new(&library)
            .unwrap()
            .build(&[Region::named(1, 1, 1, 1, "big")], 3, 3)
            .unwrap_err();
        assert!(matches!(err, GuiBuildError::OutOfBounds { y: 1, x: 1, .. }));
    }

    #[test]
    fn test_unnamed_region_is_rejected() {
        let (_tmp, library) = library_with(&[], 1);
        let err = GuiCompositor::new(&library)
            .unwrap()
            .build(&[Region::new(0, 0, 1, 1)], 1, 1)
            .unwrap_err();
        assert!(matches!(err, GuiBuildError::UnnamedRegion { .. }));
    }

    #[test]
    fn test_scaled_canvas_overflow_is_configuration_error() {
        let (_tmp, library) = library_with(&[("dot", RgbaImage::from_pixel(1, 1, RED), None)], 1 << 30);
        let err = GuiCompositor::new(&library)
            .unwrap()
            .build(&[Region::named(0, 0, 1, 1, "dot")], 4, 4)
            .unwrap_err();
        assert!(matches!(err, GuiBuildError::CanvasTooLarge { height: 4, width: 4, .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_scale_fails_before_painting() {
        let (_tmp, library) = library_with(&[("dot", RgbaImage::from_pixel(1, 1, RED), None)], 0);
        assert!(matches!(
            GuiCompositor::new(&library),
            Err(GuiBuildError::InvalidScaleMultiplier { .. })
        ));
    }

    #[test]
    fn test_missing_configuration() {
        let tmp = TempDir::new().unwrap();
        let library = TemplateLibrary::open(tmp.path()).unwrap();
        assert!(matches!(
            GuiCompositor::new(&library),
            Err(GuiBuildError::LibraryConfigMissing { .. })
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let (_tmp, library) = library_with(
            &[
                ("a", striped(3, 2), Some(r#"{"mode": "tile"}"#)),
                ("b", RgbaImage::from_pixel(1, 1, RED), None),
            ],
            2,
        );
        let regions = vec![Region::named(0, 0, 3, 4, "a"), Region::named(1, 1, 1, 1, "b")];
        let compositor = GuiCompositor::new(&library).unwrap();
        let first = compositor.build(&regions, 4, 5).unwrap();
        let second = compositor.build(&regions, 4, 5).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
