//! Region detection: panel anchoring followed by an exhaustive scattered scan

use super::{
    config::{Axis, DetectConfig, GrowthPolicy},
    error::{Corner, GuiBuildError, GuiBuildResult},
    mask::Mask,
    match_patch::{
        clear_transparent, color_mask, has_uncovered_content, matches_at, opaque_bounds,
        seek_down, seek_right,
    },
    region::Region,
    template::{Template, TemplateLibrary},
};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const INTERIOR: &str = "interior";
pub const EDGE_N: &str = "edge_n";
pub const EDGE_S: &str = "edge_s";
pub const EDGE_W: &str = "edge_w";
pub const EDGE_E: &str = "edge_e";

/// Number of regions produced by panel anchoring.
pub const ANCHOR_COUNT: usize = 9;

#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Nine panel anchors first, then scattered matches in scan order
    pub regions: Vec<Region>,
    pub height: u32,
    pub width: u32,
    pub processing_time_ms: u128,
}

impl Detection {
    /// Source `(height, width)`.
    pub fn size(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    pub fn anchors(&self) -> &[Region] {
        &self.regions[..ANCHOR_COUNT.min(self.regions.len())]
    }

    pub fn scattered(&self) -> &[Region] {
        &self.regions[ANCHOR_COUNT.min(self.regions.len())..]
    }

    pub fn into_parts(self) -> (Vec<Region>, (u32, u32)) {
        (self.regions, (self.height, self.width))
    }
}

/// Detects panel anchors and scattered templates in a source bitmap.
pub struct RegionDetector<'a> {
    library: &'a TemplateLibrary,
    config: DetectConfig,
}

impl<'a> RegionDetector<'a> {
    pub fn new(library: &'a TemplateLibrary, config: DetectConfig) -> Self {
        Self { library, config }
    }

    /// Decode encoded image bytes (any format `image` supports) and detect.
    pub fn detect_bytes(&self, source_bytes: &[u8]) -> GuiBuildResult<Detection> {
        let source = image::load_from_memory(source_bytes)?.to_rgba8();
        self.detect(source)
    }

    pub fn detect(&self, mut source: RgbaImage) -> GuiBuildResult<Detection> {
        let start_time = std::time::Instant::now();
        clear_transparent(&mut source);
        let (width, height) = source.dimensions();

        let mut regions = match self.match_panel(&source) {
            Ok(regions) => regions,
            Err(e) => {
                if matches!(e, GuiBuildError::AnchorNotFound { .. }) {
                    self.write_snapshot(&source);
                }
                return Err(e);
            }
        };

        let mut coverage = Mask::new(width, height, true);
        for region in &regions {
            region.remove_from(&mut coverage);
        }

        if let Some(bounds) = opaque_bounds(&source) {
            let trimmed =
                image::imageops::crop_imm(&source, bounds.x, bounds.y, bounds.dx, bounds.dy)
                    .to_image();
            let mut trimmed_coverage = coverage.crop(bounds.x, bounds.y, bounds.dx, bounds.dy);
            let scattered = self.scan_for_templates(&trimmed, &mut trimmed_coverage, &bounds)?;
            regions.extend(
                scattered
                    .into_iter()
                    .map(|region| region.translated(bounds.y, bounds.x)),
            );
        }

        let detection = Detection {
            regions,
            height,
            width,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        log::info!(
            "Detected {} regions ({} scattered) in {}x{} source in {}ms",
            detection.regions.len(),
            detection.scattered().len(),
            width,
            height,
            detection.processing_time_ms
        );
        Ok(detection)
    }

    fn template(&self, name: &str) -> GuiBuildResult<Rc<Template>> {
        self.library.get(name)
    }

    /// Locate the four corners, derive interior and edges.
    fn match_panel(&self, image: &RgbaImage) -> GuiBuildResult<Vec<Region>> {
        let nw_template = self.template(Corner::NorthWest.template_name())?;
        let corner_nw = Region::named(
            0,
            0,
            nw_template.height(),
            nw_template.width(),
            Corner::NorthWest.template_name(),
        );
        if !matches_at(image, &nw_template.image, 0, 0) {
            return Err(GuiBuildError::AnchorNotFound {
                corner: Corner::NorthWest,
            });
        }

        let ne_template = self.template(Corner::NorthEast.template_name())?;
        let ne_x = seek_right(image, &ne_template.image, corner_nw.right(), corner_nw.y).ok_or(
            GuiBuildError::AnchorNotFound {
                corner: Corner::NorthEast,
            },
        )?;
        let corner_ne = Region::named(
            corner_nw.y,
            ne_x,
            ne_template.height(),
            ne_template.width(),
            Corner::NorthEast.template_name(),
        );

        let sw_template = self.template(Corner::SouthWest.template_name())?;
        let sw_y = seek_down(image, &sw_template.image, corner_nw.x, corner_nw.lower()).ok_or(
            GuiBuildError::AnchorNotFound {
                corner: Corner::SouthWest,
            },
        )?;
        let corner_sw = Region::named(
            sw_y,
            corner_nw.x,
            sw_template.height(),
            sw_template.width(),
            Corner::SouthWest.template_name(),
        );

        // no search: SE must sit where NE and SW meet
        let se_template = self.template(Corner::SouthEast.template_name())?;
        let corner_se = Region::named(
            corner_sw.y,
            corner_ne.x,
            se_template.height(),
            se_template.width(),
            Corner::SouthEast.template_name(),
        );
        if !matches_at(image, &se_template.image, corner_se.x, corner_se.y) {
            return Err(GuiBuildError::AnchorNotFound {
                corner: Corner::SouthEast,
            });
        }

        log::debug!(
            "Panel corners: nw=({},{}) ne=({},{}) sw=({},{}) se=({},{})",
            corner_nw.x,
            corner_nw.y,
            corner_ne.x,
            corner_ne.y,
            corner_sw.x,
            corner_sw.y,
            corner_se.x,
            corner_se.y
        );

        let interior = Region::named(
            corner_nw.lower(),
            corner_nw.right(),
            corner_se.y.saturating_sub(corner_ne.lower()),
            corner_se.x.saturating_sub(corner_sw.right()),
            INTERIOR,
        );
        let backing = color_mask(image, &interior, self.config.backing_color);
        let interior = interior.with_mask(backing)?;

        let edge_n = Region::named(
            corner_nw.y,
            corner_nw.right(),
            self.template(EDGE_N)?.height(),
            corner_ne.x.saturating_sub(corner_nw.right()),
            EDGE_N,
        );
        let edge_s = Region::named(
            corner_sw.y,
            corner_sw.right(),
            self.template(EDGE_S)?.height(),
            corner_se.x.saturating_sub(corner_sw.right()),
            EDGE_S,
        );
        let edge_w = Region::named(
            corner_nw.lower(),
            corner_nw.x,
            corner_sw.y.saturating_sub(corner_nw.lower()),
            self.template(EDGE_W)?.width(),
            EDGE_W,
        );
        let edge_e = Region::named(
            corner_ne.lower(),
            corner_ne.x,
            corner_se.y.saturating_sub(corner_ne.lower()),
            self.template(EDGE_E)?.width(),
            EDGE_E,
        );

        Ok(vec![
            corner_nw, corner_ne, corner_sw, corner_se, interior, edge_n, edge_s, edge_w, edge_e,
        ])
    }

    /// Raster-scan uncovered pixels of the trimmed image, matching templates largest first.
    ///
    /// `bounds` is the trimmed image's placement in the source; it is only used
    /// to report errors in source coordinates.
    fn scan_for_templates(
        &self,
        image: &RgbaImage,
        coverage: &mut Mask,
        bounds: &Region,
    ) -> GuiBuildResult<Vec<Region>> {
        let templates = self.library.enumerate()?;
        let mut matches = Vec::new();

        if !has_uncovered_content(image, coverage) {
            return Ok(matches);
        }

        for y in 0..image.height() {
            for x in 0..image.width() {
                if !coverage.get(x, y) {
                    continue;
                }

                match self.match_single_template(image, &templates, x, y, bounds)? {
                    Some(region) => {
                        log::debug!("Found template: {}", region.translated(bounds.y, bounds.x));
                        region.remove_from(coverage);
                        matches.push(region);
                        if !has_uncovered_content(image, coverage) {
                            return Ok(matches);
                        }
                    }
                    None if image.get_pixel(x, y)[3] != 0 => {
                        self.write_snapshot(&uncovered_remainder(image, coverage, x, y));
                        return Err(GuiBuildError::UnmatchedOpaquePixel {
                            x: x + bounds.x,
                            y: y + bounds.y,
                        });
                    }
                    None => {}
                }
            }
        }

        Ok(matches)
    }

    /// First template (in the given order) matching with its top-left at `(x, y)`.
    fn match_single_template(
        &self,
        image: &RgbaImage,
        templates: &[Rc<Template>],
        x: u32,
        y: u32,
        bounds: &Region,
    ) -> GuiBuildResult<Option<Region>> {
        for template in templates {
            if !matches_at(image, &template.image, x, y) {
                continue;
            }

            let (mut dy, mut dx) = (template.height(), template.width());
            if let GrowthPolicy::GrowUntilFollowedBy { stop, axis } =
                self.config.growth.policy(&template.name)
            {
                let stop_template = self.template(&stop)?;
                let unbounded = || GuiBuildError::GrowthUnbounded {
                    template: template.name.clone(),
                    stop: stop.clone(),
                    x: x + bounds.x,
                    y: y + bounds.y,
                };
                match axis {
                    Axis::Down => {
                        while !matches_at(image, &stop_template.image, x, y + dy) {
                            if y + dy >= image.height() {
                                return Err(unbounded());
                            }
                            dy += 1;
                        }
                    }
                    Axis::Right => {
                        while !matches_at(image, &stop_template.image, x + dx, y) {
                            if x + dx >= image.width() {
                                return Err(unbounded());
                            }
                            dx += 1;
                        }
                    }
                }
            }

            return Ok(Some(Region::named(y, x, dy, dx, &template.name)));
        }
        Ok(None)
    }

    fn write_snapshot(&self, image: &RgbaImage) {
        if let Some(path) = &self.config.debug_path {
            match image.save(path) {
                Ok(()) => log::info!("Wrote debug snapshot to {:?}", path),
                Err(e) => log::warn!("Failed to write debug snapshot to {:?}: {}", path, e),
            }
        }
    }
}

/// Everything right of and below `(x, y)` that is still uncovered; covered pixels are cleared.
fn uncovered_remainder(image: &RgbaImage, coverage: &Mask, x: u32, y: u32) -> RgbaImage {
    RgbaImage::from_fn(image.width() - x, image.height() - y, |sx, sy| {
        if coverage.get(x + sx, y + sy) {
            *image.get_pixel(x + sx, y + sy)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Detection entry point: decode `source_bytes` and detect against `template_dir`.
pub fn detect_regions(
    source_bytes: &[u8],
    template_dir: &Path,
    debug_path: Option<&Path>,
) -> GuiBuildResult<Detection> {
    let library = TemplateLibrary::open(template_dir)?;
    let config = DetectConfig {
        debug_path: debug_path.map(PathBuf::from),
        ..DetectConfig::default()
    };
    RegionDetector::new(&library, config).detect_bytes(source_bytes)
}
