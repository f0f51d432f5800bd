//! Rectangular regions attributed to templates

use super::error::{GuiBuildError, GuiBuildResult};
use super::mask::Mask;
use serde::Serialize;
use std::fmt;

/// An axis-aligned rectangle of an image, tagged with the template that fills it.
///
/// `mask`, when present, has exactly `dy` rows and `dx` columns; `true` marks a
/// pixel the region actually accounts for. Regions are treated as values:
/// geometry changes produce a new `Region`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub y: u32,
    pub x: u32,
    pub dy: u32,
    pub dx: u32,
    #[serde(skip)]
    pub mask: Option<Mask>,
    pub name: Option<String>,
}

impl Region {
    pub fn new(y: u32, x: u32, dy: u32, dx: u32) -> Self {
        Self {
            y,
            x,
            dy,
            dx,
            mask: None,
            name: None,
        }
    }

    pub fn named(y: u32, x: u32, dy: u32, dx: u32, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(y, x, dy, dx)
        }
    }

    /// Attach a per-pixel match mask; its shape must equal `(dy, dx)`.
    pub fn with_mask(self, mask: Mask) -> GuiBuildResult<Self> {
        if mask.shape() != self.shape() {
            return Err(GuiBuildError::MaskShape {
                expected: self.shape(),
                actual: mask.shape(),
            });
        }
        Ok(Self {
            mask: Some(mask),
            ..self
        })
    }

    pub fn lower(&self) -> u32 {
        self.y + self.dy
    }

    pub fn right(&self) -> u32 {
        self.x + self.dx
    }

    pub fn shape(&self) -> (u32, u32) {
        (self.dy, self.dx)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Same region shifted by `(dy, dx)`.
    pub fn translated(&self, dy: u32, dx: u32) -> Self {
        Self {
            y: self.y + dy,
            x: self.x + dx,
            ..self.clone()
        }
    }

    /// Geometry multiplied by `factor`, each field truncated toward zero.
    ///
    /// The mask is dropped since it no longer matches the scaled shape.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |v: u32| (v as f64 * factor) as u32;
        Self {
            y: scale(self.y),
            x: scale(self.x),
            dy: scale(self.dy),
            dx: scale(self.dx),
            mask: None,
            name: self.name.clone(),
        }
    }

    /// Mark this region's pixels as covered in a coverage mask.
    ///
    /// Without a match mask the whole rectangle becomes covered; with one, each
    /// pixel's coverage is set from the match mask (unmatched pixels stay open).
    pub fn remove_from(&self, coverage: &mut Mask) {
        match &self.mask {
            None => coverage.fill_rect(self.x, self.y, self.dx, self.dy, false),
            Some(mask) => {
                for my in 0..self.dy {
                    let cy = self.y + my;
                    if cy >= coverage.height() {
                        break;
                    }
                    for mx in 0..self.dx {
                        let cx = self.x + mx;
                        if cx >= coverage.width() {
                            break;
                        }
                        coverage.set(cx, cy, !mask.get(mx, my));
                    }
                }
            }
        }
    }

    /// Check if this region is valid (non-zero dimensions)
    pub fn is_valid(&self) -> bool {
        self.dx > 0 && self.dy > 0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region({}, {}, {}, {}, name={})",
            self.y,
            self.x,
            self.dy,
            self.dx,
            self.name.as_deref().unwrap_or("None")
        )
    }
}
