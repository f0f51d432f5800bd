use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for detection and compositing.
pub type GuiBuildResult<T> = Result<T, GuiBuildError>;

/// One of the four panel corners located during anchor detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// Template name backing this corner.
    pub fn template_name(self) -> &'static str {
        match self {
            Corner::NorthWest => "corner_nw",
            Corner::NorthEast => "corner_ne",
            Corner::SouthWest => "corner_sw",
            Corner::SouthEast => "corner_se",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self {
            Corner::NorthWest => "nw",
            Corner::NorthEast => "ne",
            Corner::SouthWest => "sw",
            Corner::SouthEast => "se",
        };
        f.write_str(short)
    }
}

/// Coarse classification of a [`GuiBuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Decode,
    AnchorNotFound,
    UnmatchedOpaquePixel,
    Growth,
    Bounds,
}

/// The error type for template loading, detection and compositing.
#[derive(Debug, Error)]
pub enum GuiBuildError {
    #[error("Template directory not found: {path:?}")]
    TemplateDirectoryMissing { path: PathBuf },

    #[error("Template missing: {name} (in {dir:?})")]
    TemplateMissing { name: String, dir: PathBuf },

    #[error("Failed to decode template {path:?}: {source}")]
    TemplateDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Invalid template metadata {path:?}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Library configuration not found: {path:?}")]
    LibraryConfigMissing { path: PathBuf },

    #[error("scale_multiplier in {path:?} must be at least 1")]
    InvalidScaleMultiplier { path: PathBuf },

    #[error("{height}x{width} source scaled by {scale} does not fit a canvas")]
    CanvasTooLarge { height: u32, width: u32, scale: u32 },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Region at y={y}, x={x} has no template name")]
    UnnamedRegion { y: u32, x: u32 },

    #[error("Mask shape {actual:?} does not match region shape {expected:?}")]
    MaskShape {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Failed to decode source image: {source}")]
    SourceDecode {
        #[from]
        source: image::ImageError,
    },

    #[error("could not find {corner} corner")]
    AnchorNotFound { corner: Corner },

    #[error("a solid pixel was left unmatched at ({x}, {y})")]
    UnmatchedOpaquePixel { x: u32, y: u32 },

    #[error("template '{template}' at ({x}, {y}) grew to the image edge without meeting '{stop}'")]
    GrowthUnbounded {
        template: String,
        stop: String,
        x: u32,
        y: u32,
    },

    #[error(
        "template '{template}' painted at y={y}, x={x} with size {height}x{width} exceeds canvas {canvas_height}x{canvas_width}"
    )]
    OutOfBounds {
        template: String,
        y: i64,
        x: i64,
        height: u32,
        width: u32,
        canvas_height: u32,
        canvas_width: u32,
    },
}

impl GuiBuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuiBuildError::TemplateDirectoryMissing { .. }
            | GuiBuildError::TemplateMissing { .. }
            | GuiBuildError::TemplateDecode { .. }
            | GuiBuildError::MetadataParse { .. }
            | GuiBuildError::LibraryConfigMissing { .. }
            | GuiBuildError::InvalidScaleMultiplier { .. }
            | GuiBuildError::CanvasTooLarge { .. }
            | GuiBuildError::Io { .. }
            | GuiBuildError::UnnamedRegion { .. }
            | GuiBuildError::MaskShape { .. } => ErrorKind::Configuration,
            GuiBuildError::SourceDecode { .. } => ErrorKind::Decode,
            GuiBuildError::AnchorNotFound { .. } => ErrorKind::AnchorNotFound,
            GuiBuildError::UnmatchedOpaquePixel { .. } => ErrorKind::UnmatchedOpaquePixel,
            GuiBuildError::GrowthUnbounded { .. } => ErrorKind::Growth,
            GuiBuildError::OutOfBounds { .. } => ErrorKind::Bounds,
        }
    }

    /// True when the source has no panel at its origin; callers usually skip such images.
    pub fn is_missing_panel(&self) -> bool {
        matches!(
            self,
            GuiBuildError::AnchorNotFound {
                corner: Corner::NorthWest
            }
        )
    }
}
