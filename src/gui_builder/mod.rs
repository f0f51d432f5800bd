//! GUI panel detection and recomposition
//!
//! Two stages share one template vocabulary:
//! - `detector` scans a source bitmap for known templates, anchoring on the
//!   nine-piece panel frame and then matching scattered fragments exactly.
//! - `compositor` repaints the detected regions from a second template set,
//!   honouring per-template offsets, layers and tiling modes.

pub mod compositor;
pub mod config;
pub mod detector;
pub mod error;
pub mod mask;
pub mod match_patch;
pub mod overlay;
pub mod region;
pub mod template;


// Re-export main types and functions
pub use compositor::{GuiCompositor, build_gui};
pub use config::{Axis, DetectConfig, GrowthPolicy, GrowthRules, LibraryConfig, TemplateMetadata, TemplateMode};
pub use detector::{Detection, RegionDetector, detect_regions};
pub use error::{Corner, ErrorKind, GuiBuildError, GuiBuildResult};
pub use mask::Mask;
pub use region::Region;
pub use template::{Template, TemplateLibrary};
