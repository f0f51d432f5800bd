pub mod args;
pub mod gui_builder;

pub use gui_builder::{
    Detection, GuiBuildError, GuiBuildResult, GuiCompositor, Region, RegionDetector,
    TemplateLibrary, build_gui, detect_regions,
};
