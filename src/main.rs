use gui_rebuild::args::{Args, Mode, Parsed, print_help};
use gui_rebuild::gui_builder::{
    DetectConfig, GuiCompositor, RegionDetector, TemplateLibrary, overlay::draw_regions,
};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Parsed::Version) => {
            println!("GUI Rebuild v{}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            print_help();
            return ExitCode::FAILURE;
        }
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let source_bytes = std::fs::read(&args.source)?;
    let library = TemplateLibrary::open(&args.templates)?;
    let config = DetectConfig {
        debug_path: args.debug_image.clone(),
        ..DetectConfig::default()
    };
    let detection = RegionDetector::new(&library, config).detect_bytes(&source_bytes)?;

    match args.mode {
        Mode::Detect => {
            if let Some(overlay_path) = &args.overlay {
                let source = image::load_from_memory(&source_bytes)?.to_rgba8();
                save(&draw_regions(&source, &detection), overlay_path)?;
                println!("🖍️ Overlay saved to {}", overlay_path.display());
            }
            println!("{}", serde_json::to_string_pretty(&detection)?);
        }
        Mode::Build => {
            let (Some(target_dir), Some(output)) = (&args.target, &args.output) else {
                return Err("build requires --target and --output".into());
            };
            let target = TemplateLibrary::open(target_dir)?;
            let rebuilt = GuiCompositor::new(&target)?.build(
                &detection.regions,
                detection.height,
                detection.width,
            )?;
            save(&rebuilt, output)?;
            println!(
                "✅ Rebuilt {} regions ({}x{}) to {}",
                detection.regions.len(),
                rebuilt.width(),
                rebuilt.height(),
                output.display()
            );
        }
    }
    Ok(())
}

fn save(image: &image::RgbaImage, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
}
