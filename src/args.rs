use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Detect regions and print them as JSON
    Detect,
    /// Detect regions, then recompose them with a target template set
    Build,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub source: PathBuf,
    pub templates: PathBuf,
    pub target: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub debug_image: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    pub debug_mode: bool,
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse the process arguments.
    pub fn parse() -> Result<Parsed, String> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse flags (program name already stripped).
    pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> Result<Parsed, String> {
        let mut mode: Option<Mode> = None;
        let mut source: Option<PathBuf> = None;
        let mut templates: Option<PathBuf> = None;
        let mut target: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut debug_image: Option<PathBuf> = None;
        let mut overlay: Option<PathBuf> = None;
        let mut debug_mode = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "detect" && mode.is_none() {
                mode = Some(Mode::Detect);
            } else if arg == "build" && mode.is_none() {
                mode = Some(Mode::Build);
            } else if let Some(val) = arg.strip_prefix("--source=") {
                source = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--templates=") {
                templates = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--target=") {
                target = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--output=") {
                output = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--debug-image=") {
                debug_image = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--overlay=") {
                overlay = Some(PathBuf::from(val));
            } else {
                return Err(format!("Unknown argument: {}", arg));
            }
        }

        let mode = mode.ok_or("Missing command: expected 'detect' or 'build'")?;
        let source = source.ok_or("Missing --source=PATH")?;
        let templates = templates.ok_or("Missing --templates=DIR")?;
        if mode == Mode::Build {
            if target.is_none() {
                return Err("build requires --target=DIR".to_string());
            }
            if output.is_none() {
                return Err("build requires --output=PATH".to_string());
            }
        }

        Ok(Parsed::Run(Args {
            mode,
            source,
            templates,
            target,
            output,
            debug_image,
            overlay,
            debug_mode,
        }))
    }
}

pub fn print_help() {
    println!("🧩 GUI Rebuild - panel template detection and recomposition");
    println!();
    println!("USAGE:");
    println!("    gui-rebuild detect --source=PATH --templates=DIR [FLAGS]");
    println!("    gui-rebuild build  --source=PATH --templates=DIR --target=DIR --output=PATH [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --source=PATH       Source GUI bitmap to analyse");
    println!("    --templates=DIR     Template set the source was drawn with");
    println!("    --target=DIR        Replacement template set (needs configuration.json)");
    println!("    --output=PATH       Where to save the rebuilt bitmap");
    println!("    --debug-image=PATH  Write the unmatched remainder here when detection fails");
    println!("    --overlay=PATH      Write the source with detected regions outlined (detect only)");
    println!("    --debug             Enable debug logging (RUST_LOG overrides)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    gui-rebuild detect --source=furnace.png --templates=templates/default");
    println!(
        "    gui-rebuild build --source=furnace.png --templates=templates/default --target=templates/dark --output=out/furnace.png"
    );
}
