//! Template library: named reference bitmaps with optional metadata sidecars

use super::config::{DEFAULT_LAYER, LibraryConfig, TemplateMetadata};
use super::error::{GuiBuildError, GuiBuildResult};
use super::match_patch::clear_transparent;
use super::region::Region;
use image::RgbaImage;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File holding the library-wide [`LibraryConfig`].
pub const CONFIG_FILE_NAME: &str = "configuration.json";

const TEMPLATE_EXTENSION: &str = "png";
const METADATA_EXTENSION: &str = "json";

fn template_key(name: &str) -> &str {
    name.strip_suffix(".png").unwrap_or(name)
}

/// A reference bitmap and its paint metadata.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub path: PathBuf,
    pub image: RgbaImage,
    pub metadata: TemplateMetadata,
}

impl Template {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel area, the ordering key for scattered matching.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Lazily loaded, memoized view of one template directory.
///
/// Each backing file is read at most once per instance. The cache uses
/// interior mutability so lookups work through a shared reference; the library
/// is not meant to be shared across threads.
pub struct TemplateLibrary {
    dir: PathBuf,
    templates: RefCell<HashMap<String, Rc<Template>>>,
}

impl TemplateLibrary {
    /// Open a template directory. Nothing is loaded until first use.
    pub fn open(dir: impl AsRef<Path>) -> GuiBuildResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GuiBuildError::TemplateDirectoryMissing {
                path: dir.to_path_buf(),
            });
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            templates: RefCell::new(HashMap::new()),
        })
    }

    /// Read a template and its sidecar from disk, replacing any cached copy.
    ///
    /// `name` may carry the `.png` extension. Fully transparent pixels have
    /// their colour zeroed, the same normalisation detection applies to sources.
    pub fn load(&self, name: &str) -> GuiBuildResult<Rc<Template>> {
        let name = template_key(name).to_string();
        let path = self.dir.join(format!("{name}.{TEMPLATE_EXTENSION}"));
        if !path.is_file() {
            return Err(GuiBuildError::TemplateMissing {
                name,
                dir: self.dir.clone(),
            });
        }

        let mut image = image::open(&path)
            .map_err(|source| GuiBuildError::TemplateDecode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        clear_transparent(&mut image);

        let metadata_path = self.dir.join(format!("{name}.{METADATA_EXTENSION}"));
        let metadata = if metadata_path.is_file() {
            let raw = std::fs::read_to_string(&metadata_path).map_err(|source| {
                GuiBuildError::Io {
                    path: metadata_path.clone(),
                    source,
                }
            })?;
            serde_json::from_str(&raw).map_err(|source| GuiBuildError::MetadataParse {
                path: metadata_path.clone(),
                source,
            })?
        } else {
            TemplateMetadata::default()
        };

        log::debug!(
            "Loaded template '{}' ({}x{}, {:?})",
            name,
            image.width(),
            image.height(),
            metadata
        );

        let template = Rc::new(Template {
            name: name.clone(),
            path,
            image,
            metadata,
        });
        self.templates.borrow_mut().insert(name, Rc::clone(&template));
        Ok(template)
    }

    /// Memoized template lookup, loading on first access.
    pub fn get(&self, name: &str) -> GuiBuildResult<Rc<Template>> {
        if let Some(template) = self.templates.borrow().get(template_key(name)) {
            return Ok(Rc::clone(template));
        }
        self.load(name)
    }

    pub fn metadata(&self, name: &str) -> GuiBuildResult<TemplateMetadata> {
        Ok(self.get(name)?.metadata)
    }

    /// Every template in the directory, largest pixel area first.
    ///
    /// Larger templates must be tried before smaller ones during scattered
    /// matching. Equal areas are ordered by name so the result is stable.
    pub fn enumerate(&self) -> GuiBuildResult<Vec<Rc<Template>>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| GuiBuildError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| GuiBuildError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }

        let mut templates = names
            .iter()
            .map(|name| self.get(name))
            .collect::<GuiBuildResult<Vec<_>>>()?;
        templates.sort_by(|a, b| b.area().cmp(&a.area()).then_with(|| a.name.cmp(&b.name)));
        Ok(templates)
    }

    /// Stable sort of regions by their template's layer, lowest first.
    ///
    /// Unnamed regions sit on the default layer.
    pub fn order_by_layer(&self, regions: Vec<Region>) -> GuiBuildResult<Vec<Region>> {
        let mut layered = regions
            .into_iter()
            .map(|region| -> GuiBuildResult<(i32, Region)> {
                let layer = match region.name() {
                    Some(name) => self.metadata(name)?.layer,
                    None => DEFAULT_LAYER,
                };
                Ok((layer, region))
            })
            .collect::<GuiBuildResult<Vec<_>>>()?;
        layered.sort_by_key(|(layer, _)| *layer);
        Ok(layered.into_iter().map(|(_, region)| region).collect())
    }

    /// Read the library-wide configuration file; `scale_multiplier` must be at least 1.
    pub fn config(&self) -> GuiBuildResult<LibraryConfig> {
        let path = self.dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(GuiBuildError::LibraryConfigMissing { path });
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| GuiBuildError::Io {
            path: path.clone(),
            source,
        })?;
        let config: LibraryConfig = serde_json::from_str(&raw).map_err(|source| {
            GuiBuildError::MetadataParse {
                path: path.clone(),
                source,
            }
        })?;
        if config.scale_multiplier == 0 {
            return Err(GuiBuildError::InvalidScaleMultiplier { path });
        }
        Ok(config)
    }
}
