//! Spritemap manifest: where every packed image ended up.
//!
//! The JSON layout is the one the runtime loader reads:
//!
//! ```json
//! {
//!   "ATLAS": { "SPRITES": [ { "xflname": "...", "svgname": "...", "x": 0, "y": 0, ... } ] },
//!   "meta":  { "app": "...", "version": "...", "format": "SVG", "size": { "w": 8192, "h": 8192 } }
//! }
//! ```
//!
//! `x`/`y` are the center of the placement rectangle. `manifest_id` hashes
//! everything except the export timestamp, so two exports of the same
//! document with the same config share an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, quantize, CanonicalError};
use crate::config::ExportConfig;
use crate::packer::{PackOutcome, Rect};
use crate::ATLAS_SCHEMA_VERSION;

/// One placed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteEntry {
    /// Identity of the source element.
    pub xflname: String,
    /// Name of the exported asset.
    pub svgname: String,
    /// Center x on the page.
    pub x: f64,
    /// Center y on the page.
    pub y: f64,
    /// Placement width.
    pub width: u32,
    /// Placement height.
    pub height: u32,
    /// Rescale factor to undo when drawing.
    #[serde(rename = "applyScale")]
    pub apply_scale: f64,
    /// Page file holding the image.
    pub filename: String,
}

impl SpriteEntry {
    /// Build an entry from a placement rectangle.
    pub fn new(
        xflname: impl Into<String>,
        svgname: impl Into<String>,
        rect: Rect,
        apply_scale: f64,
        filename: impl Into<String>,
    ) -> Self {
        let (x, y) = rect.center();
        Self {
            xflname: xflname.into(),
            svgname: svgname.into(),
            x,
            y,
            width: rect.width,
            height: rect.height,
            apply_scale,
            filename: filename.into(),
        }
    }
}

/// Sprite list section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtlasSection {
    /// Placed images, page by page.
    #[serde(rename = "SPRITES")]
    pub sprites: Vec<SpriteEntry>,
}

/// Page dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

/// Manifest metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMeta {
    /// Producing application.
    pub app: String,
    /// Manifest schema version.
    pub version: String,
    /// Page image format.
    pub format: String,
    /// Page size.
    pub size: PageSize,
    /// Page files in page order.
    pub pages: Vec<String>,
    /// Hash of the export config.
    pub config_hash: String,
    /// Content hash of the manifest.
    pub manifest_id: String,
    /// When the manifest was built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

/// The complete spritemap manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteManifest {
    /// Sprite placements.
    #[serde(rename = "ATLAS")]
    pub atlas: AtlasSection,
    /// Metadata.
    pub meta: ManifestMeta,
}

impl SpriteManifest {
    /// Pretty JSON, four-space indented like the files the runtime ships with.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Sprites stored on one page file.
    pub fn sprites_on<'a>(&'a self, filename: &'a str) -> impl Iterator<Item = &'a SpriteEntry> {
        self.atlas
            .sprites
            .iter()
            .filter(move |sprite| sprite.filename == filename)
    }
}

/// Sprite as hashed into manifest_id, with floats quantized.
#[derive(Serialize)]
struct HashedSprite<'a> {
    xflname: &'a str,
    svgname: &'a str,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    apply_scale: i64,
    filename: &'a str,
}

impl<'a> From<&'a SpriteEntry> for HashedSprite<'a> {
    fn from(sprite: &'a SpriteEntry) -> Self {
        Self {
            xflname: &sprite.xflname,
            svgname: &sprite.svgname,
            x: quantize(sprite.x),
            y: quantize(sprite.y),
            width: sprite.width,
            height: sprite.height,
            apply_scale: quantize(sprite.apply_scale),
            filename: &sprite.filename,
        }
    }
}

/// Internal struct for computing manifest_id.
#[derive(Serialize)]
struct ManifestIdInput<'a> {
    sprites: Vec<HashedSprite<'a>>,
    app: &'a str,
    version: &'a str,
    format: &'a str,
    size: PageSize,
    pages: &'a [String],
    config_hash: &'a str,
}

/// Builder for spritemap manifests.
pub struct ManifestBuilder {
    app: String,
    format: String,
    size: PageSize,
    config: ExportConfig,
    pages: Vec<String>,
    sprites: Vec<SpriteEntry>,
    exported_at: Option<DateTime<Utc>>,
}

impl ManifestBuilder {
    /// Create a builder for manifests produced under `config`.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            app: config.app_name.clone(),
            format: config.image_format.clone(),
            size: PageSize {
                w: config.page_width,
                h: config.page_height,
            },
            config: config.clone(),
            pages: Vec::new(),
            sprites: Vec::new(),
            exported_at: None,
        }
    }

    /// Add a page file and its sprites.
    pub fn page(mut self, filename: impl Into<String>, sprites: Vec<SpriteEntry>) -> Self {
        self.pages.push(filename.into());
        self.sprites.extend(sprites);
        self
    }

    /// Add every page of a packing outcome, naming sprites with `names`.
    pub fn outcome<T>(
        mut self,
        outcome: &PackOutcome<T>,
        mut names: impl FnMut(&T) -> (String, String),
    ) -> Self {
        for page in &outcome.pages {
            let filename = self.config.page_filename(page.index);
            let sprites = page
                .placements
                .iter()
                .map(|placement| {
                    let (xflname, svgname) = names(&placement.image.data);
                    SpriteEntry::new(
                        xflname,
                        svgname,
                        placement.rect,
                        placement.image.apply_scale,
                        filename.clone(),
                    )
                })
                .collect();
            self = self.page(filename, sprites);
        }
        self
    }

    /// Stamp the manifest with an export time.
    pub fn exported_at(mut self, at: DateTime<Utc>) -> Self {
        self.exported_at = Some(at);
        self
    }

    /// Stamp the manifest with the current time.
    pub fn exported_now(self) -> Self {
        self.exported_at(Utc::now())
    }

    /// Build the manifest.
    pub fn build(self) -> Result<SpriteManifest, CanonicalError> {
        let config_hash = self.config.params_hash()?;
        let manifest_id = canonical_hash_hex(&ManifestIdInput {
            sprites: self.sprites.iter().map(HashedSprite::from).collect(),
            app: &self.app,
            version: ATLAS_SCHEMA_VERSION,
            format: &self.format,
            size: self.size,
            pages: &self.pages,
            config_hash: &config_hash,
        })?;

        Ok(SpriteManifest {
            atlas: AtlasSection {
                sprites: self.sprites,
            },
            meta: ManifestMeta {
                app: self.app,
                version: ATLAS_SCHEMA_VERSION.to_string(),
                format: self.format,
                size: self.size,
                pages: self.pages,
                config_hash,
                manifest_id,
                exported_at: self.exported_at,
            },
        })
    }
}
