//! Element types: the contents of one frame slot.
//!
//! Elements form a closed set of kinds, so they are modelled as a tagged
//! union rather than a trait hierarchy. Only symbol instances carry extra
//! data (library reference and loop metadata).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::Guid;

/// Playback policy of a symbol instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoopMode {
    /// Always display the first frame.
    SingleFrame,
    /// Advance once, then hold on the last frame.
    PlayOnce,
    /// Wrap within the first/last frame window.
    Loop,
    /// Value the resolver does not understand.
    Unknown(String),
}

impl LoopMode {
    /// Parse the authoring tool's loop label.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "single frame" | "single-frame" | "single_frame" => Self::SingleFrame,
            "play once" | "play-once" | "play_once" => Self::PlayOnce,
            "loop" => Self::Loop,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl From<String> for LoopMode {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<LoopMode> for String {
    fn from(mode: LoopMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleFrame => write!(f, "single frame"),
            Self::PlayOnce => write!(f, "play once"),
            Self::Loop => write!(f, "loop"),
            Self::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// Library type of the symbol an instance points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    /// Graphic symbol, timeline driven by the parent.
    #[default]
    Graphic,
    /// Movie clip, plays its own timeline independently.
    MovieClip,
    /// Button symbol.
    Button,
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graphic => write!(f, "graphic"),
            Self::MovieClip => write!(f, "movie clip"),
            Self::Button => write!(f, "button"),
        }
    }
}

/// What an instance element instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceType {
    /// Instance of a library symbol.
    #[default]
    Symbol,
    /// Instance of a library bitmap.
    Bitmap,
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol => write!(f, "symbol"),
            Self::Bitmap => write!(f, "bitmap"),
        }
    }
}

/// Instance-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Name of the referenced library item.
    pub library_item: String,
    /// What the instance instantiates.
    #[serde(default)]
    pub instance_type: InstanceType,
    /// Library type of the referenced item.
    #[serde(default)]
    pub symbol_type: SymbolType,
    /// Loop policy; `None` when the tool left it unset.
    #[serde(default)]
    pub loop_mode: Option<LoopMode>,
    /// First frame of the instance window.
    #[serde(default)]
    pub first_frame: u32,
    /// Last frame of the instance window; `None` means "whole timeline".
    #[serde(default)]
    pub last_frame: Option<u32>,
}

impl InstanceInfo {
    /// Create a graphic instance of `library_item` with unset loop metadata.
    pub fn graphic(library_item: impl Into<String>) -> Self {
        Self {
            library_item: library_item.into(),
            instance_type: InstanceType::Symbol,
            symbol_type: SymbolType::Graphic,
            loop_mode: None,
            first_frame: 0,
            last_frame: None,
        }
    }

    /// Create a movie clip instance of `library_item`.
    pub fn movie_clip(library_item: impl Into<String>) -> Self {
        Self {
            symbol_type: SymbolType::MovieClip,
            ..Self::graphic(library_item)
        }
    }

    /// Set the loop mode.
    pub fn with_loop(mut self, mode: LoopMode) -> Self {
        self.loop_mode = Some(mode);
        self
    }

    /// Set the first/last frame window.
    pub fn with_window(mut self, first_frame: u32, last_frame: Option<u32>) -> Self {
        self.first_frame = first_frame;
        self.last_frame = last_frame;
        self
    }

    /// Whether this instance plays its own timeline independently of the
    /// parent's frame addressing.
    pub fn is_movie_clip(&self) -> bool {
        self.instance_type == InstanceType::Symbol && self.symbol_type == SymbolType::MovieClip
    }
}

/// Kind of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// Leaf vector shape.
    Shape,
    /// Instance of a library item.
    Instance(InstanceInfo),
    /// Linked asset owned by another document.
    External,
}

impl ElementKind {
    /// Label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::Instance(_) => "instance",
            Self::External => "external",
        }
    }
}

/// Pixel bounds of an element as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// One element occupying a frame slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    /// Authoring-tool identifier, when the host exposes one.
    #[serde(default)]
    pub guid: Option<Guid>,
    /// Element kind and kind-specific data.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Bounds, when known.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl RawElement {
    /// Create a shape element.
    pub fn shape() -> Self {
        Self {
            guid: None,
            kind: ElementKind::Shape,
            bounds: None,
        }
    }

    /// Create an instance element.
    pub fn instance(info: InstanceInfo) -> Self {
        Self {
            guid: None,
            kind: ElementKind::Instance(info),
            bounds: None,
        }
    }

    /// Create an external reference element.
    pub fn external() -> Self {
        Self {
            guid: None,
            kind: ElementKind::External,
            bounds: None,
        }
    }

    /// Attach a GUID.
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(Guid::new(guid));
        self
    }

    /// Attach bounds.
    pub fn with_bounds(mut self, width: f64, height: f64) -> Self {
        self.bounds = Some(Bounds { width, height });
        self
    }

    /// Instance data, if this is an instance.
    pub fn instance_info(&self) -> Option<&InstanceInfo> {
        match &self.kind {
            ElementKind::Instance(info) => Some(info),
            _ => None,
        }
    }
}
