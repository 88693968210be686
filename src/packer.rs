//! Greedy first-fit packing of rectangular images into fixed-size pages.
//!
//! The packer keeps one ordered list of free rectangles across all pages.
//! Each image is placed at the top-left corner of the first free rectangle
//! that can hold it; that rectangle is then replaced, in place, by the
//! positive-area pieces left around the image:
//!
//! ```text
//! ┌────────┬──────────┐
//! │ image  │  right   │
//! ├────────┴──────────┤
//! │      bottom       │
//! └───────────────────┘
//! ```
//!
//! (top and left pieces are part of the split too, but are always empty for
//! a top-left placement.) An image that fits no free rectangle opens a new
//! page whose pieces are appended to the end of the list. An image larger
//! than a page is reported as a failure and packing continues.
//!
//! ## Invariants
//!
//! - Placements on one page never overlap and stay inside the page.
//! - Output depends only on the input order.

use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;

/// Error type for packer setup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// Page dimensions must be positive.
    #[error("Page size must be positive, got {width}x{height}")]
    EmptyPage {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
}

/// Axis-aligned rectangle in page pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive). Widened so huge rectangles cannot wrap.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the rectangle has positive width and height.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Center point.
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    /// Whether the interiors of two rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        u64::from(self.x) < other.right()
            && u64::from(other.x) < self.right()
            && u64::from(self.y) < other.bottom()
            && u64::from(other.y) < self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    fn from_edges(left: u64, top: u64, right: u64, bottom: u64) -> Self {
        Self::new(
            clamp_px(left),
            clamp_px(top),
            clamp_px(right.saturating_sub(left)),
            clamp_px(bottom.saturating_sub(top)),
        )
    }
}

fn clamp_px(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// An image waiting to be packed.
#[derive(Debug, Clone, PartialEq)]
pub struct PackImage<T> {
    /// Name used in failure reports.
    pub name: String,
    /// Opaque payload carried through to the placement.
    pub data: T,
    /// Width in whole pixels.
    pub width: u32,
    /// Height in whole pixels.
    pub height: u32,
    /// Rescale factor to apply when drawing the image.
    pub apply_scale: f64,
}

impl<T> PackImage<T> {
    /// Create an image, rounding fractional sizes up.
    pub fn new(name: impl Into<String>, data: T, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            data,
            width: ceil_px(width),
            height: ceil_px(height),
            apply_scale: 1.0,
        }
    }
}

fn ceil_px(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.ceil().min(f64::from(u32::MAX)) as u32
    }
}

/// A free rectangle on a given page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOption {
    /// Page index.
    pub page: usize,
    /// Free area.
    pub rect: Rect,
}

impl PositionOption {
    /// Top-left placement of a `width` x `height` image, if it fits.
    pub fn try_insert(&self, width: u32, height: u32) -> Option<Rect> {
        if width == 0 || height == 0 || width > self.rect.width || height > self.rect.height {
            return None;
        }
        Some(Rect::new(self.rect.x, self.rect.y, width, height))
    }

    /// Free pieces left around `placed`: top, left, right, bottom, keeping
    /// only those with positive area.
    pub fn split_around(&self, placed: &Rect) -> Vec<PositionOption> {
        let free = &self.rect;
        let (free_x, free_y) = (u64::from(free.x), u64::from(free.y));
        let (placed_x, placed_y) = (u64::from(placed.x), u64::from(placed.y));
        let top = Rect::from_edges(free_x, free_y, free.right(), placed_y);
        let left = Rect::from_edges(free_x, placed_y, placed_x, placed.bottom());
        let right = Rect::from_edges(placed.right(), placed_y, free.right(), placed.bottom());
        let bottom = Rect::from_edges(free_x, placed.bottom(), free.right(), free.bottom());

        [top, left, right, bottom]
            .into_iter()
            .filter(Rect::has_area)
            .map(|rect| PositionOption {
                page: self.page,
                rect,
            })
            .collect()
    }
}

/// An image with its position on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<T> {
    /// The placed image.
    pub image: PackImage<T>,
    /// Occupied rectangle.
    pub rect: Rect,
}

/// One fixed-size output page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Page index.
    pub index: usize,
    /// Placements in placement order.
    pub placements: Vec<Placement<T>>,
}

/// Why an image was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Zero width or height.
    Empty,
    /// Larger than a page.
    Oversized,
}

/// An image that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackFailure {
    /// Image name.
    pub name: String,
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// Reason.
    pub reason: FailureReason,
}

/// Result of a packing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOutcome<T> {
    /// Pages in creation order.
    pub pages: Vec<Page<T>>,
    /// Images that were left out, in input order.
    pub failures: Vec<PackFailure>,
}

impl<T> PackOutcome<T> {
    /// Total number of placed images.
    pub fn placed_count(&self) -> usize {
        self.pages.iter().map(|page| page.placements.len()).sum()
    }
}

/// Greedy first-fit packer.
#[derive(Debug, Clone)]
pub struct ImagePacker<T> {
    page_width: u32,
    page_height: u32,
    images: Vec<PackImage<T>>,
}

impl<T> ImagePacker<T> {
    /// Create a packer for pages of the given size.
    pub fn new(page_width: u32, page_height: u32) -> Result<Self, PackError> {
        if page_width == 0 || page_height == 0 {
            return Err(PackError::EmptyPage {
                width: page_width,
                height: page_height,
            });
        }
        Ok(Self {
            page_width,
            page_height,
            images: Vec::new(),
        })
    }

    /// Create a packer using the configured page size.
    pub fn from_config(config: &ExportConfig) -> Result<Self, PackError> {
        Self::new(config.page_width, config.page_height)
    }

    /// Queue an image.
    pub fn add_image(&mut self, image: PackImage<T>) {
        self.images.push(image);
    }

    /// Number of queued images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is queued.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Pack all queued images in insertion order.
    pub fn pack(self) -> PackOutcome<T> {
        let page_rect = Rect::new(0, 0, self.page_width, self.page_height);
        let mut options: Vec<PositionOption> = Vec::new();
        let mut pages: Vec<Page<T>> = Vec::new();
        let mut failures = Vec::new();

        for image in self.images {
            let fit = options.iter().enumerate().find_map(|(i, option)| {
                option
                    .try_insert(image.width, image.height)
                    .map(|rect| (i, rect))
            });

            if let Some((i, rect)) = fit {
                let option = options[i];
                options.splice(i..=i, option.split_around(&rect));
                pages[option.page].placements.push(Placement { image, rect });
                continue;
            }

            let fresh = PositionOption {
                page: pages.len(),
                rect: page_rect,
            };
            match fresh.try_insert(image.width, image.height) {
                Some(rect) => {
                    tracing::debug!(
                        page = fresh.page,
                        width = image.width,
                        height = image.height,
                        "Opened page"
                    );
                    options.extend(fresh.split_around(&rect));
                    pages.push(Page {
                        index: fresh.page,
                        placements: vec![Placement { image, rect }],
                    });
                }
                None => {
                    let reason = if image.width == 0 || image.height == 0 {
                        FailureReason::Empty
                    } else {
                        FailureReason::Oversized
                    };
                    tracing::warn!(
                        name = %image.name,
                        width = image.width,
                        height = image.height,
                        ?reason,
                        "Failed to fit image"
                    );
                    failures.push(PackFailure {
                        name: image.name,
                        width: image.width,
                        height: image.height,
                        reason,
                    });
                }
            }
        }

        PackOutcome { pages, failures }
    }
}

/// Pack `images` into pages sized by `config`.
pub fn pack_images<T>(
    images: impl IntoIterator<Item = PackImage<T>>,
    config: &ExportConfig,
) -> Result<PackOutcome<T>, PackError> {
    let mut packer = ImagePacker::from_config(config)?;
    for image in images {
        packer.add_image(image);
    }
    Ok(packer.pack())
}
