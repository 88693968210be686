//! Shape spritesheet pass.
//!
//! Every shape met during the export is converted by the host into an
//! exportable asset, packed onto pages and written out page by page:
//!
//! 1. Convert shapes inside their owning edit scope. Failed conversions are
//!    retried in later rounds for as long as a round makes progress (a
//!    conversion can depend on the selection state another one leaves).
//! 2. Pack the converted assets with the configured page size.
//! 3. Export each page; a page the host cannot write is logged and skipped.
//! 4. Describe the surviving placements in a [`SpriteManifest`].
//!
//! [`layout_shape_bounds`] is the host-free variant: it packs the bounds the
//! document already reports for each exported shape.

use crate::canonical::CanonicalError;
use crate::config::ExportConfig;
use crate::diagnostics::{ExportIssue, IssueLog};
use crate::exporter::ExportSet;
use crate::manifest::{ManifestBuilder, SpriteEntry, SpriteManifest};
use crate::packer::{pack_images, ImagePacker, PackError, PackImage};
use crate::scope::{EditScopeHost, HostError, ScopeSession};
use crate::store::DocumentSource;
use crate::timeline::TimelineGraph;
use crate::types::{ShapeId, ShapeRef};

/// Error type for the spritesheet pass.
#[derive(Debug, thiserror::Error)]
pub enum SpritesheetError {
    /// The packer could not be set up.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// The manifest could not be hashed.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

/// A shape converted into an exportable asset.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedShape {
    /// Host-side asset name.
    pub asset_name: String,
    /// Width of the asset.
    pub width: f64,
    /// Height of the asset.
    pub height: f64,
}

/// Asset-level operations of the authoring host.
pub trait SpritesheetHost: EditScopeHost {
    /// Convert the currently selected shape into an asset named after `shape`.
    fn convert_shape(&mut self, shape: &ShapeId) -> Result<ConvertedShape, HostError>;

    /// Write one page holding `sprites` to `filename`.
    fn export_page(&mut self, filename: &str, sprites: &[SpriteEntry]) -> Result<(), HostError>;
}

/// Packed asset payload.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpriteSource {
    shape: ShapeId,
    asset_name: String,
}

/// Result of the spritesheet pass.
#[derive(Debug, Clone)]
pub struct SpritesheetOutcome {
    /// Manifest of the pages that were written.
    pub manifest: SpriteManifest,
    /// Shapes converted.
    pub converted: usize,
    /// Shapes that never converted.
    pub unconverted: Vec<ShapeId>,
}

/// Convert, pack and export every shape of `graph`.
pub fn dump_shape_spritesheet<S, H>(
    graph: &TimelineGraph<'_, S>,
    host: &mut H,
    config: &ExportConfig,
    log: &mut IssueLog,
) -> Result<SpritesheetOutcome, SpritesheetError>
where
    S: DocumentSource + ?Sized,
    H: SpritesheetHost + ?Sized,
{
    let mut packer = ImagePacker::from_config(config)?;
    let pending: Vec<ShapeRef> = graph.shapes().map(|(shape, _)| shape).collect();
    let total = pending.len();

    let unconverted = {
        let mut session = ScopeSession::new(&mut *host);
        convert_all(graph, &mut session, pending, config.max_conversion_rounds, &mut packer)
    };
    for (shape, err) in &unconverted {
        log.record(ExportIssue::ConversionFailed {
            shape: graph.shape(*shape).id.clone(),
            message: err.to_string(),
        });
    }
    let converted = packer.len();
    tracing::info!(converted, total, "Converted shapes");

    let outcome = packer.pack();
    log.extend(outcome.failures.iter().cloned().map(ExportIssue::from));

    let mut builder = ManifestBuilder::new(config);
    for page in &outcome.pages {
        let filename = config.page_filename(page.index);
        let sprites: Vec<SpriteEntry> = page
            .placements
            .iter()
            .map(|placement| {
                SpriteEntry::new(
                    placement.image.data.shape.as_str(),
                    placement.image.data.asset_name.as_str(),
                    placement.rect,
                    placement.image.apply_scale,
                    filename.as_str(),
                )
            })
            .collect();

        match host.export_page(&filename, &sprites) {
            Ok(()) => builder = builder.page(filename, sprites),
            Err(err) => log.record(ExportIssue::PageExportFailed {
                page: filename,
                message: err.to_string(),
            }),
        }
    }

    Ok(SpritesheetOutcome {
        manifest: builder.exported_now().build()?,
        converted,
        unconverted: unconverted
            .into_iter()
            .map(|(shape, _)| graph.shape(shape).id.clone())
            .collect(),
    })
}

/// Lay out every exported shape by its reported bounds.
///
/// Shapes without bounds are recorded as [`ExportIssue::MissingBounds`] and
/// skipped; packing failures are recorded as overflows.
pub fn layout_shape_bounds(
    export: &ExportSet,
    config: &ExportConfig,
    log: &mut IssueLog,
) -> Result<SpriteManifest, SpritesheetError> {
    let mut images = Vec::with_capacity(export.shapes.len());
    for shape in &export.shapes {
        match shape.bounds {
            Some(bounds) => images.push(PackImage::new(
                shape.id.as_str(),
                shape.id.clone(),
                bounds.width,
                bounds.height,
            )),
            None => log.record(ExportIssue::MissingBounds {
                shape: shape.id.clone(),
            }),
        }
    }

    let outcome = pack_images(images, config)?;
    log.extend(outcome.failures.iter().cloned().map(ExportIssue::from));

    Ok(ManifestBuilder::new(config)
        .outcome(&outcome, |id| (id.to_string(), id.to_string()))
        .exported_now()
        .build()?)
}

/// Convert shapes in rounds; returns those that never converted.
fn convert_all<S, H>(
    graph: &TimelineGraph<'_, S>,
    session: &mut ScopeSession<'_, H>,
    mut pending: Vec<ShapeRef>,
    max_rounds: usize,
    packer: &mut ImagePacker<SpriteSource>,
) -> Vec<(ShapeRef, HostError)>
where
    S: DocumentSource + ?Sized,
    H: SpritesheetHost + ?Sized,
{
    let mut failed = Vec::new();
    for round in 0..max_rounds.max(1) {
        let before = pending.len();
        failed = Vec::new();

        for shape in pending {
            match convert_one(graph, session, shape) {
                Ok(converted) => {
                    let id = graph.shape(shape).id.clone();
                    packer.add_image(PackImage::new(
                        id.as_str(),
                        SpriteSource {
                            shape: id.clone(),
                            asset_name: converted.asset_name,
                        },
                        converted.width,
                        converted.height,
                    ));
                }
                Err(err) => {
                    tracing::debug!(shape = %graph.shape(shape).id, round, error = %err, "Delaying conversion");
                    failed.push((shape, err));
                }
            }
        }

        if failed.is_empty() || failed.len() == before {
            break;
        }
        pending = failed.iter().map(|(shape, _)| *shape).collect();
    }
    failed
}

fn convert_one<S, H>(
    graph: &TimelineGraph<'_, S>,
    session: &mut ScopeSession<'_, H>,
    shape: ShapeRef,
) -> Result<ConvertedShape, HostError>
where
    S: DocumentSource + ?Sized,
    H: SpritesheetHost + ?Sized,
{
    session.select_element(graph, shape)?;
    session.host().convert_shape(&graph.shape(shape).id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::scope::ElementTarget;
    use crate::store::InMemoryDocument;
    use crate::types::{InstanceInfo, RawElement, RawLayer, SymbolId};
    use std::collections::BTreeMap;

    /// Host whose conversions fail a set number of times per shape.
    #[derive(Default)]
    struct FakeHost {
        depth: usize,
        max_depth: usize,
        failures_left: BTreeMap<String, usize>,
        sizes: BTreeMap<String, (f64, f64)>,
        refuse_pages: Vec<String>,
        pages: Vec<(String, usize)>,
    }

    impl EditScopeHost for FakeHost {
        fn enter_scope(&mut self, _symbol: &SymbolId, _target: &ElementTarget) -> Result<(), HostError> {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            Ok(())
        }

        fn exit_scope(&mut self) {
            self.depth -= 1;
        }

        fn select(&mut self, _target: &ElementTarget) -> Result<(), HostError> {
            Ok(())
        }
    }

    impl SpritesheetHost for FakeHost {
        fn convert_shape(&mut self, shape: &ShapeId) -> Result<ConvertedShape, HostError> {
            if let Some(left) = self.failures_left.get_mut(shape.as_str()) {
                if *left > 0 {
                    *left -= 1;
                    return Err(HostError::new("convert_shape", "selection lost"));
                }
            }
            let (width, height) = self.sizes.get(shape.as_str()).copied().unwrap_or((10.0, 10.0));
            Ok(ConvertedShape {
                asset_name: format!("Symbol {}", shape),
                width,
                height,
            })
        }

        fn export_page(&mut self, filename: &str, sprites: &[SpriteEntry]) -> Result<(), HostError> {
            if self.refuse_pages.iter().any(|page| page == filename) {
                return Err(HostError::new("export_page", "disk full"));
            }
            self.pages.push((filename.to_string(), sprites.len()));
            Ok(())
        }
    }

    fn make_document() -> InMemoryDocument {
        InMemoryDocument::new()
            .with_layer(RawLayer::new("bg").keyframe(
                1,
                vec![
                    RawElement::shape().with_guid("sky"),
                    RawElement::instance(InstanceInfo::graphic("Tree")),
                ],
            ))
            .with_symbol(
                "Tree",
                vec![RawLayer::new("leaves").keyframe(1, vec![RawElement::shape().with_guid("leaf")])],
            )
    }

    fn expand(graph: &mut TimelineGraph<'_, InMemoryDocument>) {
        let root = graph.root_layers()[0];
        for occurrence in graph.frame_occurrences(root, 0).unwrap() {
            graph.all_symbol_frames(&occurrence).unwrap();
        }
    }

    #[test]
    fn test_converts_packs_and_exports() {
        let doc = make_document();
        let mut graph = TimelineGraph::new(&doc);
        expand(&mut graph);

        let mut host = FakeHost::default();
        let mut log = IssueLog::new();
        let outcome = dump_shape_spritesheet(&graph, &mut host, &ExportConfig::minimal(), &mut log).unwrap();

        assert_eq!(outcome.converted, 2);
        assert!(outcome.unconverted.is_empty());
        assert_eq!(host.depth, 0);
        assert_eq!(host.max_depth, 1);
        assert_eq!(host.pages, vec![("spritemap0.svg".to_string(), 2)]);

        let names: Vec<&str> = outcome.manifest.atlas.sprites.iter().map(|s| s.xflname.as_str()).collect();
        assert_eq!(names, vec!["L0_F0_E0", "Tree_L0_F0_E0"]);
        assert_eq!(outcome.manifest.atlas.sprites[1].svgname, "Symbol Tree_L0_F0_E0");
        assert!(log.issues().is_empty());
    }

    #[test]
    fn test_failed_conversions_retry_while_progressing() {
        let doc = make_document();
        let mut graph = TimelineGraph::new(&doc);
        expand(&mut graph);

        let mut host = FakeHost::default();
        host.failures_left.insert("L0_F0_E0".to_string(), 2);
        let mut log = IssueLog::new();
        let outcome = dump_shape_spritesheet(&graph, &mut host, &ExportConfig::minimal(), &mut log).unwrap();

        // Round one converts the leaf, round two makes no progress on the sky.
        assert_eq!(outcome.converted, 1);
        assert_eq!(outcome.unconverted, vec![ShapeId::new("L0_F0_E0")]);
        assert_eq!(log.issues()[0].kind(), "conversion_failed");

        let mut host = FakeHost::default();
        host.failures_left.insert("L0_F0_E0".to_string(), 1);
        let outcome = dump_shape_spritesheet(&graph, &mut host, &ExportConfig::minimal(), &mut IssueLog::new()).unwrap();
        assert_eq!(outcome.converted, 2);
    }

    #[test]
    fn test_bounds_layout_skips_shapes_without_bounds() {
        let doc = InMemoryDocument::new().with_layer(RawLayer::new("bg").keyframe(
            1,
            vec![
                RawElement::shape().with_guid("sky").with_bounds(20.0, 10.0),
                RawElement::shape().with_guid("ghost"),
            ],
        ));
        let export = crate::exporter::build_export_set(&doc, &ExportConfig::minimal()).unwrap();
        let mut log = IssueLog::new();
        let manifest = layout_shape_bounds(&export, &ExportConfig::minimal(), &mut log).unwrap();

        let names: Vec<&str> = manifest.atlas.sprites.iter().map(|s| s.xflname.as_str()).collect();
        assert_eq!(names, vec!["L0_F0_E0"]);
        assert_eq!(
            log.issues(),
            &[ExportIssue::MissingBounds {
                shape: ShapeId::new("L0_F0_E1"),
            }][..]
        );
        assert!(log.issues().iter().all(|i| i.severity() == Severity::Info));
    }

    #[test]
    fn test_page_and_packing_failures_are_skipped() {
        let doc = make_document();
        let mut graph = TimelineGraph::new(&doc);
        expand(&mut graph);

        let mut host = FakeHost::default();
        host.sizes.insert("L0_F0_E0".to_string(), (64.0, 64.0));
        host.sizes.insert("Tree_L0_F0_E0".to_string(), (100.0, 4.0));
        host.refuse_pages.push("spritemap0.svg".to_string());
        let mut log = IssueLog::new();
        let outcome = dump_shape_spritesheet(&graph, &mut host, &ExportConfig::minimal(), &mut log).unwrap();

        assert!(outcome.manifest.atlas.sprites.is_empty());
        assert!(outcome.manifest.meta.pages.is_empty());
        let kinds: Vec<&str> = log.issues().iter().map(ExportIssue::kind).collect();
        assert_eq!(kinds, vec!["packing_overflow", "page_export_failed"]);
        assert!(log.issues().iter().any(|i| i.severity() == Severity::Error));
    }
}
