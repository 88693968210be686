//! Scoped edit contexts on the authoring host.
//!
//! Editing a shape nested inside symbols requires the host to "enter" each
//! enclosing symbol instance in turn, outermost first. A [`ScopeSession`]
//! keeps the stack of entered symbols and moves between targets through their
//! lowest common ancestor: it exits only the scopes that are not shared and
//! enters only the missing ones.
//!
//! Whatever is still entered when the session is dropped is exited in reverse
//! entry order, on every exit path.

use crate::store::DocumentSource;
use crate::timeline::{ElementSite, TimelineGraph};
use crate::types::{LayerId, ShapeRef, SymbolId, SymbolRef};

/// Failure reported by the authoring host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct HostError {
    /// Host operation that failed.
    pub operation: &'static str,
    /// Host-provided message.
    pub message: String,
}

impl HostError {
    /// Create a host error.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Host-side location of an element: layer, frame and slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementTarget {
    /// Stable id of the layer.
    pub layer: LayerId,
    /// Layer index inside its timeline.
    pub layer_index: usize,
    /// Frame index on the layer.
    pub frame_index: u32,
    /// Slot within the frame.
    pub slot: usize,
}

impl ElementTarget {
    /// Resolve a graph site into a host target.
    pub fn from_site<S: DocumentSource + ?Sized>(graph: &TimelineGraph<'_, S>, site: &ElementSite) -> Self {
        let layer = graph.layer(site.layer);
        Self {
            layer: layer.id.clone(),
            layer_index: layer.index,
            frame_index: site.frame_index,
            slot: site.slot,
        }
    }
}

/// Edit-context operations of the authoring host.
pub trait EditScopeHost {
    /// Enter the edit context of the symbol instance at `target`, relative to
    /// the current context.
    fn enter_scope(&mut self, symbol: &SymbolId, target: &ElementTarget) -> Result<(), HostError>;

    /// Leave the innermost edit context.
    fn exit_scope(&mut self);

    /// Select the element at `target` in the current context.
    fn select(&mut self, target: &ElementTarget) -> Result<(), HostError>;
}

/// Stack of entered symbol scopes, released on drop.
pub struct ScopeSession<'h, H: EditScopeHost + ?Sized> {
    host: &'h mut H,
    stack: Vec<SymbolRef>,
}

impl<'h, H: EditScopeHost + ?Sized> ScopeSession<'h, H> {
    /// Start a session at the document root.
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            stack: Vec::new(),
        }
    }

    /// Currently entered symbols, outermost first.
    pub fn stack(&self) -> &[SymbolRef] {
        &self.stack
    }

    /// Innermost entered symbol.
    pub fn current(&self) -> Option<SymbolRef> {
        self.stack.last().copied()
    }

    /// Access the host while the scopes stay entered.
    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Make `target` the innermost scope (`None` is the document root).
    ///
    /// On a host failure the scopes entered so far stay on the stack.
    pub fn enter<S: DocumentSource + ?Sized>(
        &mut self,
        graph: &TimelineGraph<'_, S>,
        target: Option<SymbolRef>,
    ) -> Result<(), HostError> {
        // Walk from the target up to the first ancestor already entered.
        let mut missing = Vec::new();
        let mut ancestor = None;
        let mut cursor = target;
        while let Some(symbol) = cursor {
            if self.stack.contains(&symbol) {
                ancestor = Some(symbol);
                break;
            }
            if missing.len() > graph.num_symbols() {
                break;
            }
            missing.push(symbol);
            cursor = graph.parent_symbol(graph.symbol(symbol).origin.layer);
        }

        while let Some(&top) = self.stack.last() {
            if Some(top) == ancestor {
                break;
            }
            self.host.exit_scope();
            self.stack.pop();
        }

        while let Some(symbol) = missing.pop() {
            let definition = graph.symbol(symbol);
            let target = ElementTarget::from_site(graph, &definition.origin);
            tracing::debug!(symbol = %definition.id, depth = self.stack.len(), "Entering scope");
            self.host.enter_scope(&definition.id, &target)?;
            self.stack.push(symbol);
        }
        Ok(())
    }

    /// Enter the symbol that owns `shape` and select the shape.
    pub fn select_element<S: DocumentSource + ?Sized>(
        &mut self,
        graph: &TimelineGraph<'_, S>,
        shape: ShapeRef,
    ) -> Result<(), HostError> {
        let site = graph.shape(shape).site;
        self.enter(graph, graph.parent_symbol(site.layer))?;
        self.host.select(&ElementTarget::from_site(graph, &site))
    }

    /// Exit every entered scope.
    pub fn exit_all(&mut self) {
        while self.stack.pop().is_some() {
            self.host.exit_scope();
        }
    }
}

impl<H: EditScopeHost + ?Sized> Drop for ScopeSession<'_, H> {
    fn drop(&mut self) {
        self.exit_all();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::InMemoryDocument;
    use crate::types::{InstanceInfo, RawElement, RawLayer};

    /// Host that records every call.
    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub calls: Vec<String>,
        pub refuse_enter: Option<String>,
    }

    impl EditScopeHost for RecordingHost {
        fn enter_scope(&mut self, symbol: &SymbolId, _target: &ElementTarget) -> Result<(), HostError> {
            if self.refuse_enter.as_deref() == Some(symbol.as_str()) {
                return Err(HostError::new("enter_scope", "locked"));
            }
            self.calls.push(format!("enter {symbol}"));
            Ok(())
        }

        fn exit_scope(&mut self) {
            self.calls.push("exit".to_string());
        }

        fn select(&mut self, target: &ElementTarget) -> Result<(), HostError> {
            self.calls.push(format!("select {}_F{}_E{}", target.layer, target.frame_index, target.slot));
            Ok(())
        }
    }

    /// root ─ Body ─┬─ Arm ─ (shape)
    ///              └─ Leg ─ (shape)
    pub(crate) fn nested_document() -> InMemoryDocument {
        let instance = |name: &str| RawElement::instance(InstanceInfo::graphic(name));
        InMemoryDocument::new()
            .with_layer(RawLayer::new("root").keyframe(1, vec![instance("Body")]))
            .with_symbol(
                "Body",
                vec![RawLayer::new("limbs").keyframe(1, vec![instance("Arm"), instance("Leg")])],
            )
            .with_symbol("Arm", vec![RawLayer::new("a").keyframe(1, vec![RawElement::shape()])])
            .with_symbol("Leg", vec![RawLayer::new("l").keyframe(1, vec![RawElement::shape()])])
    }

    fn expand(graph: &mut TimelineGraph<'_, InMemoryDocument>) {
        let root = graph.root_layers()[0];
        let body = graph.frame_occurrences(root, 0).unwrap().remove(0);
        graph.all_symbol_frames(&body).unwrap();
    }

    fn symbol(graph: &TimelineGraph<'_, InMemoryDocument>, id: &str) -> SymbolRef {
        graph.symbol_by_id(&SymbolId::new(id)).unwrap()
    }

    #[test]
    fn test_enter_walks_through_common_ancestor() {
        let doc = nested_document();
        let mut graph = TimelineGraph::new(&doc);
        expand(&mut graph);
        let (arm, leg) = (symbol(&graph, "Arm"), symbol(&graph, "Leg"));

        let mut host = RecordingHost::default();
        {
            let mut session = ScopeSession::new(&mut host);
            session.enter(&graph, Some(arm)).unwrap();
            session.enter(&graph, Some(leg)).unwrap();
            assert_eq!(session.stack().len(), 2);
        }
        assert_eq!(
            host.calls,
            vec!["enter Body", "enter Arm", "exit", "enter Leg", "exit", "exit"]
        );
    }

    #[test]
    fn test_select_element_enters_owner() {
        let doc = nested_document();
        let mut graph = TimelineGraph::new(&doc);
        expand(&mut graph);
        // Depth-first expansion visits Leg before Arm.
        let (shape, _) = graph.shapes().next().unwrap();

        let mut host = RecordingHost::default();
        {
            let mut session = ScopeSession::new(&mut host);
            session.select_element(&graph, shape).unwrap();
            session.enter(&graph, None).unwrap();
            assert!(session.stack().is_empty());
        }
        assert_eq!(
            host.calls,
            vec!["enter Body", "enter Leg", "select Leg_L0_F0_E0", "exit", "exit"]
        );
    }

    #[test]
    fn test_failed_enter_still_releases_entered_scopes() {
        let doc = nested_document();
        let mut graph = TimelineGraph::new(&doc);
        expand(&mut graph);
        let arm = symbol(&graph, "Arm");

        let mut host = RecordingHost {
            refuse_enter: Some("Arm".to_string()),
            ..Default::default()
        };
        {
            let mut session = ScopeSession::new(&mut host);
            assert!(session.enter(&graph, Some(arm)).is_err());
            assert_eq!(session.stack().len(), 1);
        }
        assert_eq!(host.calls, vec!["enter Body", "exit"]);
    }
}
