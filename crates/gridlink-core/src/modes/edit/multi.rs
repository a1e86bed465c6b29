//! All-For-One and Parallel tools, which connect a picked set of nodes in one drag.

use super::{EditTargets, SubmodeHandler, nodes_in_rect, target_node_at};
use crate::config::EditorConfig;
use crate::graph::{Graph, NodeId};
use crate::input::{Key, KeyEvent};
use crate::modes::{EditSubmode, EditorContext, Outcome, Pointer, RectSelection};
use crate::overlay::Overlay;
use kurbo::{Line, Point, Vec2};

/// How a multi-node drag turns into edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiKind {
    /// Every picked node connects to the node the drag ends on.
    AllForOne,
    /// The drag's displacement is replayed from every picked node.
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingDrag {
    node: NodeId,
    press: Point,
}

/// Multi-select tool shared by All-For-One and Parallel.
///
/// Nodes are picked by clicking or rubber band; dragging from a picked node
/// draws the edges on release.
#[derive(Debug)]
pub struct MultiConnectTool {
    kind: MultiKind,
    selected: Vec<NodeId>,
    edge_start: Option<NodeId>,
    temp_end: Point,
    pending: Option<PendingDrag>,
    rect: Option<RectSelection>,
}

impl MultiConnectTool {
    pub fn new(kind: MultiKind) -> Self {
        Self {
            kind,
            selected: Vec::new(),
            edge_start: None,
            temp_end: Point::ZERO,
            pending: None,
            rect: None,
        }
    }

    pub fn kind(&self) -> MultiKind {
        self.kind
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub(super) fn retain_existing(&mut self, graph: &Graph) {
        self.selected.retain(|&n| graph.node(n).is_some());
        if self.edge_start.is_some_and(|n| graph.node(n).is_none()) {
            self.edge_start = None;
        }
    }

    fn push_unique(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            if !self.selected.contains(&node) {
                self.selected.push(node);
            }
        }
    }

    /// Pointer displacement from the start node, if an edge is being drawn.
    fn displacement(&self, graph: &Graph) -> Option<Vec2> {
        let start = graph.node(self.edge_start?)?;
        Some(self.temp_end - start.position)
    }

    fn connect_all_for_one(&self, ctx: &mut EditorContext<'_>, targets: &EditTargets, start: NodeId, end: Point) {
        let Some(target) = ctx.graph.find_node_at_position(end) else {
            return;
        };
        if target == start {
            return;
        }
        let mut added = 0;
        for &source in &self.selected {
            if source != target && targets.contains_node(ctx.graph, source) && ctx.graph.add_edge(source, target) {
                added += 1;
            }
        }
        log::debug!("All-for-one added {added} edges into node {target}");
    }

    fn connect_parallel(&self, ctx: &mut EditorContext<'_>, targets: &EditTargets, start: NodeId, end: Point) {
        let Some(origin) = ctx.graph.node(start).map(|n| n.position) else {
            return;
        };
        let delta = end - origin;
        let mut added = 0;
        for &source in &self.selected {
            let Some((from, reach)) = ctx.graph.node(source).map(|n| (n.position, n.size / 2.0)) else {
                continue;
            };
            // The source's own half-size sets the reach, whatever the candidate's size.
            let landing = from + delta;
            let target = ctx
                .graph
                .nodes()
                .iter()
                .find(|n| (n.position - landing).hypot() <= reach)
                .map(|n| n.id);
            let Some(target) = target else {
                continue;
            };
            if target != source && targets.contains_node(ctx.graph, source) && ctx.graph.add_edge(source, target) {
                added += 1;
            }
        }
        log::debug!("Parallel connect added {added} edges");
    }

    fn toggle_all(&mut self, graph: &Graph, targets: &EditTargets) {
        let eligible = targets.nodes(graph);
        if !eligible.is_empty() && eligible.iter().all(|n| self.selected.contains(n)) {
            self.selected.clear();
        } else {
            self.selected = eligible;
        }
    }
}

impl SubmodeHandler for MultiConnectTool {
    fn press(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome {
        if let Some(node) = target_node_at(ctx, targets, pointer) {
            if self.selected.contains(&node) {
                self.pending = Some(PendingDrag {
                    node,
                    press: pointer.canvas,
                });
            } else {
                if !pointer.shift() {
                    self.selected.clear();
                }
                self.selected.push(node);
            }
            return Outcome::Handled;
        }

        if !pointer.shift() {
            self.selected.clear();
        }
        self.rect = Some(RectSelection::new(pointer.world));
        Outcome::Handled
    }

    fn drag(&mut self, ctx: &mut EditorContext<'_>, _targets: &EditTargets, pointer: Pointer) -> Outcome {
        if let Some(pending) = self.pending {
            if ctx.exceeds_drag_threshold(pending.press, pointer.canvas) {
                self.pending = None;
                self.edge_start = Some(pending.node);
                self.temp_end = pointer.world;
            }
            return Outcome::Handled;
        }
        if self.edge_start.is_some() {
            self.temp_end = pointer.world;
            return Outcome::Handled;
        }
        if let Some(band) = self.rect.as_mut() {
            band.current = pointer.world;
            return Outcome::Handled;
        }
        Outcome::Ignored
    }

    fn release(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome {
        if let Some(pending) = self.pending.take() {
            self.selected.retain(|&n| n != pending.node);
            return Outcome::Handled;
        }
        if let Some(start) = self.edge_start.take() {
            match self.kind {
                MultiKind::AllForOne => self.connect_all_for_one(ctx, targets, start, pointer.world),
                MultiKind::Parallel => self.connect_parallel(ctx, targets, start, pointer.world),
            }
            return Outcome::Handled;
        }
        if let Some(mut band) = self.rect.take() {
            band.current = pointer.world;
            let nodes = nodes_in_rect(ctx.graph, targets, band.rect(), band.is_left_to_right());
            self.push_unique(nodes);
            return Outcome::Handled;
        }
        Outcome::Ignored
    }

    fn key(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, key: KeyEvent) -> Outcome {
        match key.key {
            Key::Escape => {
                self.reset();
                self.selected.clear();
                Outcome::SwitchSubmode(EditSubmode::Connect)
            }
            Key::Enter if self.kind == MultiKind::AllForOne => Outcome::SwitchSubmode(EditSubmode::Connect),
            _ if key.modifiers.command() && key.is_char('a') => {
                self.toggle_all(ctx.graph, targets);
                Outcome::Handled
            }
            _ => Outcome::Ignored,
        }
    }

    fn edge_start(&self) -> Option<NodeId> {
        self.edge_start
    }

    fn hover_companions(&self) -> &[NodeId] {
        &self.selected
    }

    fn reset(&mut self) {
        self.edge_start = None;
        self.pending = None;
        self.rect = None;
    }

    fn overlay(&self, graph: &Graph, _config: &EditorConfig, _targets: &EditTargets, overlay: &mut Overlay) {
        overlay.multi_selected = self.selected.clone();
        overlay.selection_rect = self.rect.map(Into::into);
        let Some(start) = self.edge_start.and_then(|id| graph.node(id)) else {
            return;
        };
        overlay.temp_edge = Some(Line::new(start.position, self.temp_end));
        if self.kind == MultiKind::Parallel {
            let delta = self.displacement(graph).unwrap_or_default();
            overlay.parallel_edges = self
                .selected
                .iter()
                .filter_map(|&id| graph.node(id))
                .map(|n| Line::new(n.position, n.position + delta))
                .collect();
        }
    }
}
