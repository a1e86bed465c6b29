//! Connect tool: draw edges between target nodes and select existing ones.

use super::{EditTargets, SubmodeHandler, edges_in_rect, nodes_in_rect, target_node_at};
use crate::config::EditorConfig;
use crate::geometry::nearest_segment;
use crate::graph::{Edge, Graph, NodeId};
use crate::modes::{EditorContext, NodeDrag, Outcome, Pointer, RectSelection};
use crate::overlay::Overlay;
use kurbo::{Line, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenEdge {
    start: NodeId,
    end: Point,
}

/// Draws single edges between target nodes and selects edges or nodes.
#[derive(Debug, Default)]
pub struct ConnectTool {
    edge: Option<OpenEdge>,
    drag: Option<NodeDrag>,
    rect: Option<RectSelection>,
}

impl ConnectTool {
    fn edge_at(ctx: &EditorContext<'_>, targets: &EditTargets, point: Point) -> Option<Edge> {
        let graph = &*ctx.graph;
        let candidates = graph
            .edges()
            .iter()
            .filter(|&&e| targets.touches_edge(graph, e))
            .filter_map(|&e| graph.edge_segment(e).map(|line| (e, line)));
        nearest_segment(candidates, point, ctx.world_distance(ctx.config.hit_tolerance))
    }

    fn finish_edge(ctx: &mut EditorContext<'_>, targets: &EditTargets, edge: OpenEdge, pointer: Pointer) {
        let Some(target) = ctx.graph.find_node_at_position(pointer.world) else {
            return;
        };
        if target == edge.start || !targets.contains_node(ctx.graph, target) {
            return;
        }
        if ctx.graph.has_edge(edge.start, target) {
            log::debug!("Edge {} -> {} already exists", edge.start, target);
            return;
        }
        if ctx.graph.add_edge(edge.start, target) {
            log::debug!("Connected {} -> {}", edge.start, target);
        }
    }

    fn finish_rect(ctx: &mut EditorContext<'_>, targets: &EditTargets, band: RectSelection, add: bool) {
        let rect = band.rect();
        let contain = band.is_left_to_right();
        let edges = edges_in_rect(ctx.graph, targets, rect, contain);
        let nodes = nodes_in_rect(ctx.graph, targets, rect, contain);
        ctx.selection.select_edges(&edges, add);
        ctx.selection.select_nodes(&nodes, add);
    }
}

impl SubmodeHandler for ConnectTool {
    fn press(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome {
        if let Some(edge) = Self::edge_at(ctx, targets, pointer.world) {
            if ctx.selection.is_edge_selected(edge) && !pointer.shift() {
                ctx.selection.deselect_edge(edge);
            } else {
                ctx.selection.select_edge(edge, pointer.shift());
            }
            return Outcome::Handled;
        }

        if let Some(node) = target_node_at(ctx, targets, pointer) {
            if pointer.shift() {
                ctx.selection.select_node(node, true);
                let nodes = ctx.selection.nodes().to_vec();
                self.drag = Some(NodeDrag::begin(ctx.graph, pointer.world, &nodes, Some(node)));
            } else {
                ctx.selection.clear_edges();
                self.edge = Some(OpenEdge {
                    start: node,
                    end: pointer.world,
                });
            }
            return Outcome::Handled;
        }

        if !pointer.shift() {
            ctx.selection.clear_edges();
            ctx.selection.clear_nodes();
        }
        self.rect = Some(RectSelection::new(pointer.world));
        Outcome::Handled
    }

    fn drag(&mut self, ctx: &mut EditorContext<'_>, _targets: &EditTargets, pointer: Pointer) -> Outcome {
        if let Some(edge) = self.edge.as_mut() {
            edge.end = pointer.world;
            return Outcome::Handled;
        }
        if let Some(drag) = &self.drag {
            let snap = ctx.snap_spacing();
            drag.update(ctx.graph, pointer.world, snap);
            return Outcome::Handled;
        }
        if let Some(band) = self.rect.as_mut() {
            band.current = pointer.world;
            return Outcome::Handled;
        }
        Outcome::Ignored
    }

    fn release(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome {
        if let Some(edge) = self.edge.take() {
            Self::finish_edge(ctx, targets, edge, pointer);
            return Outcome::Handled;
        }
        if self.drag.take().is_some() {
            return Outcome::Handled;
        }
        if let Some(mut band) = self.rect.take() {
            band.current = pointer.world;
            Self::finish_rect(ctx, targets, band, pointer.shift());
            return Outcome::Handled;
        }
        Outcome::Ignored
    }

    fn edge_start(&self) -> Option<NodeId> {
        self.edge.map(|e| e.start)
    }

    fn reset(&mut self) {
        self.edge = None;
        self.drag = None;
        self.rect = None;
    }

    fn overlay(&self, graph: &Graph, _config: &EditorConfig, _targets: &EditTargets, overlay: &mut Overlay) {
        if let Some(edge) = self.edge {
            overlay.temp_edge = graph.node(edge.start).map(|n| Line::new(n.position, edge.end));
        }
        overlay.selection_rect = self.rect.map(Into::into);
    }
}
