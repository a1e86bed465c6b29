//! Knife tool: delete every edge a freehand stroke crosses.

use super::{EditTargets, SubmodeHandler};
use crate::config::EditorConfig;
use crate::graph::{Edge, Graph};
use crate::input::{Key, KeyEvent};
use crate::modes::{EditorContext, Outcome, Pointer};
use crate::overlay::Overlay;
use kurbo::Point;

/// Cuts every edge crossed by a freehand path.
#[derive(Debug, Default)]
pub struct KnifeTool {
    path: Vec<Point>,
    highlighted: Vec<Edge>,
    cutting: bool,
}

impl KnifeTool {
    pub fn highlighted(&self) -> &[Edge] {
        &self.highlighted
    }

    fn refresh(&mut self, graph: &Graph, targets: &EditTargets) {
        self.highlighted = if targets.is_empty() {
            graph.edges_crossing_path(&self.path, |_| true)
        } else {
            graph.edges_crossing_path(&self.path, |&e| targets.touches_edge(graph, e))
        };
    }
}

impl SubmodeHandler for KnifeTool {
    fn press(&mut self, _ctx: &mut EditorContext<'_>, _targets: &EditTargets, pointer: Pointer) -> Outcome {
        self.path.clear();
        self.highlighted.clear();
        self.path.push(pointer.world);
        self.cutting = true;
        Outcome::Handled
    }

    fn drag(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome {
        if !self.cutting {
            return Outcome::Ignored;
        }
        self.path.push(pointer.world);
        self.refresh(ctx.graph, targets);
        Outcome::Handled
    }

    fn release(&mut self, ctx: &mut EditorContext<'_>, _targets: &EditTargets, _pointer: Pointer) -> Outcome {
        if !self.cutting {
            return Outcome::Ignored;
        }
        let cut = std::mem::take(&mut self.highlighted);
        if !cut.is_empty() {
            let removed = ctx.graph.remove_edges(&cut);
            log::debug!("Knife removed {removed} edges");
        }
        self.reset();
        Outcome::Handled
    }

    fn key(&mut self, _ctx: &mut EditorContext<'_>, _targets: &EditTargets, key: KeyEvent) -> Outcome {
        if key.key == Key::Escape && self.cutting {
            self.reset();
            return Outcome::Handled;
        }
        Outcome::Ignored
    }

    fn reset(&mut self) {
        self.path.clear();
        self.highlighted.clear();
        self.cutting = false;
    }

    fn overlay(&self, _graph: &Graph, _config: &EditorConfig, _targets: &EditTargets, overlay: &mut Overlay) {
        overlay.knife_path = self.path.clone();
        overlay.highlighted_edges = self.highlighted.clone();
    }
}
