//! Mode controllers and the pieces they share.
//!
//! The dispatcher owns one controller per [`Mode`] and feeds it pointer and
//! key input through the [`ModeController`] trait.

pub mod edit;
pub mod normal;

pub use edit::EditController;
pub use normal::NormalController;

use crate::config::EditorConfig;
use crate::geometry::manhattan_length;
use crate::graph::{Graph, NodeId};
use crate::hover::HoverState;
use crate::input::{KeyEvent, Modifiers};
use crate::overlay::Overlay;
use crate::selection::SelectionModel;
use crate::snap::snap_delta;
use crate::view::ViewState;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Top-level interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Select and move groups.
    #[default]
    Normal,
    /// Edit edges inside the target groups.
    Edit,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Edit => "edit",
        }
    }

    /// Parse a mode name. Unknown names give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Mode::Normal),
            "edit" => Some(Mode::Edit),
            _ => None,
        }
    }
}

/// Edit-mode tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditSubmode {
    /// Draw single edges, select and delete edges.
    #[default]
    Connect,
    /// Cut every edge a drawn path crosses.
    Knife,
    /// Connect many selected nodes to one target.
    AllForOne,
    /// Replicate one drag across many selected nodes.
    Parallel,
    /// Bipartite connections between two groups.
    Bridge,
}

impl EditSubmode {
    pub fn name(self) -> &'static str {
        match self {
            EditSubmode::Connect => "connect",
            EditSubmode::Knife => "knife",
            EditSubmode::AllForOne => "all_for_one",
            EditSubmode::Parallel => "parallel",
            EditSubmode::Bridge => "bridge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "connect" => Some(EditSubmode::Connect),
            "knife" => Some(EditSubmode::Knife),
            "all_for_one" => Some(EditSubmode::AllForOne),
            "parallel" => Some(EditSubmode::Parallel),
            "bridge" => Some(EditSubmode::Bridge),
            _ => None,
        }
    }
}

/// Pointer position in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub world: Point,
    pub canvas: Point,
    pub modifiers: Modifiers,
}

impl Pointer {
    pub fn new(world: Point, canvas: Point, modifiers: Modifiers) -> Self {
        Self {
            world,
            canvas,
            modifiers,
        }
    }

    pub fn shift(&self) -> bool {
        self.modifiers.shift
    }
}

/// What a controller did with an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened; the caller may try a fallback.
    Ignored,
    Handled,
    /// Handled, and the controller asks the dispatcher to change mode.
    SwitchMode(Mode),
    /// Handled, and the edit controller should change tool.
    SwitchSubmode(EditSubmode),
}

impl Outcome {
    pub fn is_handled(self) -> bool {
        self != Outcome::Ignored
    }

    /// `Handled` if `handled`, else `Ignored`.
    pub fn from_bool(handled: bool) -> Self {
        if handled { Outcome::Handled } else { Outcome::Ignored }
    }
}

/// Mutable editor state lent to a controller for one input.
pub struct EditorContext<'a> {
    pub graph: &'a mut Graph,
    pub selection: &'a mut SelectionModel,
    pub hover: &'a mut HoverState,
    pub view: &'a mut ViewState,
    pub config: &'a EditorConfig,
}

impl EditorContext<'_> {
    /// A configured pixel distance in world units at the current zoom.
    pub fn world_distance(&self, pixels: f64) -> f64 {
        self.view.pixels_to_world(pixels)
    }

    /// Grid spacing to snap to, if snapping is active.
    pub fn snap_spacing(&self) -> Option<f64> {
        self.view.snapping_active().then_some(self.config.grid_spacing)
    }

    /// Returns true once the pointer has travelled past the drag threshold
    /// (Manhattan distance in canvas pixels).
    pub fn exceeds_drag_threshold(&self, from_canvas: Point, to_canvas: Point) -> bool {
        manhattan_length(to_canvas - from_canvas) > self.config.drag_threshold
    }
}

/// Common interface of the per-mode controllers.
pub trait ModeController {
    fn on_press(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome;
    fn on_move(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome;
    fn on_release(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome;
    fn on_key(&mut self, ctx: &mut EditorContext<'_>, key: KeyEvent) -> Outcome;

    /// Right-button press. Controllers drop their in-flight gesture so the
    /// host can show its menu.
    fn on_context_menu(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        let _ = (ctx, pointer);
        self.cancel();
        Outcome::Handled
    }

    /// Abandon any in-progress gesture.
    fn cancel(&mut self);

    /// Contribute transient display state.
    fn overlay(&self, graph: &Graph, config: &EditorConfig, overlay: &mut Overlay);
}

/// Rubber-band rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectSelection {
    pub start: Point,
    pub current: Point,
}

impl RectSelection {
    pub fn new(start: Point) -> Self {
        Self { start, current: start }
    }

    /// Normalized rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// Dragged left to right: select by containment. Otherwise by intersection.
    pub fn is_left_to_right(&self) -> bool {
        self.start.x < self.current.x
    }
}

/// Moves a set of nodes from their positions at drag start.
///
/// Positions are always recomputed from the recorded originals, so a drag
/// never accumulates rounding from intermediate snaps.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDrag {
    start: Point,
    reference: Option<NodeId>,
    originals: Vec<(NodeId, Point)>,
}

impl NodeDrag {
    /// Record the nodes to move. The snap reference is `anchor` if it is one
    /// of them, else the first of them.
    pub fn begin(graph: &Graph, start: Point, nodes: &[NodeId], anchor: Option<NodeId>) -> Self {
        let originals: Vec<(NodeId, Point)> = nodes
            .iter()
            .filter_map(|&id| graph.node(id).map(|n| (id, n.position)))
            .collect();
        let reference = anchor
            .filter(|a| originals.iter().any(|(id, _)| id == a))
            .or_else(|| originals.first().map(|(id, _)| *id));
        Self {
            start,
            reference,
            originals,
        }
    }

    /// Place every node at its original position plus the pointer delta.
    /// With `snap`, the reference node lands on the grid and the others keep
    /// their offsets to it.
    pub fn update(&self, graph: &mut Graph, current: Point, snap: Option<f64>) {
        let mut delta = current - self.start;
        if let Some(spacing) = snap {
            let reference = self
                .reference
                .and_then(|r| self.originals.iter().find(|(id, _)| *id == r));
            if let Some(&(_, origin)) = reference {
                delta = snap_delta(origin, delta, spacing);
            }
        }
        for &(id, origin) in &self.originals {
            graph.set_node_position(id, origin + delta);
        }
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.originals.iter().map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GroupLayout;
    use kurbo::Vec2;

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::from_name("edit"), Some(Mode::Edit));
        assert_eq!(Mode::from_name("sculpt"), None);
        for sub in [
            EditSubmode::Connect,
            EditSubmode::Knife,
            EditSubmode::AllForOne,
            EditSubmode::Parallel,
            EditSubmode::Bridge,
        ] {
            assert_eq!(EditSubmode::from_name(sub.name()), Some(sub));
        }
    }

    #[test]
    fn test_rect_selection_direction() {
        let mut rect = RectSelection::new(Point::new(50.0, 50.0));
        rect.current = Point::new(10.0, 80.0);
        assert!(!rect.is_left_to_right());
        assert_eq!(rect.rect(), Rect::new(10.0, 50.0, 50.0, 80.0));
        rect.current = Point::new(50.0, 80.0);
        assert!(!rect.is_left_to_right());
    }

    #[test]
    fn test_node_drag_snaps_reference_and_keeps_layout() {
        let mut graph = Graph::new();
        graph
            .add_node_group(GroupLayout::new(1, 2).with_origin(Point::new(103.0, 100.0)))
            .unwrap();
        let drag = NodeDrag::begin(&graph, Point::ZERO, &[0, 1], Some(1));
        drag.update(&mut graph, Point::new(10.0, 4.0), Some(25.0));
        // Reference node 1 starts at (143, 100) and lands on (150, 100).
        assert_eq!(graph.node(1).unwrap().position, Point::new(150.0, 100.0));
        assert_eq!(graph.node(0).unwrap().position, Point::new(110.0, 100.0));

        drag.update(&mut graph, Point::new(1.0, 1.0), None);
        assert_eq!(graph.node(0).unwrap().position, Point::new(103.0, 100.0) + Vec2::new(1.0, 1.0));
    }
}
