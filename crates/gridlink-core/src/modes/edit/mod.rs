//! Edit mode: edge tools scoped to a set of target groups.
//!
//! Each [`EditSubmode`] has its own handler object; the controller keeps one
//! of each and forwards input to the active one.

mod bridge;
mod connect;
mod knife;
mod multi;

pub use bridge::BridgeTool;
pub use connect::ConnectTool;
pub use knife::KnifeTool;
pub use multi::{MultiConnectTool, MultiKind};

use super::{EditSubmode, EditorContext, Mode, ModeController, Outcome, Pointer};
use crate::bridge::BridgeParams;
use crate::config::EditorConfig;
use crate::geometry::{rect_contains_point, rect_contains_rect, rects_intersect};
use crate::graph::{Edge, Graph, GroupId, Neighbourhood, NodeId};
use crate::input::{Key, KeyEvent};
use crate::overlay::Overlay;
use kurbo::Rect;

/// Groups open for editing. Nodes and edges outside them are inert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditTargets {
    groups: Vec<GroupId>,
}

impl EditTargets {
    pub fn new(groups: Vec<GroupId>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }

    /// Returns true if a target group owns `node`.
    pub fn contains_node(&self, graph: &Graph, node: NodeId) -> bool {
        self.groups
            .iter()
            .filter_map(|&g| graph.group(g))
            .any(|g| g.contains_node(node))
    }

    /// Returns true if either endpoint is in a target group.
    pub fn touches_edge(&self, graph: &Graph, edge: Edge) -> bool {
        self.contains_node(graph, edge.source) || self.contains_node(graph, edge.target)
    }

    /// Every node of every target group, in group then member order.
    pub fn nodes(&self, graph: &Graph) -> Vec<NodeId> {
        self.groups
            .iter()
            .flat_map(|&g| graph.group_nodes(g))
            .map(|n| n.id)
            .collect()
    }

    fn retain_existing(&mut self, graph: &Graph) {
        self.groups.retain(|&g| graph.group(g).is_some());
    }
}

/// Edges touching the targets matched by a rubber band: both endpoints
/// inside when `contain`, either endpoint inside otherwise.
pub(crate) fn edges_in_rect(graph: &Graph, targets: &EditTargets, rect: Rect, contain: bool) -> Vec<Edge> {
    graph
        .edges()
        .iter()
        .copied()
        .filter(|&e| targets.touches_edge(graph, e))
        .filter(|&e| {
            let (Some(a), Some(b)) = (graph.node(e.source), graph.node(e.target)) else {
                return false;
            };
            let (a_in, b_in) = (rect_contains_point(rect, a.position), rect_contains_point(rect, b.position));
            if contain { a_in && b_in } else { a_in || b_in }
        })
        .collect()
}

/// Target nodes matched by a rubber band: bounds inside when `contain`,
/// bounds touching otherwise.
pub(crate) fn nodes_in_rect(graph: &Graph, targets: &EditTargets, rect: Rect, contain: bool) -> Vec<NodeId> {
    targets
        .nodes(graph)
        .into_iter()
        .filter(|&id| {
            graph.node(id).is_some_and(|n| {
                if contain {
                    rect_contains_rect(rect, n.bounds())
                } else {
                    rects_intersect(rect, n.bounds())
                }
            })
        })
        .collect()
}

/// Target node under the pointer, if any.
pub(crate) fn target_node_at(ctx: &EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Option<NodeId> {
    ctx.graph
        .find_node_at_position(pointer.world)
        .filter(|&n| targets.contains_node(ctx.graph, n))
}

/// Per-submode input handling.
pub(crate) trait SubmodeHandler {
    fn press(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome;
    fn drag(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome;
    fn release(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome;

    fn key(&mut self, _ctx: &mut EditorContext<'_>, _targets: &EditTargets, _key: KeyEvent) -> Outcome {
        Outcome::Ignored
    }

    /// Node an edge is currently being drawn from.
    fn edge_start(&self) -> Option<NodeId> {
        None
    }

    /// Extra nodes highlighted together with the hovered one.
    fn hover_companions(&self) -> &[NodeId] {
        &[]
    }

    /// Drop all transient state.
    fn reset(&mut self);

    /// Drop the in-flight pointer gesture only. Picks survive.
    fn cancel_gesture(&mut self) {
        self.reset();
    }

    fn overlay(&self, graph: &Graph, config: &EditorConfig, targets: &EditTargets, overlay: &mut Overlay);
}

/// Controller for [`Mode::Edit`].
#[derive(Debug)]
pub struct EditController {
    targets: EditTargets,
    submode: EditSubmode,
    connect: ConnectTool,
    knife: KnifeTool,
    all_for_one: MultiConnectTool,
    parallel: MultiConnectTool,
    bridge: BridgeTool,
}

impl Default for EditController {
    fn default() -> Self {
        Self {
            targets: EditTargets::default(),
            submode: EditSubmode::default(),
            connect: ConnectTool::default(),
            knife: KnifeTool::default(),
            all_for_one: MultiConnectTool::new(MultiKind::AllForOne),
            parallel: MultiConnectTool::new(MultiKind::Parallel),
            bridge: BridgeTool::default(),
        }
    }
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    fn split(&mut self) -> (&mut dyn SubmodeHandler, &EditTargets) {
        let handler: &mut dyn SubmodeHandler = match self.submode {
            EditSubmode::Connect => &mut self.connect,
            EditSubmode::Knife => &mut self.knife,
            EditSubmode::AllForOne => &mut self.all_for_one,
            EditSubmode::Parallel => &mut self.parallel,
            EditSubmode::Bridge => &mut self.bridge,
        };
        (handler, &self.targets)
    }

    fn handler(&self) -> &dyn SubmodeHandler {
        match self.submode {
            EditSubmode::Connect => &self.connect,
            EditSubmode::Knife => &self.knife,
            EditSubmode::AllForOne => &self.all_for_one,
            EditSubmode::Parallel => &self.parallel,
            EditSubmode::Bridge => &self.bridge,
        }
    }

    pub fn targets(&self) -> &[GroupId] {
        self.targets.groups()
    }

    /// Start a session on `groups`.
    pub fn set_targets(&mut self, groups: Vec<GroupId>) {
        self.targets = EditTargets::new(groups);
    }

    /// Drop the targets and every tool's state. Bridge parameters survive.
    pub fn end_session(&mut self) {
        let params = self.bridge.params();
        *self = Self::default();
        self.bridge.set_params(params);
    }

    /// Forget targets, picks and bridge groups that no longer exist.
    pub fn retain_existing(&mut self, graph: &Graph) {
        self.targets.retain_existing(graph);
        self.all_for_one.retain_existing(graph);
        self.parallel.retain_existing(graph);
        self.bridge.retain_groups(graph);
    }

    pub fn submode(&self) -> EditSubmode {
        self.submode
    }

    /// Switch tool, resetting the old tool's transient state.
    /// Returns false if `submode` is already active.
    pub fn set_submode(&mut self, submode: EditSubmode) -> bool {
        if submode == self.submode {
            return false;
        }
        self.split().0.reset();
        log::debug!("Edit submode {} -> {}", self.submode.name(), submode.name());
        self.submode = submode;
        true
    }

    pub fn bridge_params(&self) -> BridgeParams {
        self.bridge.params()
    }

    pub fn set_bridge_params(&mut self, params: BridgeParams) {
        self.bridge.set_params(params);
    }

    /// Groups picked by the bridge tool, source first.
    pub fn bridge_groups(&self) -> &[GroupId] {
        self.bridge.groups()
    }

    /// Commit the bridge between the two picked groups.
    pub fn commit_bridge(&mut self, graph: &mut Graph, config: &EditorConfig) -> bool {
        self.bridge.commit(graph, config)
    }

    /// Edges currently crossed by the knife path.
    pub fn highlighted_edges(&self) -> &[Edge] {
        self.knife.highlighted()
    }

    /// Nodes picked in the All-For-One or Parallel tool.
    pub fn multi_selected(&self, kind: MultiKind) -> &[NodeId] {
        match kind {
            MultiKind::AllForOne => self.all_for_one.selected(),
            MultiKind::Parallel => self.parallel.selected(),
        }
    }

    /// Connect grid neighbours inside every target group.
    pub fn connect_targets(&self, graph: &mut Graph, neighbourhood: Neighbourhood) -> usize {
        graph.connect_neighbours(self.targets.groups(), neighbourhood)
    }

    fn update_hover(&self, ctx: &mut EditorContext<'_>, pointer: Pointer) {
        let handler = self.handler();
        let under = ctx.graph.find_node_at_position(pointer.world);
        match handler.edge_start() {
            Some(start) => {
                ctx.hover.set_potential_target(under.filter(|&n| n != start));
            }
            None => {
                let companions = handler.hover_companions();
                let companions = if under.is_some_and(|n| companions.contains(&n)) {
                    companions
                } else {
                    &[]
                };
                ctx.hover.update(ctx.graph, under, companions);
                ctx.hover.set_potential_target(None);
            }
        }
    }

    fn shared_key(&mut self, ctx: &mut EditorContext<'_>, key: KeyEvent) -> Outcome {
        match key.key {
            Key::Escape => {
                self.cancel();
                if ctx.selection.deselect.escape {
                    ctx.selection.clear();
                    return Outcome::SwitchMode(Mode::Normal);
                }
                Outcome::Handled
            }
            _ if key.is_delete() => {
                let edges = ctx.selection.edges().to_vec();
                if edges.is_empty() {
                    return Outcome::Ignored;
                }
                let removed = ctx.graph.remove_edges(&edges);
                ctx.selection.clear_edges();
                log::debug!("Deleted {removed} selected edges");
                Outcome::Handled
            }
            _ if key.modifiers.command() && key.is_char('a') => {
                let edges: Vec<Edge> = ctx
                    .graph
                    .edges()
                    .iter()
                    .copied()
                    .filter(|&e| self.targets.touches_edge(ctx.graph, e))
                    .collect();
                ctx.selection.select_edges(&edges, false);
                Outcome::Handled
            }
            _ if key.is_char('e') && !key.modifiers.command() => Outcome::SwitchMode(Mode::Normal),
            _ => Outcome::Ignored,
        }
    }
}

impl ModeController for EditController {
    fn on_press(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        let (handler, targets) = self.split();
        handler.press(ctx, targets, pointer)
    }

    fn on_move(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        let (handler, targets) = self.split();
        let outcome = handler.drag(ctx, targets, pointer);
        self.update_hover(ctx, pointer);
        outcome
    }

    fn on_release(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        let (handler, targets) = self.split();
        let outcome = handler.release(ctx, targets, pointer);
        ctx.hover.set_potential_target(None);
        outcome
    }

    fn on_key(&mut self, ctx: &mut EditorContext<'_>, key: KeyEvent) -> Outcome {
        let (handler, targets) = self.split();
        match handler.key(ctx, targets, key) {
            Outcome::SwitchSubmode(submode) => {
                self.set_submode(submode);
                Outcome::Handled
            }
            Outcome::Ignored => self.shared_key(ctx, key),
            other => other,
        }
    }

    fn on_context_menu(&mut self, ctx: &mut EditorContext<'_>, _pointer: Pointer) -> Outcome {
        self.split().0.cancel_gesture();
        ctx.hover.set_potential_target(None);
        Outcome::Handled
    }

    fn cancel(&mut self) {
        self.split().0.reset();
    }

    fn overlay(&self, graph: &Graph, config: &EditorConfig, overlay: &mut Overlay) {
        self.handler().overlay(graph, config, &self.targets, overlay);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::EditHarness;
    use super::*;
    use crate::graph::GroupLayout;
    use crate::input::Modifiers;
    use kurbo::Point;

    #[test]
    fn test_set_submode_resets_previous_tool() {
        let (mut h, _) = EditHarness::with_groups(&[GroupLayout::new(1, 2)]);
        h.controller.set_submode(EditSubmode::Knife);
        h.press(80.0, 80.0, Modifiers::NONE);
        h.move_to(90.0, 90.0);
        assert_eq!(h.overlay().knife_path.len(), 2);
        assert!(h.controller.set_submode(EditSubmode::Connect));
        assert!(!h.controller.set_submode(EditSubmode::Connect));
        h.controller.set_submode(EditSubmode::Knife);
        assert!(h.overlay().knife_path.is_empty());
    }

    #[test]
    fn test_right_click_drops_gesture_but_keeps_picks() {
        let (mut h, _) = EditHarness::with_groups(&[GroupLayout::new(1, 3)]);
        h.controller.set_submode(EditSubmode::Knife);
        h.press(80.0, 80.0, Modifiers::NONE);
        h.move_to(90.0, 90.0);
        assert_eq!(h.right_click(300.0, 300.0), Outcome::Handled);
        assert!(h.overlay().knife_path.is_empty());

        h.controller.set_submode(EditSubmode::AllForOne);
        h.click(100.0, 100.0, Modifiers::NONE);
        h.click(140.0, 100.0, Modifiers::SHIFT);
        h.press(100.0, 100.0, Modifiers::NONE);
        h.move_to(180.0, 100.0);
        assert!(h.overlay().temp_edge.is_some());
        h.right_click(300.0, 300.0);
        let overlay = h.overlay();
        assert!(overlay.temp_edge.is_none());
        assert_eq!(overlay.multi_selected, vec![0, 1]);
        assert_eq!(h.hover.potential_target(), None);
    }

    #[test]
    fn test_delete_key_removes_selected_edges() {
        let (mut h, _) = EditHarness::with_groups(&[GroupLayout::new(1, 3)]);
        h.graph.add_edge(0, 1);
        h.graph.add_edge(1, 2);
        h.selection.select_edge(Edge::new(0, 1), false);
        assert_eq!(h.key(KeyEvent::plain(Key::Delete)), Outcome::Handled);
        assert_eq!(h.graph.edges(), &[Edge::new(1, 2)]);
        assert!(h.selection.edges().is_empty());
    }

    #[test]
    fn test_select_all_edges_touching_targets() {
        let (mut h, ids) = EditHarness::with_groups(&[
            GroupLayout::new(1, 2),
            GroupLayout::new(1, 2).with_origin(Point::new(100.0, 300.0)),
        ]);
        h.controller.set_targets(vec![ids[0]]);
        h.graph.add_edge(0, 1);
        h.graph.add_edge(1, 2);
        h.graph.add_edge(2, 3);
        h.key(KeyEvent::new(Key::Char('a'), Modifiers::CTRL));
        assert_eq!(h.selection.edges(), &[Edge::new(0, 1), Edge::new(1, 2)]);
    }

    #[test]
    fn test_escape_leaves_edit_mode() {
        let (mut h, _) = EditHarness::with_groups(&[GroupLayout::new(1, 2)]);
        h.selection.select_edge(Edge::new(0, 1), false);
        assert_eq!(h.key(KeyEvent::plain(Key::Escape)), Outcome::SwitchMode(Mode::Normal));
        assert!(h.selection.is_empty());
    }

    #[test]
    fn test_hover_tracks_node_under_pointer() {
        let (mut h, _) = EditHarness::with_groups(&[GroupLayout::new(1, 3)]);
        h.graph.add_edge(1, 2);
        h.move_to(140.0, 100.0);
        assert_eq!(h.hover.node(), Some(1));
        assert_eq!(h.hover.connected_nodes(), &[2]);
        h.move_to(400.0, 400.0);
        assert_eq!(h.hover.node(), None);
    }

    #[test]
    fn test_connect_targets() {
        let (h, _) = EditHarness::with_groups(&[GroupLayout::new(2, 2)]);
        let mut graph = h.graph.clone();
        assert_eq!(h.controller.connect_targets(&mut graph, Neighbourhood::Eight), 6);
    }
}
