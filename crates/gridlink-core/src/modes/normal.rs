//! Normal mode: select, drag and rubber-band groups.

use super::{EditorContext, Mode, ModeController, NodeDrag, Outcome, Pointer, RectSelection};
use crate::config::EditorConfig;
use crate::geometry::{rect_contains_rect, rects_intersect};
use crate::graph::{Graph, GroupClipboard, GroupId, NodeId};
use crate::input::{Key, KeyEvent};
use crate::overlay::{Overlay, SelectionBox};

/// A press on an already selected group. Becomes a drag if the pointer
/// moves far enough, otherwise clears the selection on release.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingDeselect {
    node: NodeId,
    press: Pointer,
}

/// Controller for [`Mode::Normal`].
#[derive(Debug, Default)]
pub struct NormalController {
    drag: Option<NodeDrag>,
    pending: Option<PendingDeselect>,
    rect: Option<RectSelection>,
    clipboard: Option<GroupClipboard>,
}

impl NormalController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while nodes are being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current rubber band, if any.
    pub fn selection_rect(&self) -> Option<RectSelection> {
        self.rect
    }

    fn bring_selected_to_front(ctx: &mut EditorContext<'_>) {
        for &group in ctx.selection.groups() {
            ctx.graph.bring_group_to_front(group);
        }
    }

    fn begin_drag(&mut self, ctx: &EditorContext<'_>, start: Pointer, anchor: NodeId) {
        self.drag = Some(NodeDrag::begin(ctx.graph, start.world, ctx.selection.nodes(), Some(anchor)));
    }

    fn press_on_node(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer, node: NodeId) {
        let group = ctx.graph.group_for_node(node).map(|g| g.id);

        let reclicked = group.is_some_and(|g| ctx.selection.is_group_selected(g));
        if reclicked && !pointer.shift() {
            if ctx.selection.deselect.reclick {
                self.pending = Some(PendingDeselect { node, press: pointer });
            } else {
                self.begin_drag(ctx, pointer, node);
            }
            return;
        }

        match group {
            Some(group) => {
                ctx.selection.select_group(ctx.graph, group, pointer.shift());
                ctx.graph.bring_group_to_front(group);
            }
            None => ctx.selection.select_node(node, pointer.shift()),
        }
        self.begin_drag(ctx, pointer, node);
    }

    /// Groups matched by the rectangle: all member bounds inside when dragged
    /// left to right, any member bounds touching otherwise. Node squares count,
    /// not centres, so a rectangle grazing a node's edge picks its group.
    fn groups_in_rect(graph: &Graph, band: RectSelection) -> Vec<GroupId> {
        let rect = band.rect();
        let contain = band.is_left_to_right();
        graph
            .groups()
            .iter()
            .filter(|group| {
                let nodes = graph.group_nodes(group.id);
                if nodes.is_empty() {
                    return false;
                }
                if contain {
                    nodes.iter().all(|n| rect_contains_rect(rect, n.bounds()))
                } else {
                    nodes.iter().any(|n| rects_intersect(rect, n.bounds()))
                }
            })
            .map(|g| g.id)
            .collect()
    }

    fn finish_rect(ctx: &mut EditorContext<'_>, band: RectSelection, add: bool) {
        let matched = Self::groups_in_rect(ctx.graph, band);
        log::debug!(
            "Rectangle selection ({}) matched {} groups",
            if band.is_left_to_right() { "contain" } else { "intersect" },
            matched.len()
        );
        if !matched.is_empty() {
            ctx.selection.select_groups(ctx.graph, &matched, add);
        }
    }

    fn delete_selected(ctx: &mut EditorContext<'_>) -> bool {
        let groups = ctx.selection.groups().to_vec();
        if groups.is_empty() {
            return false;
        }
        for group in groups {
            ctx.graph.delete_group(group);
        }
        ctx.selection.clear();
        ctx.selection.prune(ctx.graph);
        ctx.hover.clear();
        true
    }

    fn paste(&mut self, ctx: &mut EditorContext<'_>) -> bool {
        let Some(clipboard) = self.clipboard.as_mut().filter(|c| !c.is_empty()) else {
            return false;
        };
        let pasted = ctx.graph.paste_groups(clipboard, ctx.config.paste_offset);
        clipboard.translate(ctx.config.paste_offset);
        ctx.selection.select_groups(ctx.graph, &pasted, false);
        true
    }
}

impl ModeController for NormalController {
    fn on_press(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        self.cancel();

        if let Some(node) = ctx.graph.find_node_at_position(pointer.world) {
            self.press_on_node(ctx, pointer, node);
            return Outcome::Handled;
        }

        if ctx.selection.deselect.background && !pointer.shift() {
            ctx.selection.clear();
        }
        self.rect = Some(RectSelection::new(pointer.world));
        Outcome::Handled
    }

    fn on_move(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        if let Some(pending) = self.pending {
            if !ctx.exceeds_drag_threshold(pending.press.canvas, pointer.canvas) {
                return Outcome::Handled;
            }
            self.pending = None;
            Self::bring_selected_to_front(ctx);
            self.begin_drag(ctx, pending.press, pending.node);
        }

        if let Some(drag) = &self.drag {
            let snap = ctx.snap_spacing();
            drag.update(ctx.graph, pointer.world, snap);
            return Outcome::Handled;
        }

        if let Some(rect) = &mut self.rect {
            rect.current = pointer.world;
            return Outcome::Handled;
        }

        Outcome::Ignored
    }

    fn on_release(&mut self, ctx: &mut EditorContext<'_>, pointer: Pointer) -> Outcome {
        if self.pending.take().is_some() {
            ctx.selection.clear();
            return Outcome::Handled;
        }

        if self.drag.take().is_some() {
            return Outcome::Handled;
        }

        if let Some(mut band) = self.rect.take() {
            band.current = pointer.world;
            Self::finish_rect(ctx, band, pointer.shift());
            return Outcome::Handled;
        }

        Outcome::Ignored
    }

    fn on_key(&mut self, ctx: &mut EditorContext<'_>, key: KeyEvent) -> Outcome {
        let command = key.modifiers.command();
        match key.key {
            Key::Escape => {
                self.cancel();
                if ctx.selection.deselect.escape {
                    ctx.selection.clear();
                }
                Outcome::Handled
            }
            _ if key.is_delete() => Outcome::from_bool(Self::delete_selected(ctx)),
            _ if command && key.is_char('a') => {
                let all: Vec<GroupId> = ctx.graph.groups().iter().map(|g| g.id).collect();
                ctx.selection.select_groups(ctx.graph, &all, false);
                Outcome::Handled
            }
            _ if command && key.is_char('c') => {
                let groups = ctx.selection.groups();
                if groups.is_empty() {
                    return Outcome::Ignored;
                }
                self.clipboard = Some(ctx.graph.copy_groups(groups));
                Outcome::Handled
            }
            _ if command && key.is_char('v') => Outcome::from_bool(self.paste(ctx)),
            _ if key.is_char('e') => {
                if ctx.selection.groups().is_empty() {
                    Outcome::Ignored
                } else {
                    Outcome::SwitchMode(Mode::Edit)
                }
            }
            _ if key.is_char('r') => {
                let groups = ctx.selection.groups().to_vec();
                if groups.is_empty() {
                    return Outcome::Ignored;
                }
                if key.modifiers.shift {
                    ctx.graph.rotate_groups_about_common_center(&groups);
                } else {
                    ctx.graph.rotate_groups(&groups);
                }
                Outcome::Handled
            }
            _ if key.is_char('g') => {
                let visible = ctx.view.toggle_grid();
                log::debug!("Grid visible: {visible}");
                Outcome::Handled
            }
            _ => Outcome::Ignored,
        }
    }

    fn cancel(&mut self) {
        self.drag = None;
        self.pending = None;
        self.rect = None;
    }

    fn overlay(&self, _graph: &Graph, _config: &EditorConfig, overlay: &mut Overlay) {
        overlay.selection_rect = self.rect.map(SelectionBox::from);
    }
}
