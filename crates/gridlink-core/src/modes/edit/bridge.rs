//! Bridge tool: pick two groups and wire their facing edges together.

use super::{EditTargets, SubmodeHandler};
use crate::bridge::{BridgeParams, BridgeSide, HighlightPosition, create_bridge_connection, edge_nodes, plan_bridge};
use crate::config::EditorConfig;
use crate::geometry::rect_contains_point;
use crate::graph::{Graph, GroupId};
use crate::input::{Key, KeyEvent};
use crate::modes::{EditSubmode, EditorContext, Outcome, Pointer};
use crate::overlay::{FloatingMenu, Overlay};
use kurbo::{Point, Rect};
use std::collections::HashMap;

const MENU_TITLES: [&str; 2] = ["Source Nodes", "Target Nodes"];

/// Picks two target groups and connects their boundary nodes.
#[derive(Debug, Default)]
pub struct BridgeTool {
    /// Source first. Never more than two.
    groups: Vec<GroupId>,
    positions: HashMap<GroupId, HighlightPosition>,
    params: BridgeParams,
}

impl BridgeTool {
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn params(&self) -> BridgeParams {
        self.params
    }

    pub fn set_params(&mut self, params: BridgeParams) {
        self.params = params;
    }

    pub fn position(&self, group: GroupId) -> HighlightPosition {
        self.positions.get(&group).copied().unwrap_or_default()
    }

    pub(super) fn retain_groups(&mut self, graph: &Graph) {
        self.groups.retain(|&g| graph.group(g).is_some());
        self.positions.retain(|&g, _| graph.group(g).is_some());
    }

    fn sides(&self) -> Option<(BridgeSide, BridgeSide)> {
        match self.groups.as_slice() {
            &[source, target] => Some((
                BridgeSide::new(source, self.position(source)),
                BridgeSide::new(target, self.position(target)),
            )),
            _ => None,
        }
    }

    /// Add the bridge edges between the two picked groups. Returns false if
    /// fewer than two groups are picked or they cannot be bridged.
    pub fn commit(&mut self, graph: &mut Graph, config: &EditorConfig) -> bool {
        let Some((source, target)) = self.sides() else {
            return false;
        };
        let params = self
            .params
            .clamped(config.min_bridge_connections, config.max_bridge_connections);
        create_bridge_connection(graph, source, target, &params)
    }

    /// One menu per picked group, centred above the group's bounds.
    pub fn menus(&self, graph: &Graph, config: &EditorConfig) -> Vec<FloatingMenu> {
        self.groups
            .iter()
            .zip(MENU_TITLES)
            .filter_map(|(&group, title)| {
                let bounds = graph.group_bounds(group)?;
                let size = config.menu_size;
                let origin = Point::new(
                    bounds.center().x - size.width / 2.0,
                    bounds.min_y() - size.height - config.menu_gap,
                );
                Some(FloatingMenu {
                    group,
                    title,
                    position: self.position(group),
                    rect: Rect::from_origin_size(origin, size),
                })
            })
            .collect()
    }

    fn group_at(ctx: &EditorContext<'_>, targets: &EditTargets, point: Point) -> Option<GroupId> {
        let margin = ctx.world_distance(ctx.config.group_border_margin);
        ctx.graph
            .groups_front_to_back()
            .into_iter()
            .filter(|g| targets.contains_group(g.id))
            .find(|g| {
                ctx.graph
                    .group_bounds(g.id)
                    .is_some_and(|r| rect_contains_point(r.inflate(margin, margin), point))
            })
            .map(|g| g.id)
    }

    fn toggle_group(&mut self, group: GroupId) {
        if let Some(index) = self.groups.iter().position(|&g| g == group) {
            self.groups.remove(index);
            return;
        }
        if self.groups.len() >= 2 {
            self.groups.remove(0);
        }
        self.groups.push(group);
    }
}

impl SubmodeHandler for BridgeTool {
    fn press(&mut self, ctx: &mut EditorContext<'_>, targets: &EditTargets, pointer: Pointer) -> Outcome {
        for menu in self.menus(ctx.graph, ctx.config) {
            if let Some(position) = menu.click(pointer.world) {
                self.positions.insert(menu.group, position);
                return Outcome::Handled;
            }
        }

        let Some(group) = Self::group_at(ctx, targets, pointer.world) else {
            return Outcome::Ignored;
        };
        self.toggle_group(group);
        Outcome::Handled
    }

    fn drag(&mut self, _ctx: &mut EditorContext<'_>, _targets: &EditTargets, _pointer: Pointer) -> Outcome {
        Outcome::Ignored
    }

    fn release(&mut self, _ctx: &mut EditorContext<'_>, _targets: &EditTargets, _pointer: Pointer) -> Outcome {
        Outcome::Ignored
    }

    fn key(&mut self, ctx: &mut EditorContext<'_>, _targets: &EditTargets, key: KeyEvent) -> Outcome {
        match key.key {
            Key::Escape if self.groups.is_empty() => Outcome::SwitchSubmode(EditSubmode::Connect),
            Key::Escape => {
                self.groups.clear();
                Outcome::Handled
            }
            Key::Enter if self.groups.len() == 2 => {
                if self.commit(ctx.graph, ctx.config) {
                    Outcome::SwitchSubmode(EditSubmode::Connect)
                } else {
                    Outcome::Handled
                }
            }
            _ => Outcome::Ignored,
        }
    }

    fn reset(&mut self) {
        self.groups.clear();
        self.positions.clear();
    }

    // Picks are not a gesture; a right-click leaves them alone.
    fn cancel_gesture(&mut self) {}

    fn overlay(&self, graph: &Graph, config: &EditorConfig, _targets: &EditTargets, overlay: &mut Overlay) {
        overlay.bridge_groups = self.groups.clone();
        overlay.bridge_edge_nodes = self
            .groups
            .iter()
            .flat_map(|&g| edge_nodes(graph, g, self.position(g)))
            .collect();
        overlay.floating_menus = self.menus(graph, config);
        if let Some((source, target)) = self.sides() {
            let params = self
                .params
                .clamped(config.min_bridge_connections, config.max_bridge_connections);
            overlay.bridge_preview = plan_bridge(graph, source, target, &params)
                .map(|plan| plan.preview_lines(graph))
                .unwrap_or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::EditHarness;
    use crate::bridge::{BridgeParams, HighlightPosition};
    use crate::graph::{Edge, GroupId, GroupLayout};
    use crate::input::{Key, KeyEvent, Modifiers};
    use crate::modes::{EditSubmode, Outcome};
    use kurbo::Point;

    // Three 3x2 groups side by side. Group bounds in x: 85..155,
    // 285..355 and 485..555; y: 85..195.
    fn harness() -> (EditHarness, Vec<GroupId>) {
        let layouts: Vec<GroupLayout> = [100.0, 300.0, 500.0]
            .into_iter()
            .map(|x| GroupLayout::new(3, 2).with_origin(Point::new(x, 100.0)))
            .collect();
        let (mut h, ids) = EditHarness::with_groups(&layouts);
        h.controller.set_submode(EditSubmode::Bridge);
        (h, ids)
    }

    #[test]
    fn test_third_group_evicts_oldest() {
        let (mut h, ids) = harness();
        h.click(120.0, 150.0, Modifiers::NONE);
        h.click(320.0, 150.0, Modifiers::NONE);
        assert_eq!(h.controller.bridge_groups(), &[ids[0], ids[1]]);
        h.click(520.0, 150.0, Modifiers::NONE);
        assert_eq!(h.controller.bridge_groups(), &[ids[1], ids[2]]);
        h.click(320.0, 150.0, Modifiers::NONE);
        assert_eq!(h.controller.bridge_groups(), &[ids[2]]);
    }

    #[test]
    fn test_border_margin_and_non_targets() {
        let (mut h, ids) = harness();
        h.controller.set_targets(vec![ids[0], ids[1]]);
        h.click(158.0, 150.0, Modifiers::NONE);
        assert_eq!(h.controller.bridge_groups(), &[ids[0]]);
        h.click(520.0, 150.0, Modifiers::NONE);
        assert_eq!(h.controller.bridge_groups(), &[ids[0]]);
    }

    #[test]
    fn test_preview_matches_commit() {
        let (mut h, _) = harness();
        h.click(120.0, 150.0, Modifiers::NONE);
        h.click(320.0, 150.0, Modifiers::NONE);
        let overlay = h.overlay();
        // Row-first boundary nodes: 3 per group, one-to-one both ways.
        assert_eq!(overlay.bridge_edge_nodes, vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(overlay.bridge_preview.len(), 6);
        assert_eq!(overlay.floating_menus.len(), 2);
        assert_eq!(overlay.floating_menus[1].title, "Target Nodes");

        assert_eq!(h.key(KeyEvent::plain(Key::Enter)), Outcome::Handled);
        assert_eq!(h.controller.submode(), EditSubmode::Connect);
        assert_eq!(
            h.graph.edges(),
            &[
                Edge::new(0, 6),
                Edge::new(2, 8),
                Edge::new(4, 10),
                Edge::new(6, 0),
                Edge::new(8, 2),
                Edge::new(10, 4),
            ]
        );
    }

    #[test]
    fn test_params_are_clamped_on_commit() {
        let (mut h, _) = harness();
        h.controller.set_bridge_params(BridgeParams {
            source_to_target_count: 99,
            target_to_source_count: 0,
            flip_direction: false,
        });
        h.config.max_bridge_connections = 2;
        h.click(120.0, 150.0, Modifiers::NONE);
        h.click(320.0, 150.0, Modifiers::NONE);
        h.key(KeyEvent::plain(Key::Enter));
        // Two targets per source except the last, which has no node below
        // it; then one source per target.
        assert_eq!(h.graph.edges().len(), 5 + 3);
    }

    #[test]
    fn test_menu_click_cycles_position_without_toggling() {
        let (mut h, ids) = harness();
        h.click(120.0, 150.0, Modifiers::NONE);
        let menu = h.overlay().floating_menus[0].rect;
        // Menu sits above the group: x centred on 120, bottom 10 above y = 85.
        assert_eq!(menu.min_y(), 85.0 - 60.0 - 10.0);
        h.click(menu.max_x() - 5.0, menu.center().y, Modifiers::NONE);
        assert_eq!(h.controller.bridge_groups(), &[ids[0]]);
        assert_eq!(h.overlay().floating_menus[0].position, HighlightPosition::ColFirst);
        assert_eq!(h.overlay().bridge_edge_nodes, vec![0, 1]);
    }

    #[test]
    fn test_escape_clears_then_leaves() {
        let (mut h, _) = harness();
        h.click(120.0, 150.0, Modifiers::NONE);
        assert_eq!(h.key(KeyEvent::plain(Key::Escape)), Outcome::Handled);
        assert!(h.controller.bridge_groups().is_empty());
        assert_eq!(h.controller.submode(), EditSubmode::Bridge);
        h.key(KeyEvent::plain(Key::Escape));
        assert_eq!(h.controller.submode(), EditSubmode::Connect);
    }

    #[test]
    fn test_right_click_keeps_picks_and_positions() {
        let (mut h, ids) = harness();
        h.click(120.0, 150.0, Modifiers::NONE);
        h.click(320.0, 150.0, Modifiers::NONE);
        let menus = h.overlay().floating_menus;
        assert_eq!(h.right_click(700.0, 400.0), Outcome::Handled);
        assert_eq!(h.controller.bridge_groups(), &[ids[0], ids[1]]);
        assert_eq!(h.overlay().floating_menus, menus);
    }
}
