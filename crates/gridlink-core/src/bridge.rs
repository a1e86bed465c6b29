//! Bipartite "bridge" connections between the boundary nodes of two groups.
//!
//! The same [`plan_bridge`] result feeds both the preview lines and the
//! commit, so what is shown is exactly what gets added.

use crate::graph::{Graph, GroupId, NodeId};
use kurbo::Line;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which boundary of a group provides the candidate nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightPosition {
    /// First node of every row (left column).
    #[default]
    RowFirst,
    /// First node of every column (top row).
    ColFirst,
    /// Last node of every row (right column).
    RowLast,
    /// Last node of every column (bottom row).
    ColLast,
}

impl HighlightPosition {
    /// Cycle order used by the floating menu.
    pub const ALL: [HighlightPosition; 4] = [
        HighlightPosition::RowFirst,
        HighlightPosition::ColFirst,
        HighlightPosition::RowLast,
        HighlightPosition::ColLast,
    ];

    fn index(self) -> usize {
        match self {
            HighlightPosition::RowFirst => 0,
            HighlightPosition::ColFirst => 1,
            HighlightPosition::RowLast => 2,
            HighlightPosition::ColLast => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            HighlightPosition::RowFirst => "Row First",
            HighlightPosition::ColFirst => "Column First",
            HighlightPosition::RowLast => "Row Last",
            HighlightPosition::ColLast => "Column Last",
        }
    }
}

/// Source index to the set of target indices it connects to.
pub type BipartiteMapping = BTreeMap<usize, BTreeSet<usize>>;

/// Connection counts and walk direction for a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeParams {
    pub source_to_target_count: u32,
    pub target_to_source_count: u32,
    /// Walk toward lower target indices first.
    pub flip_direction: bool,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            source_to_target_count: 1,
            target_to_source_count: 1,
            flip_direction: false,
        }
    }
}

impl BridgeParams {
    /// Clamp both counts into `[min, max]`.
    pub fn clamped(self, min: u32, max: u32) -> Self {
        let min = min.max(1);
        let max = max.max(min);
        Self {
            source_to_target_count: self.source_to_target_count.clamp(min, max),
            target_to_source_count: self.target_to_source_count.clamp(min, max),
            ..self
        }
    }
}

/// One end of a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSide {
    pub group: GroupId,
    pub position: HighlightPosition,
}

impl BridgeSide {
    pub fn new(group: GroupId, position: HighlightPosition) -> Self {
        Self { group, position }
    }
}

/// Boundary nodes of a group: exactly one node per row (or per column),
/// taken from the requested end. Rows and columns are visited in ascending
/// order.
pub fn edge_nodes(graph: &Graph, group: GroupId, position: HighlightPosition) -> Vec<NodeId> {
    let nodes = graph.group_nodes(group);
    let mut rows: BTreeMap<u32, Vec<(u32, NodeId)>> = BTreeMap::new();
    let mut cols: BTreeMap<u32, Vec<(u32, NodeId)>> = BTreeMap::new();
    for node in &nodes {
        rows.entry(node.row).or_default().push((node.col, node.id));
        cols.entry(node.col).or_default().push((node.row, node.id));
    }

    let (buckets, take_last) = match position {
        HighlightPosition::RowFirst => (rows, false),
        HighlightPosition::RowLast => (rows, true),
        HighlightPosition::ColFirst => (cols, false),
        HighlightPosition::ColLast => (cols, true),
    };

    buckets
        .into_values()
        .filter_map(|mut bucket| {
            bucket.sort_by_key(|&(order, _)| order);
            let pick = if take_last { bucket.last() } else { bucket.first() };
            pick.map(|&(_, id)| id)
        })
        .collect()
}

/// Deterministic source→target index mapping.
///
/// Every source `i` connects to `i mod |targets|`. With `count > 1` further
/// neighbours are added walking outward from `i` (upward first when `flip`,
/// downward otherwise), alternating sides once `count >= 3`. When `count`
/// reaches `|targets|` every source connects to every target.
pub fn generate_bipartite_mapping<S, T>(
    sources: &[S],
    targets: &[T],
    count: usize,
    flip: bool,
) -> BipartiteMapping {
    let mut mapping = BipartiteMapping::new();
    if sources.is_empty() || targets.is_empty() || count == 0 {
        return mapping;
    }

    let t = targets.len();
    let per_source = count.min(t);

    for i in 0..sources.len() {
        let linked = mapping.entry(i).or_default();
        if per_source >= t {
            linked.extend(0..t);
            continue;
        }

        linked.insert(i % t);
        let neighbour = |offset: usize, lower: bool| {
            let j = if lower { i.checked_sub(offset) } else { Some(i + offset) };
            j.filter(|&j| j < t)
        };

        let mut remaining = per_source - 1;
        let mut offset = 1;
        while remaining > 0 {
            if let Some(j) = neighbour(offset, flip) {
                linked.insert(j);
            }
            if remaining > 1 && per_source >= 3 {
                if let Some(j) = neighbour(offset, !flip) {
                    linked.insert(j);
                }
                remaining -= 1;
            }
            offset += 1;
            remaining -= 1;
        }
    }

    mapping
}

/// The concrete node pairs a bridge would add, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgePlan {
    pub source_nodes: Vec<NodeId>,
    pub target_nodes: Vec<NodeId>,
    /// Directed pairs: source→target edges first, then target→source.
    pub pairs: Vec<(NodeId, NodeId)>,
}

fn mapped_pairs(from: &[NodeId], to: &[NodeId], count: u32, flip: bool, out: &mut Vec<(NodeId, NodeId)>) {
    let mapping = generate_bipartite_mapping(from, to, count as usize, flip);
    for (i, targets) in mapping {
        out.extend(targets.into_iter().map(|j| (from[i], to[j])));
    }
}

/// Work out every edge a bridge between `source` and `target` would add.
///
/// Returns `None` for identical groups or when either side has no
/// boundary nodes.
pub fn plan_bridge(graph: &Graph, source: BridgeSide, target: BridgeSide, params: &BridgeParams) -> Option<BridgePlan> {
    if source.group == target.group {
        return None;
    }
    let source_nodes = edge_nodes(graph, source.group, source.position);
    let target_nodes = edge_nodes(graph, target.group, target.position);
    if source_nodes.is_empty() || target_nodes.is_empty() {
        return None;
    }

    let mut pairs = Vec::new();
    mapped_pairs(&source_nodes, &target_nodes, params.source_to_target_count, params.flip_direction, &mut pairs);
    mapped_pairs(&target_nodes, &source_nodes, params.target_to_source_count, params.flip_direction, &mut pairs);

    Some(BridgePlan {
        source_nodes,
        target_nodes,
        pairs,
    })
}

impl BridgePlan {
    /// Center-to-center lines for display. Pairs with a missing node are skipped.
    pub fn preview_lines(&self, graph: &Graph) -> Vec<Line> {
        self.pairs
            .iter()
            .filter_map(|&(a, b)| Some(Line::new(graph.node(a)?.position, graph.node(b)?.position)))
            .collect()
    }

    /// Add every planned edge. Duplicates of existing edges are added too.
    pub fn commit(&self, graph: &mut Graph) -> usize {
        self.pairs.iter().filter(|&&(a, b)| graph.add_edge(a, b)).count()
    }
}

/// Plan and commit a bridge in one step. Returns false, with a warning, when
/// the groups cannot be bridged.
pub fn create_bridge_connection(graph: &mut Graph, source: BridgeSide, target: BridgeSide, params: &BridgeParams) -> bool {
    let Some(plan) = plan_bridge(graph, source, target, params) else {
        log::warn!("Invalid groups for bridge connection: {} -> {}", source.group, target.group);
        return false;
    };
    let added = plan.commit(graph);
    log::info!("Created bridge connection with {added} edges");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GroupLayout;
    use kurbo::Point;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_one_to_one_mapping() {
        let mapping = generate_bipartite_mapping(&[0; 3], &[0; 3], 1, false);
        assert_eq!(mapping[&0], set(&[0]));
        assert_eq!(mapping[&1], set(&[1]));
        assert_eq!(mapping[&2], set(&[2]));
    }

    #[test]
    fn test_full_bipartite_when_count_reaches_targets() {
        let mapping = generate_bipartite_mapping(&[0; 3], &[0; 3], 3, false);
        for i in 0..3 {
            assert_eq!(mapping[&i], set(&[0, 1, 2]));
        }
        let mapping = generate_bipartite_mapping(&[0; 2], &[0; 3], 7, true);
        assert_eq!(mapping[&1], set(&[0, 1, 2]));
    }

    #[test]
    fn test_two_connections_walk_down_or_up() {
        let down = generate_bipartite_mapping(&[0; 4], &[0; 4], 2, false);
        assert_eq!(down[&0], set(&[0, 1]));
        assert_eq!(down[&3], set(&[3]));

        let up = generate_bipartite_mapping(&[0; 4], &[0; 4], 2, true);
        assert_eq!(up[&0], set(&[0]));
        assert_eq!(up[&3], set(&[3, 2]));
    }

    #[test]
    fn test_three_connections_alternate() {
        let mapping = generate_bipartite_mapping(&[0; 5], &[0; 5], 3, false);
        assert_eq!(mapping[&2], set(&[1, 2, 3]));
        assert_eq!(mapping[&0], set(&[0, 1]));
    }

    #[test]
    fn test_more_sources_than_targets_wraps() {
        let mapping = generate_bipartite_mapping(&[0; 4], &[0; 2], 1, false);
        assert_eq!(mapping[&3], set(&[1]));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(generate_bipartite_mapping::<u8, u8>(&[], &[1], 1, false).is_empty());
        assert!(generate_bipartite_mapping(&[1], &[1], 0, false).is_empty());
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let a = generate_bipartite_mapping(&[0; 7], &[0; 5], 4, true);
        let b = generate_bipartite_mapping(&[0; 7], &[0; 5], 4, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_edge_nodes_per_position() {
        let mut graph = Graph::new();
        let g = graph.add_node_group(GroupLayout::new(2, 3)).unwrap();
        // Row-major ids: row 0 = 0 1 2, row 1 = 3 4 5.
        assert_eq!(edge_nodes(&graph, g, HighlightPosition::RowFirst), vec![0, 3]);
        assert_eq!(edge_nodes(&graph, g, HighlightPosition::RowLast), vec![2, 5]);
        assert_eq!(edge_nodes(&graph, g, HighlightPosition::ColFirst), vec![0, 1, 2]);
        assert_eq!(edge_nodes(&graph, g, HighlightPosition::ColLast), vec![3, 4, 5]);
    }

    #[test]
    fn test_highlight_cycle() {
        let mut pos = HighlightPosition::RowFirst;
        for expected in [HighlightPosition::ColFirst, HighlightPosition::RowLast, HighlightPosition::ColLast] {
            pos = pos.next();
            assert_eq!(pos, expected);
        }
        assert_eq!(pos.next(), HighlightPosition::RowFirst);
        assert_eq!(HighlightPosition::RowFirst.prev(), HighlightPosition::ColLast);
    }

    #[test]
    fn test_params_are_clamped() {
        let params = BridgeParams {
            source_to_target_count: 0,
            target_to_source_count: 40,
            flip_direction: true,
        }
        .clamped(1, 10);
        assert_eq!(params.source_to_target_count, 1);
        assert_eq!(params.target_to_source_count, 10);
        assert!(params.flip_direction);
    }

    #[test]
    fn test_preview_matches_commit() {
        let mut graph = Graph::new();
        let a = graph.add_node_group(GroupLayout::new(3, 2)).unwrap();
        let b = graph
            .add_node_group(GroupLayout::new(3, 2).with_origin(Point::new(400.0, 100.0)))
            .unwrap();
        let params = BridgeParams {
            source_to_target_count: 2,
            target_to_source_count: 1,
            flip_direction: false,
        };
        let source = BridgeSide::new(a, HighlightPosition::RowLast);
        let target = BridgeSide::new(b, HighlightPosition::RowFirst);

        let plan = plan_bridge(&graph, source, target, &params).unwrap();
        let preview = plan.preview_lines(&graph);
        assert_eq!(preview.len(), plan.pairs.len());

        assert!(create_bridge_connection(&mut graph, source, target, &params));
        let added: Vec<(NodeId, NodeId)> = graph.edges().iter().map(|e| (e.source, e.target)).collect();
        assert_eq!(added, plan.pairs);
        // 3 sources with 2 links minus the bottom wrap, plus 3 return links.
        assert_eq!(added.len(), 5 + 3);
    }

    #[test]
    fn test_same_group_is_rejected() {
        let mut graph = Graph::new();
        let a = graph.add_node_group(GroupLayout::new(2, 2)).unwrap();
        let side = BridgeSide::new(a, HighlightPosition::RowFirst);
        assert!(!create_bridge_connection(&mut graph, side, side, &BridgeParams::default()));
        assert!(graph.edges().is_empty());
    }
}
