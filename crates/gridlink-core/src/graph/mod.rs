//! Graph store: nodes, edges and groups.

mod clipboard;
mod connectivity;
mod group;
mod node;

pub use clipboard::GroupClipboard;
pub use connectivity::Neighbourhood;
pub use group::{GroupId, LabelPosition, NodeGroup, unique_name};
pub use node::{Node, NodeId, NodeShape};

use crate::config::EditorConfig;
use crate::geometry::{bounding_rect, path_crosses_segment, rect_contains_point, rotate_quarter_turn, trimmed_segment};
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Graph errors.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: u32, cols: u32 },
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),
    #[error("Invalid group name: {0:?}")]
    InvalidName(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Directed edge between two nodes.
///
/// Edges carry no identity of their own; duplicates between the same pair
/// are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Returns true if either endpoint is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// Returns true if this edge joins `a` and `b` in either direction.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Parameters for [`Graph::add_node_group`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    pub rows: u32,
    pub cols: u32,
    /// Center of the top-left node.
    pub origin: Point,
    /// Distance between neighbouring node centers.
    pub spacing: f64,
    pub node_size: f64,
    pub shape: NodeShape,
    /// Group name; `None` picks `"Group {n}"`.
    pub name: Option<String>,
}

impl GroupLayout {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            origin: Point::new(100.0, 100.0),
            spacing: 40.0,
            node_size: 30.0,
            shape: NodeShape::Rectangle,
            name: None,
        }
    }

    /// Layout using the configured origin, spacing, node size and shape.
    pub fn from_config(config: &EditorConfig, rows: u32, cols: u32) -> Self {
        Self {
            origin: config.group_origin,
            spacing: config.node_spacing,
            node_size: config.node_size,
            shape: config.node_shape,
            ..Self::new(rows, cols)
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_node_size(mut self, size: f64) -> Self {
        self.node_size = size;
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The node graph being edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    groups: Vec<NodeGroup>,
    next_z_index: i64,
    group_counter: u32,
    node_id_start: NodeId,
    allow_duplicate_names: bool,
    #[serde(skip)]
    changed: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            next_z_index: 0,
            group_counter: 0,
            node_id_start: 0,
            allow_duplicate_names: true,
            changed: false,
        }
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph honouring the configured id start and naming rule.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            node_id_start: config.node_id_start,
            allow_duplicate_names: config.allow_duplicate_names,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&NodeGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn group_mut(&mut self, id: GroupId) -> Option<&mut NodeGroup> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// The group owning `node`, if any.
    pub fn group_for_node(&self, node: NodeId) -> Option<&NodeGroup> {
        self.groups.iter().find(|g| g.contains_node(node))
    }

    /// Member nodes of a group, in member order. Missing ids are skipped.
    pub fn group_nodes(&self, id: GroupId) -> Vec<&Node> {
        let Some(group) = self.group(id) else {
            return Vec::new();
        };
        group.node_ids.iter().filter_map(|&n| self.node(n)).collect()
    }

    /// Returns true if the graph has been mutated since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn next_node_id(&self) -> NodeId {
        self.nodes
            .iter()
            .map(|n| n.id + 1)
            .max()
            .unwrap_or(self.node_id_start)
            .max(self.node_id_start)
    }

    fn resolve_name(&self, requested: &str, skip: Option<GroupId>) -> String {
        if self.allow_duplicate_names {
            return requested.to_string();
        }
        let existing = self
            .groups
            .iter()
            .filter(|g| Some(g.id) != skip)
            .map(|g| g.name.as_str());
        unique_name(requested, existing)
    }

    /// Add a rows×cols block of nodes as a new frontmost group.
    pub fn add_node_group(&mut self, layout: GroupLayout) -> GraphResult<GroupId> {
        if layout.rows == 0 || layout.cols == 0 {
            return Err(GraphError::InvalidDimensions {
                rows: layout.rows,
                cols: layout.cols,
            });
        }

        self.group_counter += 1;
        let requested = layout
            .name
            .clone()
            .unwrap_or_else(|| format!("Group {}", self.group_counter));
        let name = self.resolve_name(&requested, None);

        let mut next_id = self.next_node_id();
        let mut node_ids = Vec::with_capacity((layout.rows * layout.cols) as usize);
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let position = Point::new(
                    layout.origin.x + f64::from(col) * layout.spacing,
                    layout.origin.y + f64::from(row) * layout.spacing,
                );
                self.nodes.push(Node::new(next_id, position, row, col, layout.node_size, layout.shape));
                node_ids.push(next_id);
                next_id += 1;
            }
        }

        let group = NodeGroup::new(name, node_ids, self.next_z_index);
        self.next_z_index += 1;
        let id = group.id;
        log::debug!("Added group {:?} ({}x{})", group.name, layout.rows, layout.cols);
        self.groups.push(group);
        self.changed = true;
        Ok(id)
    }

    /// Insert a node that belongs to no group.
    pub fn add_free_node(&mut self, position: Point, size: f64, shape: NodeShape) -> NodeId {
        let id = self.next_node_id();
        self.nodes.push(Node::new(id, position, 0, 0, size, shape));
        self.changed = true;
        id
    }

    /// Rename a group. When duplicates are disallowed a `" (n)"` suffix is
    /// added as needed. Returns the name actually stored.
    pub fn rename_group(&mut self, id: GroupId, name: &str) -> GraphResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(GraphError::InvalidName(name.to_string()));
        }
        if self.group(id).is_none() {
            return Err(GraphError::GroupNotFound(id));
        }
        let resolved = self.resolve_name(trimmed, Some(id));
        if let Some(group) = self.group_mut(id) {
            group.name = resolved.clone();
        }
        self.changed = true;
        Ok(resolved)
    }

    pub fn set_label_position(&mut self, id: GroupId, position: LabelPosition) -> GraphResult<()> {
        let group = self.group_mut(id).ok_or(GraphError::GroupNotFound(id))?;
        group.label_position = position;
        self.changed = true;
        Ok(())
    }

    /// Returns true if an edge joins `a` and `b` in either direction.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    /// Add an edge from `source` to `target`.
    ///
    /// Self-loops and unknown endpoints are rejected. Duplicates are not.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        if source == target || self.node(source).is_none() || self.node(target).is_none() {
            return false;
        }
        self.edges.push(Edge::new(source, target));
        self.changed = true;
        true
    }

    /// Remove the first edge equal to `edge`.
    pub fn remove_edge(&mut self, edge: Edge) -> bool {
        let Some(index) = self.edges.iter().position(|e| *e == edge) else {
            return false;
        };
        self.edges.remove(index);
        self.changed = true;
        true
    }

    /// Remove each listed edge once. Returns how many were removed.
    pub fn remove_edges(&mut self, edges: &[Edge]) -> usize {
        edges.iter().filter(|&&e| self.remove_edge(e)).count()
    }

    /// Edges with `node` as an endpoint.
    pub fn edges_touching(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.touches(node))
    }

    /// Center-to-center segment of an edge, or `None` if an endpoint is gone.
    pub fn edge_segment(&self, edge: Edge) -> Option<Line> {
        let a = self.node(edge.source)?;
        let b = self.node(edge.target)?;
        Some(Line::new(a.position, b.position))
    }

    /// Display segment of an edge, stopping at each node's outline.
    pub fn edge_endpoints(&self, edge: Edge) -> Option<Line> {
        let a = self.node(edge.source)?;
        let b = self.node(edge.target)?;
        Some(trimmed_segment(a.position, b.position, a.size, b.size))
    }

    /// Every edge whose segment crosses the polyline `path` and passes `filter`.
    /// Edges with a missing endpoint are skipped.
    pub fn edges_crossing_path(&self, path: &[Point], filter: impl Fn(&Edge) -> bool) -> Vec<Edge> {
        if path.len() < 2 {
            return Vec::new();
        }
        self.edges
            .iter()
            .filter(|&e| filter(e))
            .filter(|e| {
                self.edge_segment(**e)
                    .is_some_and(|line| path_crosses_segment(path, line))
            })
            .copied()
            .collect()
    }

    /// Delete a group, its member nodes (unless another group also owns
    /// them) and every edge touching a removed node.
    pub fn delete_group(&mut self, id: GroupId) -> Option<NodeGroup> {
        let index = self.groups.iter().position(|g| g.id == id)?;
        let group = self.groups.remove(index);

        let doomed: Vec<NodeId> = group
            .node_ids
            .iter()
            .copied()
            .filter(|&n| self.group_for_node(n).is_none())
            .collect();

        let before = self.edges.len();
        self.edges
            .retain(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target));
        self.nodes.retain(|n| !doomed.contains(&n.id));

        log::debug!(
            "Deleted group {:?}: {} nodes, {} edges",
            group.name,
            doomed.len(),
            before - self.edges.len()
        );
        self.changed = true;
        Some(group)
    }

    /// Raise a group above all others. No-op if it is already strictly frontmost.
    pub fn bring_group_to_front(&mut self, id: GroupId) -> bool {
        let Some(current) = self.group(id).map(|g| g.z_index) else {
            return false;
        };
        let max_other = self
            .groups
            .iter()
            .filter(|g| g.id != id)
            .map(|g| g.z_index)
            .max();
        let Some(max_other) = max_other else {
            return false;
        };
        if current > max_other {
            return false;
        }
        let z = max_other + 1;
        if let Some(group) = self.group_mut(id) {
            group.z_index = z;
        }
        self.next_z_index = self.next_z_index.max(z + 1);
        self.changed = true;
        true
    }

    /// Groups ordered front to back. Equal z keeps the later group in front.
    pub fn groups_front_to_back(&self) -> Vec<&NodeGroup> {
        let mut groups: Vec<&NodeGroup> = self.groups.iter().rev().collect();
        groups.sort_by(|a, b| b.z_index.cmp(&a.z_index));
        groups
    }

    /// Move a group one place earlier in list order.
    pub fn move_group_up(&mut self, id: GroupId) -> bool {
        match self.groups.iter().position(|g| g.id == id) {
            Some(index) if index > 0 => {
                self.groups.swap(index, index - 1);
                self.changed = true;
                true
            }
            _ => false,
        }
    }

    /// Move a group one place later in list order.
    pub fn move_group_down(&mut self, id: GroupId) -> bool {
        match self.groups.iter().position(|g| g.id == id) {
            Some(index) if index + 1 < self.groups.len() => {
                self.groups.swap(index, index + 1);
                self.changed = true;
                true
            }
            _ => false,
        }
    }

    /// Frontmost node under `point`: grouped nodes by group z-order first,
    /// then nodes that belong to no group.
    pub fn find_node_at_position(&self, point: Point) -> Option<NodeId> {
        for group in self.groups_front_to_back() {
            let hit = group
                .node_ids
                .iter()
                .filter_map(|&id| self.node(id))
                .find(|n| n.contains(point));
            if let Some(node) = hit {
                return Some(node.id);
            }
        }
        self.nodes
            .iter()
            .filter(|n| self.group_for_node(n.id).is_none())
            .find(|n| n.contains(point))
            .map(|n| n.id)
    }

    /// Union of member node bounds.
    pub fn group_bounds(&self, id: GroupId) -> Option<Rect> {
        self.group_nodes(id)
            .into_iter()
            .map(Node::bounds)
            .reduce(|acc, r| acc.union(r))
    }

    /// Frontmost group whose bounds, grown by `margin`, contain `point`.
    pub fn find_group_at_position(&self, point: Point, margin: f64) -> Option<GroupId> {
        self.groups_front_to_back()
            .into_iter()
            .find(|g| {
                self.group_bounds(g.id)
                    .is_some_and(|r| rect_contains_point(r.inflate(margin, margin), point))
            })
            .map(|g| g.id)
    }

    /// Move a node's center.
    pub fn set_node_position(&mut self, id: NodeId, position: Point) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        self.changed = true;
        true
    }

    /// Snap every node center to the grid.
    pub fn snap_all_nodes(&mut self, spacing: f64) {
        for node in &mut self.nodes {
            node.position = crate::snap::snap_to_grid(node.position, spacing);
        }
        self.changed = true;
    }

    fn center_of(&self, ids: &[GroupId]) -> Option<Point> {
        let points = ids
            .iter()
            .flat_map(|&g| self.group_nodes(g))
            .map(|n| n.position);
        bounding_rect(points).map(|r| r.center())
    }

    fn rotate_members(&mut self, ids: &[GroupId], center: Point) {
        let members: Vec<NodeId> = ids
            .iter()
            .filter_map(|&g| self.group(g))
            .flat_map(|g| g.node_ids.iter().copied())
            .collect();
        for node in self.nodes.iter_mut().filter(|n| members.contains(&n.id)) {
            node.position = rotate_quarter_turn(node.position, center);
        }
    }

    /// Rotate each group a quarter turn about its own center.
    pub fn rotate_groups(&mut self, ids: &[GroupId]) {
        for &id in ids {
            if let Some(center) = self.center_of(&[id]) {
                self.rotate_members(&[id], center);
                self.changed = true;
            }
        }
    }

    /// Rotate the groups together a quarter turn about their combined center.
    pub fn rotate_groups_about_common_center(&mut self, ids: &[GroupId]) {
        if let Some(center) = self.center_of(ids) {
            self.rotate_members(ids, center);
            self.changed = true;
        }
    }

    /// Serialize the graph to JSON.
    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a graph from JSON.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
