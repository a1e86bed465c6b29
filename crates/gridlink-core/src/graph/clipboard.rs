//! Copy and paste of whole groups.

use super::{Edge, Graph, GroupId, LabelPosition, Node, NodeGroup, NodeId};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CopiedGroup {
    name: String,
    label_position: LabelPosition,
    nodes: Vec<Node>,
}

/// Detached copy of groups, their nodes and the edges among them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupClipboard {
    groups: Vec<CopiedGroup>,
    edges: Vec<Edge>,
}

impl GroupClipboard {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of copied groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Shift every copied node, so repeated pastes cascade.
    pub fn translate(&mut self, offset: Vec2) {
        for node in self.groups.iter_mut().flat_map(|g| g.nodes.iter_mut()) {
            node.position += offset;
        }
    }
}

impl Graph {
    /// Copy the listed groups. Only edges with both endpoints inside the
    /// copied groups are kept.
    pub fn copy_groups(&self, ids: &[GroupId]) -> GroupClipboard {
        let groups: Vec<CopiedGroup> = ids
            .iter()
            .filter_map(|&id| self.group(id))
            .map(|g| CopiedGroup {
                name: g.name.clone(),
                label_position: g.label_position,
                nodes: g.node_ids.iter().filter_map(|&n| self.node(n)).cloned().collect(),
            })
            .collect();

        let copied: Vec<NodeId> = groups
            .iter()
            .flat_map(|g| g.nodes.iter().map(|n| n.id))
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| copied.contains(&e.source) && copied.contains(&e.target))
            .copied()
            .collect();

        GroupClipboard { groups, edges }
    }

    /// Insert the clipboard contents shifted by `offset`, with fresh node and
    /// group ids. Returns the new group ids in clipboard order.
    pub fn paste_groups(&mut self, clipboard: &GroupClipboard, offset: Vec2) -> Vec<GroupId> {
        let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
        let mut next_id = self.next_node_id();
        let mut pasted = Vec::with_capacity(clipboard.groups.len());

        for copied in &clipboard.groups {
            let mut node_ids = Vec::with_capacity(copied.nodes.len());
            for node in &copied.nodes {
                let mut fresh = node.clone();
                fresh.id = next_id;
                fresh.position += offset;
                remap.insert(node.id, next_id);
                node_ids.push(next_id);
                self.nodes.push(fresh);
                next_id += 1;
            }

            let name = self.resolve_name(&copied.name, None);
            let mut group = NodeGroup::new(name, node_ids, self.next_z_index);
            group.label_position = copied.label_position;
            self.next_z_index += 1;
            pasted.push(group.id);
            self.groups.push(group);
        }

        for edge in &clipboard.edges {
            if let (Some(&a), Some(&b)) = (remap.get(&edge.source), remap.get(&edge.target)) {
                self.edges.push(Edge::new(a, b));
            }
        }

        if !pasted.is_empty() {
            log::debug!("Pasted {} groups", pasted.len());
            self.changed = true;
        }
        pasted
    }
}
