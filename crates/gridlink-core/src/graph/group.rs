//! Node groups.

use super::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for groups.
pub type GroupId = Uuid;

/// Where a group's name label is drawn relative to its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

/// A named rows×cols block of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub id: GroupId,
    pub name: String,
    /// Member node ids in row-major creation order.
    pub node_ids: Vec<NodeId>,
    /// Draw and hit-test priority; higher is in front.
    pub z_index: i64,
    pub label_position: LabelPosition,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>, node_ids: Vec<NodeId>, z_index: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            node_ids,
            z_index,
            label_position: LabelPosition::default(),
        }
    }

    /// Returns true if the node belongs to this group.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node_ids.contains(&node)
    }
}

/// Split `"Name (3)"` into `("Name", Some(3))`.
fn split_suffix(name: &str) -> (&str, Option<u32>) {
    let Some(open) = name.rfind('(') else {
        return (name, None);
    };
    let Some(inner) = name[open + 1..].strip_suffix(')') else {
        return (name, None);
    };
    match inner.parse::<u32>() {
        Ok(n) => (name[..open].trim_end(), Some(n)),
        Err(_) => (name, None),
    }
}

/// Produce a name not present in `existing`.
///
/// The base name is returned unchanged when free, otherwise the smallest
/// unused `" (n)"` suffix is appended.
pub fn unique_name<'a>(base: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let (clean, _) = split_suffix(base);
    let mut taken_base = false;
    let mut used = Vec::new();
    for name in existing {
        let (other, suffix) = split_suffix(name);
        if other != clean {
            continue;
        }
        match suffix {
            Some(n) => used.push(n),
            None => taken_base = true,
        }
    }
    if !taken_base {
        return clean.to_string();
    }
    let next = (1..).find(|n| !used.contains(n)).unwrap_or(1);
    format!("{clean} ({next})")
}
