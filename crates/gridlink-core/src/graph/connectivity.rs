//! Grid-neighbour connection helpers.

use super::{Graph, GroupId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which grid neighbours count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Neighbourhood {
    /// Right and down neighbours.
    #[default]
    Four,
    /// Orthogonal plus both diagonals.
    Eight,
}

impl Neighbourhood {
    /// Forward (row, col) offsets. Walking only forward visits every
    /// neighbouring pair once.
    fn offsets(self) -> &'static [(i64, i64)] {
        match self {
            Neighbourhood::Four => &[(0, 1), (1, 0)],
            Neighbourhood::Eight => &[(0, 1), (1, 0), (1, 1), (1, -1)],
        }
    }
}

impl Graph {
    /// Connect grid neighbours inside each listed group.
    ///
    /// Pairs that already share an edge (either direction) are skipped.
    /// Returns the number of edges added.
    pub fn connect_neighbours(&mut self, groups: &[GroupId], neighbourhood: Neighbourhood) -> usize {
        let mut pending: Vec<(NodeId, NodeId)> = Vec::new();

        for &group_id in groups {
            let cells: HashMap<(i64, i64), NodeId> = self
                .group_nodes(group_id)
                .into_iter()
                .map(|n| ((i64::from(n.row), i64::from(n.col)), n.id))
                .collect();

            let mut keys: Vec<&(i64, i64)> = cells.keys().collect();
            keys.sort();
            for &(row, col) in keys {
                let from = cells[&(row, col)];
                for (dr, dc) in neighbourhood.offsets() {
                    if let Some(&to) = cells.get(&(row + dr, col + dc)) {
                        pending.push((from, to));
                    }
                }
            }
        }

        let mut added = 0;
        for (from, to) in pending {
            if !self.has_edge(from, to) && self.add_edge(from, to) {
                added += 1;
            }
        }
        log::debug!("Connected {added} neighbour pairs ({neighbourhood:?})");
        added
    }

    /// Connect right and down neighbours.
    pub fn connect_4_directions(&mut self, groups: &[GroupId]) -> usize {
        self.connect_neighbours(groups, Neighbourhood::Four)
    }

    /// Connect orthogonal and diagonal neighbours.
    pub fn connect_8_directions(&mut self, groups: &[GroupId]) -> usize {
        self.connect_neighbours(groups, Neighbourhood::Eight)
    }
}
