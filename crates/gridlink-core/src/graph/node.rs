//! Grid nodes.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Node identifier. Ids are sequential and never reused while a node lives.
pub type NodeId = u32;

/// Outline used for hit-testing and edge attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    #[default]
    Rectangle,
    Circle,
}

/// A node placed on a group's grid.
///
/// Equality and hashing only look at `id`; position and grid coordinates
/// change as the node is dragged or rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Center in world coordinates.
    pub position: Point,
    pub row: u32,
    pub col: u32,
    /// Edge length for rectangles, diameter for circles.
    pub size: f64,
    pub shape: NodeShape,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Node {
    pub fn new(id: NodeId, position: Point, row: u32, col: u32, size: f64, shape: NodeShape) -> Self {
        Self {
            id,
            position,
            row,
            col,
            size,
            shape,
        }
    }

    fn half(&self) -> f64 {
        self.size / 2.0
    }

    /// Returns true if the point lies inside the node outline.
    pub fn contains(&self, point: Point) -> bool {
        let d = point - self.position;
        let h = self.half();
        match self.shape {
            NodeShape::Rectangle => d.x.abs() <= h && d.y.abs() <= h,
            NodeShape::Circle => d.hypot2() <= h * h,
        }
    }

    /// Axis-aligned bounds of the node.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, Size::new(self.size, self.size))
    }

    /// Point on the outline facing `toward`, used to attach edges.
    pub fn connection_point(&self, toward: Point) -> Point {
        let d = toward - self.position;
        if d.hypot2() == 0.0 {
            return self.position;
        }
        let h = self.half();
        match self.shape {
            NodeShape::Circle => self.position + d * (h / d.hypot()),
            NodeShape::Rectangle => {
                let tx = if d.x == 0.0 { f64::INFINITY } else { h / d.x.abs() };
                let ty = if d.y == 0.0 { f64::INFINITY } else { h / d.y.abs() };
                self.position + d * tx.min(ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(shape: NodeShape) -> Node {
        Node::new(1, Point::new(100.0, 100.0), 0, 0, 30.0, shape)
    }

    #[test]
    fn test_rectangle_contains_corners() {
        let n = node(NodeShape::Rectangle);
        assert!(n.contains(Point::new(115.0, 115.0)));
        assert!(!n.contains(Point::new(115.1, 100.0)));
    }

    #[test]
    fn test_circle_excludes_corners() {
        let n = node(NodeShape::Circle);
        assert!(n.contains(Point::new(115.0, 100.0)));
        assert!(!n.contains(Point::new(114.0, 114.0)));
    }

    #[test]
    fn test_equality_by_id() {
        let a = node(NodeShape::Rectangle);
        let mut b = node(NodeShape::Circle);
        b.position = Point::new(0.0, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_connection_point() {
        let rect = node(NodeShape::Rectangle);
        let p = rect.connection_point(Point::new(200.0, 100.0));
        assert!((p.x - 115.0).abs() < f64::EPSILON);
        assert!((p.y - 100.0).abs() < f64::EPSILON);

        let circle = node(NodeShape::Circle);
        let p = circle.connection_point(Point::new(100.0, 0.0));
        assert!((p.y - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let n = node(NodeShape::Rectangle);
        assert_eq!(n.bounds(), Rect::new(85.0, 85.0, 115.0, 115.0));
    }
}
