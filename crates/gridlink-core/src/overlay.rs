//! Transient display state produced by the controllers.
//!
//! Nothing here feeds back into editing; hosts read it to paint rubber
//! bands, temporary edges, knife paths and bridge previews.

use crate::bridge::HighlightPosition;
use crate::graph::{Edge, GroupId, NodeId};
use crate::modes::RectSelection;
use kurbo::{Line, Point, Rect};
use serde::Serialize;

/// Rubber-band rectangle and the semantics its direction selects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionBox {
    pub start: Point,
    pub end: Point,
    pub rect: Rect,
    /// Left-to-right selects by containment, right-to-left by intersection.
    pub left_to_right: bool,
}

impl From<RectSelection> for SelectionBox {
    fn from(band: RectSelection) -> Self {
        Self {
            start: band.start,
            end: band.current,
            rect: band.rect(),
            left_to_right: band.is_left_to_right(),
        }
    }
}

/// Floating menu shown above a bridge group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingMenu {
    pub group: GroupId,
    pub title: &'static str,
    pub position: HighlightPosition,
    /// Menu rectangle in world coordinates.
    pub rect: Rect,
}

impl FloatingMenu {
    /// Returns true if the point lies on the menu.
    pub fn contains(&self, point: Point) -> bool {
        crate::geometry::rect_contains_point(self.rect, point)
    }

    /// Highlight position after a click: left half steps back, right half
    /// steps forward. `None` if the click missed the menu.
    pub fn click(&self, point: Point) -> Option<HighlightPosition> {
        if !self.contains(point) {
            return None;
        }
        if point.x < self.rect.center().x {
            Some(self.position.prev())
        } else {
            Some(self.position.next())
        }
    }
}

/// Everything the host may draw on top of the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overlay {
    /// `"normal"` or `"edit/<submode>"`.
    pub mode: String,
    pub selection_rect: Option<SelectionBox>,
    /// Edge being drawn, from the start node center to the pointer.
    pub temp_edge: Option<Line>,
    /// Parallel mode: one provisional edge per selected source.
    pub parallel_edges: Vec<Line>,
    /// Nodes picked in All-For-One or Parallel.
    pub multi_selected: Vec<NodeId>,
    pub knife_path: Vec<Point>,
    pub highlighted_edges: Vec<Edge>,
    /// Groups picked in Bridge, source first.
    pub bridge_groups: Vec<GroupId>,
    /// Boundary nodes that a bridge would use.
    pub bridge_edge_nodes: Vec<NodeId>,
    pub bridge_preview: Vec<Line>,
    pub floating_menus: Vec<FloatingMenu>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_menu_click_halves() {
        let menu = FloatingMenu {
            group: Uuid::new_v4(),
            title: "Source Nodes",
            position: HighlightPosition::RowFirst,
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
        };
        assert_eq!(menu.click(Point::new(10.0, 20.0)), Some(HighlightPosition::ColLast));
        assert_eq!(menu.click(Point::new(90.0, 20.0)), Some(HighlightPosition::ColFirst));
        assert_eq!(menu.click(Point::new(150.0, 20.0)), None);
    }

    #[test]
    fn test_selection_box_from_band() {
        let mut band = RectSelection::new(Point::new(10.0, 10.0));
        band.current = Point::new(40.0, 0.0);
        let bx = SelectionBox::from(band);
        assert!(bx.left_to_right);
        assert_eq!(bx.rect, Rect::new(10.0, 0.0, 40.0, 10.0));
    }
}
