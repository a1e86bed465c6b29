//! View state: pan, zoom and grid display.

use crate::config::EditorConfig;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// An in-progress middle-button pan.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanGesture {
    start: Point,
    offset_at_start: Vec2,
}

/// Pan/zoom transform between canvas (widget) and world coordinates.
///
/// `world = (canvas - canvas_center - pan_offset) / zoom`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewState {
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    pan_offset: Vec2,
    canvas_size: Size,
    grid_visible: bool,
    snap_to_grid: bool,
    #[serde(skip)]
    panning: Option<PanGesture>,
    #[serde(skip)]
    changed: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            pan_offset: Vec2::ZERO,
            canvas_size: Size::ZERO,
            grid_visible: true,
            snap_to_grid: false,
            panning: None,
            changed: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// View with the configured zoom limits and starting zoom.
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut view = Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            ..Self::default()
        };
        view.zoom = config.default_zoom.clamp(view.min_zoom, view.max_zoom);
        view
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (zoom - self.zoom).abs() > f64::EPSILON {
            self.zoom = zoom;
            self.changed = true;
        }
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan_offset
    }

    pub fn set_pan_offset(&mut self, offset: Vec2) {
        if offset != self.pan_offset {
            self.pan_offset = offset;
            self.changed = true;
        }
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Resize the canvas. The world origin stays at the canvas center.
    pub fn set_canvas_size(&mut self, size: Size) {
        if size != self.canvas_size {
            self.canvas_size = size;
            self.changed = true;
        }
    }

    pub fn canvas_center(&self) -> Point {
        Point::new(self.canvas_size.width / 2.0, self.canvas_size.height / 2.0)
    }

    /// World-to-canvas transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.canvas_center().to_vec2() + self.pan_offset) * Affine::scale(self.zoom)
    }

    /// Convert a canvas point to world coordinates.
    pub fn canvas_to_world(&self, canvas: Point) -> Point {
        let shifted = canvas - self.canvas_center() - self.pan_offset;
        Point::new(shifted.x / self.zoom, shifted.y / self.zoom)
    }

    /// Convert a world point to canvas coordinates.
    pub fn world_to_canvas(&self, world: Point) -> Point {
        self.transform() * world
    }

    /// Convert a canvas-pixel distance to world units.
    pub fn pixels_to_world(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// Zoom by a wheel delta, keeping the world point under `canvas` fixed.
    pub fn zoom_at(&mut self, canvas: Point, wheel_delta: f64, sensitivity: f64) {
        let anchor = self.canvas_to_world(canvas);
        let factor = 1.0 + wheel_delta / sensitivity;
        self.set_zoom(self.zoom * factor);
        let offset = canvas - self.canvas_center() - anchor.to_vec2() * self.zoom;
        self.set_pan_offset(offset);
    }

    pub fn start_panning(&mut self, canvas: Point) {
        self.panning = Some(PanGesture {
            start: canvas,
            offset_at_start: self.pan_offset,
        });
    }

    /// Follow the pointer during a pan. Returns false if no pan is active.
    pub fn update_panning(&mut self, canvas: Point) -> bool {
        let Some(gesture) = self.panning else {
            return false;
        };
        self.set_pan_offset(gesture.offset_at_start + (canvas - gesture.start));
        true
    }

    pub fn end_panning(&mut self) {
        self.panning = None;
    }

    pub fn is_panning(&self) -> bool {
        self.panning.is_some()
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    /// Enable or disable snapping. Snapping needs a visible grid.
    pub fn set_snap_to_grid(&mut self, snap: bool) {
        let snap = snap && self.grid_visible;
        if snap != self.snap_to_grid {
            self.snap_to_grid = snap;
            self.changed = true;
        }
    }

    /// Show or hide the grid. Hiding it turns snapping off; showing it again
    /// leaves snapping off until re-enabled.
    pub fn set_grid_visible(&mut self, visible: bool) {
        if visible != self.grid_visible {
            self.grid_visible = visible;
            if !visible {
                self.snap_to_grid = false;
            }
            self.changed = true;
        }
    }

    /// Toggle grid visibility and return the new state.
    pub fn toggle_grid(&mut self) -> bool {
        self.set_grid_visible(!self.grid_visible);
        self.grid_visible
    }

    /// Returns true if drags should snap to the grid.
    pub fn snapping_active(&self) -> bool {
        self.grid_visible && self.snap_to_grid
    }

    /// Returns true if the view changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        let mut view = ViewState::new();
        view.set_canvas_size(Size::new(800.0, 600.0));
        view
    }

    #[test]
    fn test_canvas_to_world_formula() {
        let mut view = view();
        view.set_pan_offset(Vec2::new(20.0, -10.0));
        view.set_zoom(2.0);
        let world = view.canvas_to_world(Point::new(500.0, 300.0));
        // (500 - 400 - 20) / 2, (300 - 300 + 10) / 2
        assert!((world.x - 40.0).abs() < f64::EPSILON);
        assert!((world.y - 5.0).abs() < f64::EPSILON);
        let back = view.world_to_canvas(world);
        assert!((back.x - 500.0).abs() < 1e-9);
        assert!((back.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = view();
        view.set_zoom(50.0);
        assert!((view.zoom() - 10.0).abs() < f64::EPSILON);
        view.set_zoom(0.0);
        assert!((view.zoom() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut view = view();
        let cursor = Point::new(600.0, 200.0);
        let before = view.canvas_to_world(cursor);
        view.zoom_at(cursor, 600.0, 1200.0);
        assert!((view.zoom() - 1.5).abs() < f64::EPSILON);
        let after = view.canvas_to_world(cursor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_panning() {
        let mut view = view();
        assert!(!view.update_panning(Point::new(1.0, 1.0)));
        view.start_panning(Point::new(100.0, 100.0));
        assert!(view.update_panning(Point::new(130.0, 90.0)));
        assert_eq!(view.pan_offset(), Vec2::new(30.0, -10.0));
        view.end_panning();
        assert!(!view.is_panning());
    }

    #[test]
    fn test_hiding_grid_disables_snap() {
        let mut view = view();
        view.set_snap_to_grid(true);
        assert!(view.snapping_active());
        assert!(!view.toggle_grid());
        assert!(!view.snap_to_grid());
        view.set_snap_to_grid(true);
        assert!(!view.snap_to_grid());
    }
}
