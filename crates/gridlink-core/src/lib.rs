//! GridLink Core Library
//!
//! Interactive editing core for grid-based node graphs: a graph store, the
//! Normal and Edit mode state machines, and the geometry and bipartite
//! connection algorithms they rely on. Rendering and windowing live in the
//! host.

pub mod bridge;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod graph;
pub mod hover;
pub mod input;
pub mod modes;
pub mod overlay;
pub mod selection;
pub mod snap;
pub mod view;

pub use bridge::{BipartiteMapping, BridgeParams, BridgePlan, BridgeSide, HighlightPosition, generate_bipartite_mapping};
pub use config::{ConfigError, ConfigResult, EditorConfig};
pub use editor::{Editor, EditorEvent};
pub use graph::{Edge, Graph, GraphError, GraphResult, GroupId, GroupLayout, Neighbourhood, Node, NodeGroup, NodeId, NodeShape};
pub use hover::HoverState;
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use modes::{EditSubmode, Mode};
pub use overlay::{FloatingMenu, Overlay, SelectionBox};
pub use selection::{DeselectMethods, SelectionModel};
pub use snap::{GRID_SPACING, snap_to_grid};
pub use view::ViewState;
