//! Input dispatcher tying the state containers to the mode controllers.

use crate::bridge::BridgeParams;
use crate::config::EditorConfig;
use crate::graph::{Graph, GraphResult, GroupId, GroupLayout, Neighbourhood};
use crate::hover::HoverState;
use crate::input::{KeyEvent, MouseButton, PointerEvent};
use crate::modes::{EditController, EditSubmode, EditorContext, Mode, ModeController, NormalController, Outcome, Pointer};
use crate::overlay::Overlay;
use crate::selection::SelectionModel;
use crate::view::ViewState;
use kurbo::{Point, Size};

/// Notification published after an input changed something.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Mode label changed: `"normal"` or `"edit/<submode>"`.
    ModeChanged(String),
    SelectionChanged,
    HoverChanged,
    ViewChanged,
    GraphChanged,
    /// Right button pressed; the host shows its menu here.
    ContextMenuRequested { canvas: Point, world: Point, mode: Mode },
}

/// Owns the graph and every piece of editor state.
///
/// Hosts feed raw pointer and key input in canvas coordinates, read the
/// state back through the accessors, and drain [`EditorEvent`]s after each
/// call.
#[derive(Debug)]
pub struct Editor {
    graph: Graph,
    selection: SelectionModel,
    hover: HoverState,
    view: ViewState,
    config: EditorConfig,
    mode: Mode,
    normal: NormalController,
    edit: EditController,
    events: Vec<EditorEvent>,
    published_label: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an empty editor in Normal mode.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            graph: Graph::from_config(&config),
            selection: SelectionModel::with_deselect(config.deselect),
            hover: HoverState::new(),
            view: ViewState::from_config(&config),
            mode: Mode::Normal,
            normal: NormalController::new(),
            edit: EditController::new(),
            events: Vec::new(),
            published_label: Mode::Normal.name().to_string(),
            config,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionModel {
        &mut self.selection
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn edit_controller(&self) -> &EditController {
        &self.edit
    }

    /// Groups editable in the current Edit session.
    pub fn edit_targets(&self) -> &[GroupId] {
        self.edit.targets()
    }

    /// `"normal"` or `"edit/<submode>"`.
    pub fn mode_label(&self) -> String {
        match self.mode {
            Mode::Normal => Mode::Normal.name().to_string(),
            Mode::Edit => format!("{}/{}", Mode::Edit.name(), self.edit.submode().name()),
        }
    }

    /// Drain the notifications published since the last call.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        self.view.set_canvas_size(size);
        self.publish();
    }

    fn pointer(&self, canvas: Point, modifiers: crate::input::Modifiers) -> Pointer {
        Pointer::new(self.view.canvas_to_world(canvas), canvas, modifiers)
    }

    fn dispatch(&mut self, f: impl FnOnce(&mut dyn ModeController, &mut EditorContext<'_>) -> Outcome) -> Outcome {
        let mut ctx = EditorContext {
            graph: &mut self.graph,
            selection: &mut self.selection,
            hover: &mut self.hover,
            view: &mut self.view,
            config: &self.config,
        };
        let controller: &mut dyn ModeController = match self.mode {
            Mode::Normal => &mut self.normal,
            Mode::Edit => &mut self.edit,
        };
        f(controller, &mut ctx)
    }

    fn apply(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Ignored => false,
            Outcome::Handled => true,
            Outcome::SwitchMode(mode) => {
                self.set_mode(mode);
                true
            }
            Outcome::SwitchSubmode(submode) => {
                self.set_edit_submode(submode);
                true
            }
        }
    }

    /// Route a pointer event. Returns true if anything handled it.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let handled = match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Middle,
                ..
            } => {
                self.view.start_panning(position);
                true
            }
            PointerEvent::Up {
                button: MouseButton::Middle,
                ..
            } => {
                self.view.end_panning();
                true
            }
            PointerEvent::Move { position, .. } if self.view.is_panning() => self.view.update_panning(position),
            PointerEvent::Down {
                position,
                button: MouseButton::Right,
                modifiers,
            } => {
                let pointer = self.pointer(position, modifiers);
                let outcome = self.dispatch(|c, ctx| c.on_context_menu(ctx, pointer));
                self.events.push(EditorEvent::ContextMenuRequested {
                    canvas: pointer.canvas,
                    world: pointer.world,
                    mode: self.mode,
                });
                self.apply(outcome)
            }
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => {
                let pointer = self.pointer(position, modifiers);
                let outcome = self.dispatch(|c, ctx| c.on_press(ctx, pointer));
                self.apply(outcome)
            }
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
                modifiers,
            } => {
                let pointer = self.pointer(position, modifiers);
                let outcome = self.dispatch(|c, ctx| c.on_release(ctx, pointer));
                self.apply(outcome)
            }
            PointerEvent::Up { .. } => false,
            PointerEvent::Move { position, modifiers } => {
                let pointer = self.pointer(position, modifiers);
                let outcome = self.dispatch(|c, ctx| c.on_move(ctx, pointer));
                self.apply(outcome)
            }
            PointerEvent::Scroll { position, delta } => {
                self.view.zoom_at(position, delta.y, self.config.zoom_sensitivity);
                true
            }
        };
        self.publish();
        handled
    }

    /// Route a key press to the active controller.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let outcome = self.dispatch(|c, ctx| c.on_key(ctx, key));
        let handled = self.apply(outcome);
        self.publish();
        handled
    }

    /// Enter or leave Edit mode. Returns false if `mode` is already active.
    ///
    /// Entering Edit takes the selected groups as targets and clears the
    /// node selection; leaving it drops the targets and the edge selection.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.normal.cancel();
        self.edit.cancel();
        self.hover.clear();
        match mode {
            Mode::Edit => {
                self.edit.end_session();
                self.edit.set_targets(self.selection.groups().to_vec());
                self.selection.clear_nodes();
            }
            Mode::Normal => {
                self.edit.end_session();
                self.selection.clear_edges();
            }
        }
        log::info!("Mode changed: {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
        self.publish();
        true
    }

    /// Switch mode by name (`"normal"`, `"edit"` or `"edit/<submode>"`).
    /// Unknown names are ignored and return false.
    pub fn request_mode_switch(&mut self, name: &str) -> bool {
        let (mode_name, submode_name) = match name.split_once('/') {
            Some((mode, sub)) => (mode, Some(sub)),
            None => (name, None),
        };
        let Some(mode) = Mode::from_name(mode_name) else {
            log::warn!("Unknown mode: {name}");
            return false;
        };
        let submode = match submode_name {
            Some(sub) if mode == Mode::Edit => match EditSubmode::from_name(sub) {
                Some(submode) => Some(submode),
                None => {
                    log::warn!("Unknown edit submode: {sub}");
                    return false;
                }
            },
            Some(_) => return false,
            None => None,
        };
        let mut changed = self.set_mode(mode);
        if let Some(submode) = submode {
            changed |= self.set_edit_submode(submode);
        }
        changed
    }

    /// Change the Edit tool. Ignored outside Edit mode.
    pub fn set_edit_submode(&mut self, submode: EditSubmode) -> bool {
        if self.mode != Mode::Edit {
            return false;
        }
        let changed = self.edit.set_submode(submode);
        self.publish();
        changed
    }

    pub fn bridge_params(&self) -> BridgeParams {
        self.edit.bridge_params()
    }

    /// Store bridge parameters, clamped to the configured range.
    pub fn set_bridge_params(&mut self, params: BridgeParams) {
        let params = params.clamped(self.config.min_bridge_connections, self.config.max_bridge_connections);
        self.edit.set_bridge_params(params);
    }

    /// Commit the bridge between the two groups picked in Bridge mode.
    pub fn commit_bridge(&mut self) -> bool {
        if self.mode != Mode::Edit {
            return false;
        }
        let committed = self.edit.commit_bridge(&mut self.graph, &self.config);
        self.publish();
        committed
    }

    /// Layout for a new `rows` x `cols` group using the configured defaults.
    pub fn group_layout(&self, rows: u32, cols: u32) -> GroupLayout {
        GroupLayout::from_config(&self.config, rows, cols)
    }

    pub fn add_node_group(&mut self, layout: GroupLayout) -> GraphResult<GroupId> {
        let id = self.graph.add_node_group(layout)?;
        self.publish();
        Ok(id)
    }

    /// Delete a group and scrub every reference to it.
    pub fn delete_group(&mut self, id: GroupId) -> bool {
        let Some(group) = self.graph.delete_group(id) else {
            return false;
        };
        self.selection.prune(&self.graph);
        self.edit.retain_existing(&self.graph);
        self.hover.clear();
        log::info!("Deleted group {}", group.name);
        self.publish();
        true
    }

    /// Connect grid neighbours inside the Edit targets, or inside the
    /// selected groups in Normal mode. Returns the number of edges added.
    pub fn connect_targets(&mut self, neighbourhood: Neighbourhood) -> usize {
        let added = match self.mode {
            Mode::Edit => self.edit.connect_targets(&mut self.graph, neighbourhood),
            Mode::Normal => {
                let groups = self.selection.groups().to_vec();
                self.graph.connect_neighbours(&groups, neighbourhood)
            }
        };
        log::debug!("Connected {added} neighbour edges");
        self.publish();
        added
    }

    pub fn connect_targets_4(&mut self) -> usize {
        self.connect_targets(Neighbourhood::Four)
    }

    pub fn connect_targets_8(&mut self) -> usize {
        self.connect_targets(Neighbourhood::Eight)
    }

    /// Snapshot of everything transient the host may draw.
    pub fn overlay(&self) -> Overlay {
        let mut overlay = Overlay {
            mode: self.mode_label(),
            ..Overlay::default()
        };
        match self.mode {
            Mode::Normal => self.normal.overlay(&self.graph, &self.config, &mut overlay),
            Mode::Edit => self.edit.overlay(&self.graph, &self.config, &mut overlay),
        }
        overlay
    }

    fn publish(&mut self) {
        let label = self.mode_label();
        if label != self.published_label {
            self.events.push(EditorEvent::ModeChanged(label.clone()));
            self.published_label = label;
        }
        if self.graph.take_changed() {
            self.events.push(EditorEvent::GraphChanged);
        }
        if self.selection.take_changed() {
            self.events.push(EditorEvent::SelectionChanged);
        }
        if self.hover.take_changed() {
            self.events.push(EditorEvent::HoverChanged);
        }
        if self.view.take_changed() {
            self.events.push(EditorEvent::ViewChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::input::{Key, Modifiers};
    use kurbo::Vec2;

    fn down(x: f64, y: f64, button: MouseButton) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button,
            modifiers: Modifiers::NONE,
        }
    }

    fn up(x: f64, y: f64, button: MouseButton) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button,
            modifiers: Modifiers::NONE,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Editor with a zero-size canvas, so canvas and world coincide.
    fn editor_with_group(rows: u32, cols: u32) -> (Editor, GroupId) {
        let mut editor = Editor::default();
        let layout = editor.group_layout(rows, cols);
        let id = editor.add_node_group(layout).unwrap();
        editor.take_events();
        (editor, id)
    }

    #[test]
    fn test_entering_edit_seeds_targets() {
        let (mut editor, id) = editor_with_group(2, 2);
        editor.handle_pointer(down(100.0, 100.0, MouseButton::Left));
        editor.handle_pointer(up(100.0, 100.0, MouseButton::Left));
        assert_eq!(editor.selection().groups(), &[id]);
        assert!(!editor.selection().nodes().is_empty());

        assert!(editor.handle_key(KeyEvent::plain(Key::Char('e'))));
        assert_eq!(editor.mode(), Mode::Edit);
        assert_eq!(editor.edit_targets(), &[id]);
        assert!(editor.selection().nodes().is_empty());
        assert_eq!(editor.selection().groups(), &[id]);
        assert!(editor.take_events().contains(&EditorEvent::ModeChanged("edit/connect".into())));

        assert!(editor.set_mode(Mode::Normal));
        assert!(editor.edit_targets().is_empty());
        assert_eq!(editor.take_events(), vec![EditorEvent::ModeChanged("normal".into())]);
    }

    #[test]
    fn test_submode_change_publishes_label() {
        let (mut editor, _) = editor_with_group(1, 2);
        assert!(!editor.set_edit_submode(EditSubmode::Knife));
        editor.set_mode(Mode::Edit);
        editor.take_events();
        assert!(editor.set_edit_submode(EditSubmode::Knife));
        assert_eq!(editor.mode_label(), "edit/knife");
        assert_eq!(editor.take_events(), vec![EditorEvent::ModeChanged("edit/knife".into())]);
    }

    #[test]
    fn test_request_mode_switch() {
        let (mut editor, _) = editor_with_group(1, 2);
        assert!(!editor.request_mode_switch("sculpt"));
        assert!(!editor.request_mode_switch("edit/spray"));
        assert_eq!(editor.mode(), Mode::Normal);
        assert!(editor.request_mode_switch("edit/bridge"));
        assert_eq!(editor.overlay().mode, "edit/bridge");
        assert!(!editor.request_mode_switch("edit/bridge"));
    }

    #[test]
    fn test_middle_button_pans_in_any_mode() {
        let (mut editor, id) = editor_with_group(1, 2);
        editor.handle_pointer(down(0.0, 0.0, MouseButton::Middle));
        editor.handle_pointer(moved(30.0, -10.0));
        editor.handle_pointer(up(30.0, -10.0, MouseButton::Middle));
        assert_eq!(editor.view().pan_offset(), Vec2::new(30.0, -10.0));
        assert!(editor.take_events().contains(&EditorEvent::ViewChanged));
        // The drag never reached the controller.
        assert!(editor.selection().is_empty());
        assert_eq!(editor.graph().group(id).map(|g| g.node_ids.len()), Some(2));
    }

    #[test]
    fn test_right_button_requests_context_menu() {
        let (mut editor, _) = editor_with_group(1, 2);
        editor.handle_key(KeyEvent::new(Key::Char('a'), Modifiers::CTRL));
        editor.set_mode(Mode::Edit);
        editor.handle_pointer(down(100.0, 100.0, MouseButton::Left));
        editor.handle_pointer(moved(120.0, 100.0));
        assert!(editor.overlay().temp_edge.is_some());
        editor.handle_pointer(down(300.0, 300.0, MouseButton::Right));
        assert!(editor.overlay().temp_edge.is_none());
        let events = editor.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EditorEvent::ContextMenuRequested { mode: Mode::Edit, .. }
        )));
    }

    #[test]
    fn test_scroll_zooms_about_cursor() {
        let mut editor = Editor::default();
        editor.handle_pointer(PointerEvent::Scroll {
            position: Point::new(50.0, 50.0),
            delta: Vec2::new(0.0, 1200.0),
        });
        assert!((editor.view().zoom() - 2.0).abs() < f64::EPSILON);
        let world = editor.view().canvas_to_world(Point::new(50.0, 50.0));
        assert!((world - Point::new(50.0, 50.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_delete_group_scrubs_references() {
        let (mut editor, id) = editor_with_group(1, 2);
        let layout = editor.group_layout(1, 2).with_origin(Point::new(100.0, 300.0));
        let other = editor.add_node_group(layout).unwrap();
        editor.graph_mut().add_edge(0, 2);
        editor.handle_key(KeyEvent::new(Key::Char('a'), Modifiers::CTRL));
        editor.set_mode(Mode::Edit);
        assert_eq!(editor.edit_targets(), &[id, other]);

        assert!(editor.delete_group(id));
        assert_eq!(editor.edit_targets(), &[other]);
        assert_eq!(editor.selection().groups(), &[other]);
        assert!(editor.graph().edges().is_empty());
        assert!(!editor.delete_group(id));
    }

    #[test]
    fn test_connect_targets_uses_selection_in_normal_mode() {
        let (mut editor, id) = editor_with_group(2, 2);
        assert_eq!(editor.connect_targets_4(), 0);
        let graph = editor.graph().clone();
        editor.selection_mut().select_group(&graph, id, false);
        assert_eq!(editor.connect_targets_4(), 4);
        editor.set_mode(Mode::Edit);
        assert_eq!(editor.connect_targets_8(), 2);
        assert!(editor.graph().has_edge(0, 3) || editor.graph().has_edge(3, 0));
        assert!(editor.graph().edges().contains(&Edge::new(0, 1)));
    }

    #[test]
    fn test_bridge_params_are_clamped() {
        let mut editor = Editor::default();
        editor.set_bridge_params(BridgeParams {
            source_to_target_count: 50,
            target_to_source_count: 0,
            flip_direction: true,
        });
        let params = editor.bridge_params();
        assert_eq!(params.source_to_target_count, 10);
        assert_eq!(params.target_to_source_count, 1);
        assert!(params.flip_direction);
    }
}
