//! The board engine: document state, history, selection, viewport, and the
//! pointer gesture machine in one place.
//!
//! Hosts feed pointer events in screen coordinates and render from the
//! engine's state; every mutation of board content goes through here so
//! undo snapshots and selection stay consistent.

use crate::board::{BoardId, BoardSet};
use crate::collab::{idea_grid, swatch_row, BasicSanitizer, ItemPatch, Sanitizer};
use crate::containment::{kanban_preview, snap_into_column};
use crate::geometry::dimensions_of;
use crate::gesture::{
    expand_drag_set, DragState, Gesture, GhostItem, GroupResizeState, ResizeHandle,
};
use crate::guides::{snap_position, Guideline};
use crate::history::History;
use crate::item::{colors, BoardItem, ItemId, ItemStyle, ItemType, Todo};
use crate::mindmap::{self, MindMapError, NavDirection};
use crate::selection::{lasso_hits, marquee_hits, MarqueeBox, Selection};
use crate::storage::{Storage, StorageResult};
use crate::template::{apply_template, Template};
use crate::viewport::{PanDirection, Viewport};
use kurbo::{Point, Rect, Size, Vec2};

/// Stroke color for freehand drawings.
pub const DRAWING_STROKE: &str = "#374151";

/// Offset from the screen center at which new items are dropped, so they
/// land roughly centered rather than hanging off to the bottom-right.
const CENTER_OFFSET: Vec2 = Vec2::new(120.0, 100.0);

/// Layouts for tidying a multi-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TidyLayout {
    Grid,
    Row,
    Column,
}

/// Gap between tidied items.
pub const TIDY_GAP: f64 = 24.0;

#[derive(Debug)]
pub struct BoardEngine {
    boards: BoardSet,
    history: History,
    selection: Selection,
    viewport: Viewport,
    gesture: Gesture,

    lasso_mode: bool,
    drawing_mode: bool,
    connection_mode: bool,
    connection_start: Option<ItemId>,

    guides: Vec<Guideline>,
    drag_over_board: Option<ItemId>,
    drag_over_kanban: Option<ItemId>,
    kanban_ghost: Option<Rect>,
    multi_drag_ghost: Vec<GhostItem>,

    // Pre-gesture snapshot, pushed into history when a resize commits.
    resize_snapshot: Option<crate::board::BoardMap>,

    viewport_size: Size,
    sanitizer: BasicSanitizer,
}

impl Default for BoardEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardEngine {
    pub fn new() -> Self {
        Self::with_history(History::new())
    }

    /// Build with a custom history, letting tests shrink the debounce.
    pub fn with_history(history: History) -> Self {
        Self {
            boards: BoardSet::new(),
            history,
            selection: Selection::new(),
            viewport: Viewport::new(),
            gesture: Gesture::Idle,
            lasso_mode: false,
            drawing_mode: false,
            connection_mode: false,
            connection_start: None,
            guides: Vec::new(),
            drag_over_board: None,
            drag_over_kanban: None,
            kanban_ghost: None,
            multi_drag_ghost: Vec::new(),
            resize_snapshot: None,
            viewport_size: Size::new(1280.0, 800.0),
            sanitizer: BasicSanitizer,
        }
    }

    // -- Accessors --

    pub fn boards(&self) -> &BoardSet {
        &self.boards
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn guides(&self) -> &[Guideline] {
        &self.guides
    }

    pub fn kanban_ghost(&self) -> Option<Rect> {
        self.kanban_ghost
    }

    pub fn multi_drag_ghost(&self) -> &[GhostItem] {
        &self.multi_drag_ghost
    }

    pub fn drag_over_board(&self) -> Option<ItemId> {
        self.drag_over_board
    }

    pub fn drag_over_kanban(&self) -> Option<ItemId> {
        self.drag_over_kanban
    }

    pub fn connection_mode(&self) -> bool {
        self.connection_mode
    }

    pub fn set_lasso_mode(&mut self, on: bool) {
        self.lasso_mode = on;
    }

    pub fn set_drawing_mode(&mut self, on: bool) {
        self.drawing_mode = on;
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    fn items(&self) -> &[BoardItem] {
        &self.boards.current_board().items
    }

    fn push_history(&mut self) {
        self.history.push(self.boards.boards());
    }

    /// The world point where new items land: the visual center of the
    /// viewport, pulled up-left so a default-sized item sits centered.
    pub fn viewport_center(&self) -> Point {
        let screen = Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0);
        self.viewport.screen_to_world(screen) - CENTER_OFFSET
    }

    // -- Item operations --

    /// Create an item of the given type at the viewport center plus
    /// `offset`. Board items also create the child board they open.
    pub fn add_item(&mut self, kind: ItemType, content: &str, offset: Vec2) -> ItemId {
        self.push_history();
        let position = self.viewport_center() + offset;
        let current = self.boards.current_board_id();

        let mut item = BoardItem::new(kind, position, content);
        if kind == ItemType::Board {
            let child = self.boards.add_board(content, current);
            item.linked_board_id = Some(child);
        }

        let id = item.id;
        self.boards.update_board(current, |board| {
            board.items.push(item);
        });
        self.selection.select(id, false);
        id
    }

    /// Validate and normalize a URL, then create a loading link card for
    /// it. Returns `None` without touching the board when the URL is
    /// rejected.
    pub fn add_link(&mut self, url: &str) -> Option<ItemId> {
        let sanitized = self.sanitizer.sanitize_url(url)?;
        Some(self.add_item(ItemType::Link, &sanitized, Vec2::ZERO))
    }

    pub fn delete_selected(&mut self) {
        let ids = self.selection.ids().to_vec();
        if !ids.is_empty() {
            self.delete_items(&ids);
        }
    }

    /// Delete items from the current board, cascading through any child
    /// boards they open.
    pub fn delete_items(&mut self, ids: &[ItemId]) {
        self.push_history();
        let current = self.boards.current_board_id();
        self.boards.delete_items(current, ids);
        self.selection.clear();
    }

    /// Clone the selection with fresh ids, offset down-right. Todos get
    /// fresh ids too; portal items keep pointing at the same child board.
    pub fn duplicate_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.push_history();

        let mut clones = Vec::new();
        for &id in self.selection.ids() {
            let Some(item) = self.boards.current_board().item(id) else {
                continue;
            };
            let mut clone = item.clone();
            clone.id = uuid::Uuid::new_v4();
            clone.position += Vec2::new(30.0, 30.0);
            if let Some(todos) = &mut clone.todos {
                for todo in todos {
                    todo.id = uuid::Uuid::new_v4();
                }
            }
            clones.push(clone);
        }

        let new_ids: Vec<ItemId> = clones.iter().map(|i| i.id).collect();
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            board.items.extend(clones);
        });
        self.selection.set(new_ids);
    }

    pub fn set_color(&mut self, ids: &[ItemId], color: &str) {
        self.push_history();
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            for item in &mut board.items {
                if ids.contains(&item.id) {
                    item.color = Some(color.to_string());
                }
            }
        });
    }

    pub fn set_style(&mut self, ids: &[ItemId], style: ItemStyle) {
        self.push_history();
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            for item in &mut board.items {
                if ids.contains(&item.id) {
                    item.style = Some(style.clone());
                }
            }
        });
    }

    /// Update an item's text. For portal items, the linked board's title
    /// follows the item content.
    pub fn set_content(&mut self, id: ItemId, content: &str) {
        let sanitized = self.sanitizer.sanitize_text(content);

        let linked = self
            .boards
            .current_board()
            .item(id)
            .filter(|i| i.kind == ItemType::Board)
            .and_then(|i| i.linked_board_id);
        if let Some(board_id) = linked {
            if let Some(board) = self.boards.board_mut(board_id) {
                board.title = sanitized.clone();
            }
        }

        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            if let Some(item) = board.item_mut(id) {
                item.content = sanitized;
            }
        });
    }

    pub fn set_todos(&mut self, id: ItemId, todos: Vec<Todo>) {
        let sanitized: Vec<Todo> = todos
            .into_iter()
            .map(|mut todo| {
                todo.text = self.sanitizer.sanitize_text(&todo.text);
                todo
            })
            .collect();
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            if let Some(item) = board.item_mut(id) {
                item.todos = Some(sanitized);
            }
        });
    }

    /// Capture the pre-resize state; [`Self::commit_resize`] turns it into
    /// one history entry for the whole gesture.
    pub fn begin_item_resize(&mut self) {
        self.resize_snapshot = Some(self.boards.boards().clone());
    }

    /// Live size update while a resize handle is being dragged.
    pub fn resize_item(&mut self, id: ItemId, width: f64, height: f64) {
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            if let Some(item) = board.item_mut(id) {
                item.width = Some(width);
                item.height = Some(height);
            }
        });
    }

    pub fn commit_resize(&mut self) {
        if let Some(snapshot) = self.resize_snapshot.take() {
            self.history.push(&snapshot);
        }
    }

    pub fn toggle_collapse(&mut self, id: ItemId) {
        self.push_history();
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            if let Some(item) = board.item_mut(id) {
                item.collapsed = !item.collapsed;
            }
        });
    }

    /// Rearrange the selection into a grid, a row, or a column. Cells are
    /// sized by the largest selected item; the arrangement anchors at the
    /// selection's top-left corner.
    pub fn tidy_up(&mut self, layout: TidyLayout) {
        if self.selection.len() < 2 {
            return;
        }
        self.push_history();

        let mut selected: Vec<BoardItem> = self
            .items()
            .iter()
            .filter(|i| self.selection.is_selected(i.id))
            .cloned()
            .collect();

        let mut max_w = 0.0f64;
        let mut max_h = 0.0f64;
        for item in &selected {
            let dims = dimensions_of(item);
            max_w = max_w.max(dims.width);
            max_h = max_h.max(dims.height);
        }

        let count = selected.len();
        let cols = match layout {
            TidyLayout::Grid => (count as f64).sqrt().ceil() as usize,
            TidyLayout::Row => count,
            TidyLayout::Column => 1,
        };

        selected.sort_by(|a, b| match layout {
            TidyLayout::Row => a.position.x.total_cmp(&b.position.x),
            TidyLayout::Column => a.position.y.total_cmp(&b.position.y),
            TidyLayout::Grid => {
                // Reading order: rows bucketed within 50px, then x.
                if (a.position.y - b.position.y).abs() > 50.0 {
                    a.position.y.total_cmp(&b.position.y)
                } else {
                    a.position.x.total_cmp(&b.position.x)
                }
            }
        });

        let min_x = selected
            .iter()
            .map(|i| i.position.x)
            .fold(f64::INFINITY, f64::min);
        let min_y = selected
            .iter()
            .map(|i| i.position.y)
            .fold(f64::INFINITY, f64::min);

        let placements: Vec<(ItemId, Point)> = selected
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let col = (index % cols) as f64;
                let row = (index / cols) as f64;
                (
                    item.id,
                    Point::new(min_x + col * (max_w + TIDY_GAP), min_y + row * (max_h + TIDY_GAP)),
                )
            })
            .collect();

        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            for (id, position) in placements {
                if let Some(item) = board.item_mut(id) {
                    item.position = position;
                }
            }
        });
    }

    /// Replace the current board's contents with a template layout.
    pub fn apply_template(&mut self, template: &Template) {
        self.push_history();
        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            apply_template(board, template);
        });
        self.selection.clear();
    }

    /// Apply an asynchronous completion to an item on the current board.
    /// Stale patches for deleted items are dropped.
    pub fn apply_patch(&mut self, id: ItemId, patch: ItemPatch) -> bool {
        let current = self.boards.current_board_id();
        let Some(board) = self.boards.board_mut(current) else {
            return false;
        };
        crate::collab::apply_patch(board, id, patch)
    }

    /// Lay extracted palette colors out as a row of swatches below the
    /// source image.
    pub fn place_swatches(&mut self, image_id: ItemId, palette: &[String]) {
        let Some(image) = self.boards.current_board().item(image_id).cloned() else {
            return;
        };
        if image.kind != ItemType::Image || palette.is_empty() {
            return;
        }
        self.push_history();

        let positions = swatch_row(&image, palette.len());
        let swatches: Vec<BoardItem> = positions
            .into_iter()
            .zip(palette)
            .map(|(position, hex)| {
                let mut swatch = BoardItem::new(ItemType::Swatch, position, "Color");
                swatch.swatch_color = Some(hex.clone());
                swatch
            })
            .collect();

        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            board.items.extend(swatches);
        });
    }

    /// Drop generated idea notes in a grid around the viewport center.
    pub fn place_ideas(&mut self, ideas: &[String]) {
        if ideas.is_empty() {
            return;
        }
        self.push_history();

        let positions = idea_grid(self.viewport_center(), ideas.len());
        let notes: Vec<BoardItem> = positions
            .into_iter()
            .zip(ideas)
            .map(|(position, idea)| {
                BoardItem::new(ItemType::Note, position, idea.as_str())
                    .with_color(colors::YELLOW)
            })
            .collect();

        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            board.items.extend(notes);
        });
    }

    // -- Connections --

    pub fn toggle_connection_mode(&mut self) {
        self.connection_mode = !self.connection_mode;
        self.connection_start = None;
    }

    /// Two-click connect: the first click picks the source, the second
    /// creates the edge and leaves connection mode. Self-loops and
    /// duplicates (in either direction) are ignored.
    fn connect(&mut self, id: ItemId) {
        match self.connection_start {
            None => self.connection_start = Some(id),
            Some(start) => {
                if start != id {
                    self.push_history();
                    let current = self.boards.current_board_id();
                    self.boards.update_board(current, |board| {
                        board.add_connection(start, id);
                    });
                }
                self.connection_start = None;
                self.connection_mode = false;
            }
        }
    }

    // -- Mind map --

    pub fn mindmap_create_root(&mut self) -> ItemId {
        self.push_history();
        let center = self.viewport_center();
        let id = mindmap::create_root(self.boards.current_board_mut(), center);
        self.selection.select(id, false);
        id
    }

    pub fn mindmap_add_child(&mut self, parent: ItemId) -> Result<ItemId, MindMapError> {
        self.push_history();
        let id = mindmap::add_child(self.boards.current_board_mut(), parent)?;
        self.selection.select(id, false);
        Ok(id)
    }

    pub fn mindmap_add_sibling(&mut self, current: ItemId) -> Result<ItemId, MindMapError> {
        self.push_history();
        let id = mindmap::add_sibling(self.boards.current_board_mut(), current)?;
        self.selection.select(id, false);
        Ok(id)
    }

    /// Move the selection along the tree. No-op when nothing is selected
    /// or there is no node in that direction.
    pub fn mindmap_navigate(&mut self, direction: NavDirection) -> Option<ItemId> {
        let current = self.selection.active()?;
        let next = mindmap::navigate(current, &self.boards.current_board().connections, direction)?;
        self.selection.select(next, false);
        Some(next)
    }

    // -- History --

    pub fn undo(&mut self) {
        if let Some(previous) = self.history.undo(self.boards.boards()) {
            self.boards.set_boards(previous);
            let items = self.items().to_vec();
            self.selection.retain_existing(&items);
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.history.redo(self.boards.boards()) {
            self.boards.set_boards(next);
            let items = self.items().to_vec();
            self.selection.retain_existing(&items);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -- Selection commands --

    pub fn select_all(&mut self) {
        let items = self.items().to_vec();
        self.selection.select_all(&items);
    }

    pub fn invert_selection(&mut self) {
        let items = self.items().to_vec();
        self.selection.invert(&items);
    }

    pub fn select_similar(&mut self) {
        let items = self.items().to_vec();
        self.selection.select_similar(&items);
    }

    /// Escape: drop the selection, any pending connection, the active
    /// gesture, and any armed canvas mode.
    pub fn escape(&mut self) {
        self.selection.clear();
        self.connection_mode = false;
        self.connection_start = None;
        self.lasso_mode = false;
        self.drawing_mode = false;
        self.gesture = Gesture::Idle;
        self.guides.clear();
    }

    // -- Board navigation --

    /// Open the child board behind a portal item.
    pub fn open_board(&mut self, portal_id: ItemId) {
        let Some(target) = self
            .boards
            .current_board()
            .item(portal_id)
            .and_then(|i| i.linked_board_id)
        else {
            return;
        };
        self.navigate_to_board(target);
    }

    pub fn navigate_to_board(&mut self, board_id: BoardId) {
        self.boards.set_current_board(board_id);
        self.selection.clear();
        self.gesture = Gesture::Idle;
    }

    pub fn breadcrumbs(&self) -> Vec<(BoardId, String)> {
        self.boards.breadcrumbs()
    }

    // -- Viewport commands --

    pub fn wheel_zoom(&mut self, cursor: Point, zoom_in: bool) {
        self.viewport.wheel_zoom(cursor, zoom_in);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn arrow_pan(&mut self, direction: PanDirection, fast: bool) {
        self.viewport.arrow_pan(direction, fast);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    // -- Pointer machine --

    /// Pointer-down on an item. In connection mode this advances the
    /// connect flow; otherwise it updates the selection and starts a drag
    /// of the resulting set (containers sweep their children along).
    pub fn item_pointer_down(&mut self, id: ItemId, screen: Point, shift: bool) {
        if self.connection_mode {
            self.connect(id);
            return;
        }

        if shift {
            self.selection.select(id, true);
        } else if !self.selection.is_selected(id) {
            self.selection.select(id, false);
        }

        let seeds = self.selection.ids().to_vec();
        if seeds.is_empty() {
            self.gesture = Gesture::Idle;
            return;
        }

        let items = self.items().to_vec();
        let drag_ids = expand_drag_set(&items, &seeds);
        self.push_history();
        self.gesture = Gesture::DragItems(DragState::new(&items, drag_ids, screen));
    }

    /// Pointer-down on empty canvas. Routes to lasso, drawing, marquee, or
    /// panning by mode and modifier.
    pub fn canvas_pointer_down(&mut self, screen: Point, shift: bool) {
        let world = self.viewport.screen_to_world(screen);

        if self.lasso_mode {
            self.gesture = Gesture::Lasso { path: vec![world] };
            return;
        }
        if self.drawing_mode {
            self.gesture = Gesture::Draw {
                points: vec![world],
            };
            return;
        }
        if self.connection_mode {
            self.connection_mode = false;
            self.connection_start = None;
            return;
        }

        if shift {
            self.gesture = Gesture::Marquee(MarqueeBox::new(world));
        } else {
            self.selection.clear();
            self.gesture = Gesture::Pan { last: screen };
        }
    }

    /// Start a proportional resize of the selection from one of its handles.
    pub fn begin_group_resize(&mut self, handle: ResizeHandle, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        let items = self.items().to_vec();
        if let Some(state) = GroupResizeState::begin(&items, self.selection.ids(), handle, world) {
            self.resize_snapshot = Some(self.boards.boards().clone());
            self.gesture = Gesture::ResizeGroup(state);
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Pan { last } => {
                self.viewport.pan_by(screen - last);
                self.gesture = Gesture::Pan { last: screen };
            }
            Gesture::Marquee(mut marquee) => {
                marquee.current = self.viewport.screen_to_world(screen);
                let hits = marquee_hits(self.items(), marquee.rect());
                self.selection.set(hits);
                self.gesture = Gesture::Marquee(marquee);
            }
            Gesture::Lasso { mut path } => {
                path.push(self.viewport.screen_to_world(screen));
                self.gesture = Gesture::Lasso { path };
            }
            Gesture::Draw { mut points } => {
                points.push(self.viewport.screen_to_world(screen));
                self.gesture = Gesture::Draw { points };
            }
            Gesture::DragItems(drag) => {
                self.move_dragged_items(&drag, screen);
                self.gesture = Gesture::DragItems(drag);
            }
            Gesture::ResizeGroup(resize) => {
                let world = self.viewport.screen_to_world(screen);
                let placements = resize.placements(world);
                let current = self.boards.current_board_id();
                self.boards.update_board(current, |board| {
                    for (id, position, size) in placements {
                        if let Some(item) = board.item_mut(id) {
                            item.position = position;
                            item.width = Some(size.width);
                            item.height = Some(size.height);
                        }
                    }
                });
                self.gesture = Gesture::ResizeGroup(resize);
            }
        }
    }

    fn move_dragged_items(&mut self, drag: &DragState, screen: Point) {
        let delta = drag.world_delta(screen, self.viewport.zoom);

        // Smart guides only apply to single-item drags.
        let mut snap_delta = Vec2::ZERO;
        if drag.item_ids.len() == 1 {
            let id = drag.item_ids[0];
            let active = self.boards.current_board().item(id).cloned();
            if let (Some(active), Some(&initial)) = (active, drag.initial.get(&id)) {
                let raw = initial + delta;
                let others = self.items().to_vec();
                let outcome = snap_position(&active, raw, &others, self.viewport.zoom);
                snap_delta = outcome.position() - raw;
                self.guides = outcome.guides;
            }
            self.multi_drag_ghost.clear();
        } else {
            self.guides.clear();
            self.multi_drag_ghost = drag
                .item_ids
                .iter()
                .filter_map(|id| {
                    let item = self.boards.current_board().item(*id)?;
                    let initial = drag.initial.get(id)?;
                    Some(GhostItem {
                        id: *id,
                        rect: Rect::from_origin_size(*initial + delta, dimensions_of(item)),
                        kind: item.kind,
                    })
                })
                .collect();
        }

        let current = self.boards.current_board_id();
        self.boards.update_board(current, |board| {
            for item in &mut board.items {
                if let Some(&initial) = drag.initial.get(&item.id) {
                    item.position = initial + delta + snap_delta;
                }
            }
        });

        // Drop-target detection under the cursor: board portals first,
        // then kanban columns.
        let world = self.viewport.screen_to_world(screen);
        let hovered = |item: &BoardItem| {
            let dims = dimensions_of(item);
            world.x > item.position.x
                && world.x < item.position.x + dims.width
                && world.y > item.position.y
                && world.y < item.position.y + dims.height
        };

        self.drag_over_board = self
            .items()
            .iter()
            .filter(|i| i.kind == ItemType::Board && !drag.item_ids.contains(&i.id))
            .find(|i| hovered(i))
            .map(|i| i.id);
        self.drag_over_kanban = if self.drag_over_board.is_none() {
            self.items()
                .iter()
                .filter(|i| i.kind == ItemType::Kanban && !drag.item_ids.contains(&i.id))
                .find(|i| hovered(i))
                .map(|i| i.id)
        } else {
            None
        };

        self.kanban_ghost = match (self.drag_over_kanban, drag.item_ids.len()) {
            (Some(column), 1) => {
                kanban_preview(self.boards.current_board(), drag.item_ids[0], column)
            }
            _ => None,
        };
    }

    /// Pointer-up: commit whatever the active gesture was building.
    pub fn pointer_up(&mut self) {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::Idle | Gesture::Pan { .. } | Gesture::Marquee(_) => {}
            Gesture::Lasso { path } => {
                if path.len() > 2 {
                    let hits = lasso_hits(self.items(), &path);
                    self.selection.set(hits);
                    // Lasso is a one-shot tool; a committed path exits the mode.
                    self.lasso_mode = false;
                }
            }
            Gesture::Draw { points } => {
                if points.len() > 1 {
                    self.push_history();
                    let current = self.boards.current_board_id();
                    self.boards.update_board(current, |board| {
                        board.items.push(BoardItem::drawing(points, DRAWING_STROKE));
                    });
                }
            }
            Gesture::ResizeGroup(_) => {
                self.commit_resize();
            }
            Gesture::DragItems(drag) => {
                self.guides.clear();
                self.finish_drag(&drag);
            }
        }
        self.drag_over_board = None;
        self.drag_over_kanban = None;
        self.kanban_ghost = None;
        self.multi_drag_ghost.clear();
    }

    fn finish_drag(&mut self, drag: &DragState) {
        if let Some(portal_id) = self.drag_over_board {
            // Only single items transfer into another board.
            if drag.item_ids.len() == 1 {
                let target = self
                    .boards
                    .current_board()
                    .item(portal_id)
                    .and_then(|i| i.linked_board_id);
                if let Some(target) = target {
                    self.boards.move_items_to_board(target, &drag.item_ids);
                    self.selection.clear();
                }
            }
            return;
        }

        if let Some(column_id) = self.drag_over_kanban {
            let has_container = drag.item_ids.iter().any(|id| {
                self.boards
                    .current_board()
                    .item(*id)
                    .is_some_and(|i| matches!(i.kind, ItemType::Container | ItemType::Kanban))
            });
            if !has_container {
                let current = self.boards.current_board_id();
                if let Some(board) = self.boards.board_mut(current) {
                    for &id in &drag.item_ids {
                        snap_into_column(board, id, column_id);
                    }
                }
            }
        }
    }

    // -- Persistence --

    pub fn save_to(&self, storage: &dyn Storage, id: &str) -> StorageResult<()> {
        storage.save(id, &self.boards)
    }

    /// Replace all engine state with a stored workspace.
    pub fn load_from(&mut self, storage: &dyn Storage, id: &str) -> StorageResult<()> {
        let boards = storage.load(id)?;
        self.boards = boards;
        self.history.clear();
        self.selection.clear();
        self.gesture = Gesture::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    fn engine() -> BoardEngine {
        BoardEngine::with_history(History::with_debounce(Duration::ZERO))
    }

    fn note_at(engine: &mut BoardEngine, x: f64, y: f64) -> ItemId {
        let id = engine.add_item(ItemType::Note, "", Vec2::ZERO);
        let current = engine.boards.current_board_id();
        engine.boards.update_board(current, |board| {
            board.item_mut(id).unwrap().position = Point::new(x, y);
        });
        id
    }

    fn position_of(engine: &BoardEngine, id: ItemId) -> Point {
        engine.boards.current_board().item(id).unwrap().position
    }

    #[test]
    fn test_add_item_lands_at_viewport_center() {
        let mut engine = engine();
        let id = engine.add_item(ItemType::Note, "hi", Vec2::ZERO);
        let expected = engine.viewport_center();
        assert_eq!(position_of(&engine, id), expected);
        assert!(engine.selection.is_selected(id));
    }

    #[test]
    fn test_add_board_creates_child_board() {
        let mut engine = engine();
        let id = engine.add_item(ItemType::Board, "Project", Vec2::ZERO);
        let linked = engine
            .boards
            .current_board()
            .item(id)
            .unwrap()
            .linked_board_id
            .unwrap();
        assert_eq!(engine.boards.board(linked).unwrap().title, "Project");

        engine.open_board(id);
        assert_eq!(engine.boards.current_board_id(), linked);
        assert_eq!(engine.breadcrumbs().len(), 2);
    }

    #[test]
    fn test_drag_moves_item_with_zoom() {
        let mut engine = engine();
        let id = note_at(&mut engine, 0.0, 0.0);

        engine.item_pointer_down(id, Point::new(10.0, 10.0), false);
        engine.pointer_move(Point::new(110.0, 60.0));
        engine.pointer_up();

        assert_eq!(position_of(&engine, id), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_single_drag_snaps_to_neighbor_edge() {
        let mut engine = engine();
        let _anchor = note_at(&mut engine, 0.0, 0.0);
        let id = note_at(&mut engine, 400.0, 500.0);

        engine.item_pointer_down(id, Point::ZERO, false);
        // Raw target 243, within threshold of the anchor's right edge at 240.
        engine.pointer_move(Point::new(-157.0, 0.0));

        assert_eq!(position_of(&engine, id).x, 240.0);
        assert!(!engine.guides().is_empty());

        engine.pointer_up();
        assert!(engine.guides().is_empty());
    }

    #[test]
    fn test_marquee_selects_and_recomputes() {
        let mut engine = engine();
        let a = note_at(&mut engine, 0.0, 0.0);
        let b = note_at(&mut engine, 1000.0, 1000.0);
        engine.escape();

        engine.canvas_pointer_down(Point::new(-10.0, -10.0), true);
        engine.pointer_move(Point::new(1500.0, 1500.0));
        assert!(engine.selection.is_selected(a) && engine.selection.is_selected(b));

        engine.pointer_move(Point::new(100.0, 100.0));
        assert!(engine.selection.is_selected(a));
        assert!(!engine.selection.is_selected(b));
        engine.pointer_up();
    }

    #[test]
    fn test_plain_canvas_click_clears_selection_and_pans() {
        let mut engine = engine();
        let id = note_at(&mut engine, 0.0, 0.0);
        engine.selection.select(id, false);

        engine.canvas_pointer_down(Point::new(50.0, 50.0), false);
        assert!(engine.selection.is_empty());

        engine.pointer_move(Point::new(80.0, 40.0));
        assert_eq!(engine.viewport().pan, Vec2::new(30.0, -10.0));
        engine.pointer_up();
    }

    #[test]
    fn test_lasso_selects_enclosed_centers() {
        let mut engine = engine();
        let inside = note_at(&mut engine, 0.0, 0.0);
        let outside = note_at(&mut engine, 900.0, 900.0);
        engine.escape();
        engine.set_lasso_mode(true);

        engine.canvas_pointer_down(Point::new(-50.0, -50.0), false);
        engine.pointer_move(Point::new(500.0, -50.0));
        engine.pointer_move(Point::new(500.0, 500.0));
        engine.pointer_move(Point::new(-50.0, 500.0));
        engine.pointer_up();

        assert!(engine.selection.is_selected(inside));
        assert!(!engine.selection.is_selected(outside));

        // A committed lasso exits the mode: the next empty-canvas press pans.
        engine.canvas_pointer_down(Point::new(600.0, 600.0), false);
        assert!(matches!(engine.gesture, Gesture::Pan { .. }));
        engine.pointer_up();
    }

    #[test]
    fn test_escape_exits_canvas_modes() {
        let mut engine = engine();
        engine.set_lasso_mode(true);
        engine.set_drawing_mode(true);
        engine.escape();

        engine.canvas_pointer_down(Point::new(0.0, 0.0), false);
        assert!(matches!(engine.gesture, Gesture::Pan { .. }));
    }

    #[test]
    fn test_drawing_gesture_creates_stroke() {
        let mut engine = engine();
        engine.set_drawing_mode(true);
        engine.canvas_pointer_down(Point::new(10.0, 10.0), false);
        engine.pointer_move(Point::new(40.0, 40.0));
        engine.pointer_move(Point::new(90.0, 20.0));
        engine.pointer_up();

        let drawing = engine
            .items()
            .iter()
            .find(|i| i.kind == ItemType::Drawing)
            .unwrap();
        assert_eq!(drawing.position, Point::new(10.0, 10.0));
        assert_eq!(drawing.points.as_ref().unwrap().len(), 3);
        assert_eq!(drawing.stroke_color.as_deref(), Some(DRAWING_STROKE));
    }

    #[test]
    fn test_drop_on_kanban_snaps_into_column() {
        let mut engine = engine();
        let column = engine.add_item(ItemType::Kanban, "To Do", Vec2::ZERO);
        let card = note_at(&mut engine, 2000.0, 2000.0);
        let current = engine.boards.current_board_id();
        engine.boards.update_board(current, |board| {
            board.item_mut(column).unwrap().position = Point::ZERO;
        });

        engine.item_pointer_down(card, Point::new(0.0, 0.0), false);
        // Land the cursor inside the column.
        let target_screen = engine.viewport().world_to_screen(Point::new(150.0, 200.0));
        let delta = target_screen - Point::new(0.0, 0.0);
        engine.pointer_move(Point::new(delta.x, delta.y));
        assert_eq!(engine.drag_over_kanban(), Some(column));
        assert!(engine.kanban_ghost().is_some());

        engine.pointer_up();
        let snapped = position_of(&engine, card);
        // Centered in the 300-wide column, stacked below the header.
        assert_eq!(snapped, Point::new(30.0, 60.0));
        assert_eq!(engine.drag_over_kanban(), None);
    }

    #[test]
    fn test_single_item_transfers_through_portal() {
        let mut engine = engine();
        let portal = engine.add_item(ItemType::Board, "Sub", Vec2::ZERO);
        let child_board = engine
            .boards
            .current_board()
            .item(portal)
            .unwrap()
            .linked_board_id
            .unwrap();
        let current = engine.boards.current_board_id();
        engine.boards.update_board(current, |board| {
            board.item_mut(portal).unwrap().position = Point::ZERO;
        });
        let item = note_at(&mut engine, 2000.0, 2000.0);

        engine.item_pointer_down(item, Point::ZERO, false);
        let target_screen = engine.viewport().world_to_screen(Point::new(100.0, 80.0));
        engine.pointer_move(Point::new(target_screen.x, target_screen.y));
        assert_eq!(engine.drag_over_board(), Some(portal));
        engine.pointer_up();

        assert!(engine.boards.current_board().item(item).is_none());
        let moved = engine.boards.board(child_board).unwrap().item(item).unwrap();
        assert_eq!(moved.position, Point::ZERO);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut engine = engine();
        let id = engine.add_item(ItemType::Note, "one", Vec2::ZERO);
        assert!(engine.can_undo());

        engine.undo();
        assert!(engine.boards.current_board().item(id).is_none());
        assert!(engine.selection.is_empty());

        engine.redo();
        assert!(engine.boards.current_board().item(id).is_some());
    }

    #[test]
    fn test_group_resize_commits_one_history_entry() {
        let mut engine = engine();
        let id = note_at(&mut engine, 0.0, 0.0);
        engine.selection.select(id, false);
        let history_before = engine.history.can_undo();
        assert!(history_before);

        engine.begin_group_resize(ResizeHandle::Se, Point::new(240.0, 200.0));
        engine.pointer_move(Point::new(480.0, 400.0));
        engine.pointer_move(Point::new(360.0, 300.0));
        engine.pointer_up();

        let item = engine.boards.current_board().item(id).unwrap();
        assert_eq!(item.width, Some(360.0));
        assert_eq!(item.height, Some(300.0));

        engine.undo();
        let item = engine.boards.current_board().item(id).unwrap();
        assert_eq!(item.width, Some(240.0));
        assert_eq!(item.height, Some(200.0));
    }

    #[test]
    fn test_duplicate_offsets_and_selects_clones() {
        let mut engine = engine();
        let id = engine.add_item(ItemType::Todo, "Tasks", Vec2::ZERO);
        let original_pos = position_of(&engine, id);
        engine.duplicate_selected();

        assert_eq!(engine.items().len(), 2);
        let clone_id = engine.selection.active().unwrap();
        assert_ne!(clone_id, id);
        assert_eq!(
            position_of(&engine, clone_id),
            original_pos + Vec2::new(30.0, 30.0)
        );

        let original_todo = engine.boards.current_board().item(id).unwrap().todos.clone();
        let clone_todo = engine
            .boards
            .current_board()
            .item(clone_id)
            .unwrap()
            .todos
            .clone();
        assert_ne!(original_todo.unwrap()[0].id, clone_todo.unwrap()[0].id);
    }

    #[test]
    fn test_tidy_up_row_layout() {
        let mut engine = engine();
        let a = note_at(&mut engine, 500.0, 40.0);
        let b = note_at(&mut engine, 100.0, 10.0);
        engine.selection.set(vec![a, b]);

        engine.tidy_up(TidyLayout::Row);
        // Sorted by x, anchored at (100, 10), pitch 240 + 24.
        assert_eq!(position_of(&engine, b), Point::new(100.0, 10.0));
        assert_eq!(position_of(&engine, a), Point::new(364.0, 10.0));
    }

    #[test]
    fn test_content_change_syncs_portal_board_title() {
        let mut engine = engine();
        let portal = engine.add_item(ItemType::Board, "Old", Vec2::ZERO);
        let linked = engine
            .boards
            .current_board()
            .item(portal)
            .unwrap()
            .linked_board_id
            .unwrap();

        engine.set_content(portal, "New <b>Name</b>");
        assert_eq!(engine.boards.board(linked).unwrap().title, "New Name");
        assert_eq!(
            engine.boards.current_board().item(portal).unwrap().content,
            "New Name"
        );
    }

    #[test]
    fn test_connection_flow() {
        let mut engine = engine();
        let a = note_at(&mut engine, 0.0, 0.0);
        let b = note_at(&mut engine, 500.0, 0.0);

        engine.toggle_connection_mode();
        engine.item_pointer_down(a, Point::ZERO, false);
        engine.item_pointer_down(b, Point::ZERO, false);

        assert!(!engine.connection_mode());
        let connections = &engine.boards.current_board().connections;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from_id, a);
        assert_eq!(connections[0].to_id, b);
    }

    #[test]
    fn test_invalid_link_rejected() {
        let mut engine = engine();
        assert!(engine.add_link("definitely not a url").is_none());
        assert!(engine.items().is_empty());

        let id = engine.add_link("www.example.com").unwrap();
        let item = engine.boards.current_board().item(id).unwrap();
        assert!(item.loading);
        assert!(item.content.starts_with("https://"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let storage = MemoryStorage::new();
        let mut engine = engine();
        let id = engine.add_item(ItemType::Note, "persisted", Vec2::ZERO);
        engine.save_to(&storage, "main").unwrap();

        let mut restored = BoardEngine::new();
        restored.load_from(&storage, "main").unwrap();
        assert!(restored.boards.current_board().item(id).is_some());
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_escape_clears_transient_state() {
        let mut engine = engine();
        let id = note_at(&mut engine, 0.0, 0.0);
        engine.selection.select(id, false);
        engine.toggle_connection_mode();

        engine.escape();
        assert!(engine.selection.is_empty());
        assert!(!engine.connection_mode());
        assert!(engine.gesture().is_idle());
    }
}
