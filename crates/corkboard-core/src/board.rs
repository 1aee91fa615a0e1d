//! Board repository: boards, their items, and the connections between items.

use crate::item::{BoardItem, ItemId, ItemType};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unique identifier for a board.
pub type BoardId = Uuid;

/// Unique identifier for a connection.
pub type ConnectionId = Uuid;

/// A directed link between two items on the same board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_id: ItemId,
    pub to_id: ItemId,
}

impl Connection {
    pub fn new(from_id: ItemId, to_id: ItemId) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_id,
            to_id,
        }
    }
}

/// A single board: a flat list of items plus their connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardData {
    pub id: BoardId,
    pub title: String,
    pub items: Vec<BoardItem>,
    pub connections: Vec<Connection>,
    /// Parent board for hierarchy navigation; `None` for the root.
    pub parent_id: Option<BoardId>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl BoardData {
    pub fn new(title: impl Into<String>, parent_id: Option<BoardId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            items: Vec::new(),
            connections: Vec::new(),
            parent_id,
            created_at: now_millis(),
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut BoardItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn add_item(&mut self, item: BoardItem) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Remove the given items and prune connections that touch them.
    pub fn remove_items(&mut self, ids: &[ItemId]) {
        self.items.retain(|i| !ids.contains(&i.id));
        self.connections
            .retain(|c| !ids.contains(&c.from_id) && !ids.contains(&c.to_id));
    }

    /// Add a connection unless one already joins the pair in either direction.
    /// Returns false if the connection was rejected as a duplicate.
    pub fn add_connection(&mut self, from_id: ItemId, to_id: ItemId) -> bool {
        let exists = self.connections.iter().any(|c| {
            (c.from_id == from_id && c.to_id == to_id)
                || (c.from_id == to_id && c.to_id == from_id)
        });
        if exists {
            return false;
        }
        self.connections.push(Connection::new(from_id, to_id));
        true
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// All boards of a workspace keyed by id.
pub type BoardMap = HashMap<BoardId, BoardData>;

/// The board repository: every board in the workspace plus the one
/// currently open. All lookups by stale id are silent no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSet {
    boards: BoardMap,
    current_board_id: BoardId,
}

impl Default for BoardSet {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardSet {
    /// Create a board set with a single empty root board titled "Home".
    pub fn new() -> Self {
        let root = BoardData::new("Home", None);
        let root_id = root.id;
        let mut boards = HashMap::new();
        boards.insert(root_id, root);
        Self {
            boards,
            current_board_id: root_id,
        }
    }

    pub fn boards(&self) -> &BoardMap {
        &self.boards
    }

    pub fn current_board_id(&self) -> BoardId {
        self.current_board_id
    }

    /// The root board (the one without a parent).
    pub fn root_board_id(&self) -> Option<BoardId> {
        self.boards
            .values()
            .find(|b| b.parent_id.is_none())
            .map(|b| b.id)
    }

    pub fn board(&self, id: BoardId) -> Option<&BoardData> {
        self.boards.get(&id)
    }

    pub fn board_mut(&mut self, id: BoardId) -> Option<&mut BoardData> {
        self.boards.get_mut(&id)
    }

    /// The currently open board. Falls back to an arbitrary board if the
    /// current id went stale, so callers never observe a missing board.
    pub fn current_board(&self) -> &BoardData {
        self.boards
            .get(&self.current_board_id)
            .or_else(|| self.boards.values().next())
            .expect("board set always holds at least one board")
    }

    pub fn current_board_mut(&mut self) -> &mut BoardData {
        let id = if self.boards.contains_key(&self.current_board_id) {
            self.current_board_id
        } else {
            *self
                .boards
                .keys()
                .next()
                .expect("board set always holds at least one board")
        };
        self.boards.get_mut(&id).unwrap()
    }

    /// Switch to another board if it exists.
    pub fn set_current_board(&mut self, id: BoardId) {
        if self.boards.contains_key(&id) {
            self.current_board_id = id;
        } else {
            log::warn!("ignoring navigation to unknown board {id}");
        }
    }

    /// Apply `updater` to a board; does nothing if the id is unknown.
    pub fn update_board(&mut self, id: BoardId, updater: impl FnOnce(&mut BoardData)) {
        if let Some(board) = self.boards.get_mut(&id) {
            updater(board);
        }
    }

    /// Replace the whole board map, e.g. when restoring a history snapshot.
    pub fn set_boards(&mut self, boards: BoardMap) {
        if boards.is_empty() {
            log::warn!("refusing to replace boards with an empty map");
            return;
        }
        self.boards = boards;
        if !self.boards.contains_key(&self.current_board_id) {
            self.current_board_id = *self.boards.keys().next().unwrap();
        }
    }

    /// Create a nested board and return its id.
    pub fn add_board(&mut self, title: impl Into<String>, parent_id: BoardId) -> BoardId {
        let board = BoardData::new(title, Some(parent_id));
        let id = board.id;
        self.boards.insert(id, board);
        id
    }

    /// Every board reachable through portal items of `board_id`, depth first.
    pub fn collect_child_board_ids(&self, board_id: BoardId) -> Vec<BoardId> {
        let mut result = Vec::new();
        let Some(board) = self.boards.get(&board_id) else {
            return result;
        };
        for item in &board.items {
            if item.kind == ItemType::Board {
                if let Some(child_id) = item.linked_board_id {
                    result.push(child_id);
                    result.extend(self.collect_child_board_ids(child_id));
                }
            }
        }
        result
    }

    /// Delete items from a board. Portal items take their linked board and
    /// its whole subtree with them; connections touching deleted items are
    /// pruned.
    pub fn delete_items(&mut self, board_id: BoardId, ids: &[ItemId]) {
        let Some(board) = self.boards.get(&board_id) else {
            return;
        };

        let mut boards_to_delete = Vec::new();
        for item in board.items.iter().filter(|i| ids.contains(&i.id)) {
            if item.kind == ItemType::Board {
                if let Some(linked) = item.linked_board_id {
                    boards_to_delete.push(linked);
                    boards_to_delete.extend(self.collect_child_board_ids(linked));
                }
            }
        }

        if let Some(board) = self.boards.get_mut(&board_id) {
            board.remove_items(ids);
        }
        for bid in boards_to_delete {
            self.boards.remove(&bid);
        }
        if !self.boards.contains_key(&self.current_board_id) {
            if let Some(root) = self.root_board_id() {
                self.current_board_id = root;
            }
        }
    }

    /// Move items from the current board onto another board.
    ///
    /// Moved items land at the target origin; connections they had on the
    /// source board are dropped. No-op if the target board does not exist.
    pub fn move_items_to_board(&mut self, target_board_id: BoardId, ids: &[ItemId]) {
        if !self.boards.contains_key(&target_board_id) {
            return;
        }
        let source_id = self.current_board_id;
        if source_id == target_board_id {
            return;
        }

        let Some(source) = self.boards.get_mut(&source_id) else {
            return;
        };
        let mut moved: Vec<BoardItem> = Vec::new();
        source.items.retain(|i| {
            if ids.contains(&i.id) {
                moved.push(i.clone());
                false
            } else {
                true
            }
        });
        source
            .connections
            .retain(|c| !ids.contains(&c.from_id) && !ids.contains(&c.to_id));

        let target = self.boards.get_mut(&target_board_id).unwrap();
        for mut item in moved {
            item.position = Point::ZERO;
            target.items.push(item);
        }
    }

    /// The chain of boards from the root to the current board.
    pub fn breadcrumbs(&self) -> Vec<(BoardId, String)> {
        let mut trail = Vec::new();
        let mut cursor = Some(self.current_board_id);
        // Hop guard in case a stale parent pointer forms a cycle.
        let mut hops = 0;
        while let Some(id) = cursor {
            let Some(board) = self.boards.get(&id) else {
                break;
            };
            trail.push((board.id, board.title.clone()));
            cursor = board.parent_id;
            hops += 1;
            if hops > 50 {
                break;
            }
        }
        trail.reverse();
        trail
    }
}
