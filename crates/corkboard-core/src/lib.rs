//! Corkboard Core Library
//!
//! Platform-agnostic state and interaction engine for an infinite-canvas
//! corkboard: items and boards, selection, smart guides, kanban and
//! container layout, mind maps, snapshot history, and persistence.

pub mod board;
pub mod collab;
pub mod command;
pub mod containment;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod guides;
pub mod history;
pub mod item;
pub mod mindmap;
pub mod selection;
pub mod storage;
pub mod template;
pub mod viewport;

pub use board::{BoardData, BoardId, BoardMap, BoardSet, Connection, ConnectionId};
pub use command::{default_commands, dispatch, Action, Command};
pub use engine::{BoardEngine, TidyLayout};
pub use gesture::{Gesture, GhostItem, ResizeHandle};
pub use guides::{snap_position, GuideOrientation, Guideline, SnapOutcome, SNAP_THRESHOLD};
pub use history::History;
pub use item::{BoardItem, ItemId, ItemStyle, ItemType, LayoutMode, Todo};
pub use selection::{MarqueeBox, Selection};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use viewport::{PanDirection, Viewport};
