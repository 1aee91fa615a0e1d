//! Command palette: named actions dispatched against the engine.

use crate::engine::{BoardEngine, TidyLayout};
use crate::item::ItemType;
use crate::template::builtin_templates;
use crate::viewport::PanDirection;
use kurbo::Vec2;

/// Everything the palette (or a keyboard shortcut) can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddNote,
    AddTodoList,
    AddContainer,
    AddKanban,
    AddBoard,
    ToggleConnectionMode,
    DeleteSelected,
    DuplicateSelected,
    SelectAll,
    InvertSelection,
    SelectSimilar,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ResetView,
    Pan(PanDirection, bool),
    TidyUp(TidyLayout),
    MindMapRoot,
    ApplyTemplate(String),
    Escape,
}

/// A palette entry: a stable id, a label for display, and the action.
#[derive(Debug, Clone)]
pub struct Command {
    pub id: &'static str,
    pub label: String,
    pub action: Action,
}

impl Command {
    fn new(id: &'static str, label: &str, action: Action) -> Self {
        Self {
            id,
            label: label.to_string(),
            action,
        }
    }
}

/// The built-in command list, templates included.
pub fn default_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::new("add-note", "Add Note", Action::AddNote),
        Command::new("add-todo", "Add To-do List", Action::AddTodoList),
        Command::new("add-container", "Add Container", Action::AddContainer),
        Command::new("add-kanban", "Add Kanban Column", Action::AddKanban),
        Command::new("add-board", "Add Board", Action::AddBoard),
        Command::new("connect", "Connect Items", Action::ToggleConnectionMode),
        Command::new("delete", "Delete Selection", Action::DeleteSelected),
        Command::new("duplicate", "Duplicate Selection", Action::DuplicateSelected),
        Command::new("select-all", "Select All", Action::SelectAll),
        Command::new("invert-selection", "Invert Selection", Action::InvertSelection),
        Command::new("select-similar", "Select Similar", Action::SelectSimilar),
        Command::new("undo", "Undo", Action::Undo),
        Command::new("redo", "Redo", Action::Redo),
        Command::new("zoom-in", "Zoom In", Action::ZoomIn),
        Command::new("zoom-out", "Zoom Out", Action::ZoomOut),
        Command::new("reset-view", "Reset View", Action::ResetView),
        Command::new("tidy-grid", "Tidy Up as Grid", Action::TidyUp(TidyLayout::Grid)),
        Command::new("tidy-row", "Tidy Up as Row", Action::TidyUp(TidyLayout::Row)),
        Command::new("tidy-column", "Tidy Up as Column", Action::TidyUp(TidyLayout::Column)),
        Command::new("mindmap", "Start Mind Map", Action::MindMapRoot),
    ];
    for template in builtin_templates() {
        commands.push(Command::new(
            "template",
            &format!("Template: {}", template.name),
            Action::ApplyTemplate(template.id.to_string()),
        ));
    }
    commands
}

/// Run one action against the engine.
pub fn dispatch(engine: &mut BoardEngine, action: &Action) {
    match action {
        Action::AddNote => {
            engine.add_item(ItemType::Note, "", Vec2::ZERO);
        }
        Action::AddTodoList => {
            engine.add_item(ItemType::Todo, "My Tasks", Vec2::ZERO);
        }
        Action::AddContainer => {
            engine.add_item(ItemType::Container, "New Group", Vec2::ZERO);
        }
        Action::AddKanban => {
            engine.add_item(ItemType::Kanban, "To Do", Vec2::ZERO);
        }
        Action::AddBoard => {
            engine.add_item(ItemType::Board, "New Project", Vec2::ZERO);
        }
        Action::ToggleConnectionMode => engine.toggle_connection_mode(),
        Action::DeleteSelected => engine.delete_selected(),
        Action::DuplicateSelected => engine.duplicate_selected(),
        Action::SelectAll => engine.select_all(),
        Action::InvertSelection => engine.invert_selection(),
        Action::SelectSimilar => engine.select_similar(),
        Action::Undo => engine.undo(),
        Action::Redo => engine.redo(),
        Action::ZoomIn => engine.zoom_in(),
        Action::ZoomOut => engine.zoom_out(),
        Action::ResetView => engine.reset_view(),
        Action::Pan(direction, fast) => engine.arrow_pan(*direction, *fast),
        Action::TidyUp(layout) => engine.tidy_up(*layout),
        Action::MindMapRoot => {
            engine.mindmap_create_root();
        }
        Action::ApplyTemplate(id) => {
            if let Some(template) = builtin_templates().into_iter().find(|t| t.id == *id) {
                engine.apply_template(&template);
            }
        }
        Action::Escape => engine.escape(),
    }
}
