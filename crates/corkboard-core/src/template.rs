//! Board templates and the grid flow that lays them out.

use crate::board::BoardData;
use crate::item::{BoardItem, FontSize, FontWeight, ItemStyle, ItemType, TextAlign};
use kurbo::Point;

/// Gap between template items in the flow grid.
pub const TEMPLATE_PADDING: f64 = 20.0;
/// Items per row before the flow wraps.
pub const TEMPLATE_COLUMNS: usize = 3;

/// One item of a template, before it gets an id and a position.
#[derive(Debug, Clone)]
pub struct TemplateItem {
    pub kind: ItemType,
    pub content: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<String>,
    pub style: Option<ItemStyle>,
}

impl TemplateItem {
    fn new(kind: ItemType, content: &str) -> Self {
        Self {
            kind,
            content: content.to_string(),
            width: None,
            height: None,
            color: None,
            style: None,
        }
    }

    fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    fn styled(mut self, style: ItemStyle) -> Self {
        self.style = Some(style);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub items: Vec<TemplateItem>,
}

/// The built-in template catalog.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            id: "kanban-basic",
            name: "Basic Kanban Board",
            description: "A simple To Do, In Progress, and Done setup.",
            items: vec![
                TemplateItem::new(ItemType::Kanban, "To Do").sized(300.0, 500.0),
                TemplateItem::new(ItemType::Kanban, "In Progress").sized(300.0, 500.0),
                TemplateItem::new(ItemType::Kanban, "Done").sized(300.0, 500.0),
            ],
        },
        Template {
            id: "brainstorm-web",
            name: "Web Project Brainstorm",
            description: "A starting point for brainstorming a new web project.",
            items: vec![
                TemplateItem::new(ItemType::Note, "# Project Goals")
                    .sized(300.0, 200.0)
                    .colored("#DBEAFE")
                    .styled(ItemStyle::new(
                        FontSize::Lg,
                        FontWeight::Bold,
                        TextAlign::Center,
                    )),
                TemplateItem::new(ItemType::Container, "User Personas")
                    .sized(400.0, 400.0)
                    .colored("#F3E8FF"),
                TemplateItem::new(ItemType::Todo, "Key Features").sized(280.0, 300.0),
                TemplateItem::new(
                    ItemType::Note,
                    "## Tech Stack\n- Frontend: \n- Backend: \n- Database: ",
                )
                .sized(240.0, 200.0)
                .colored("#D1FAE5"),
            ],
        },
        Template {
            id: "swot-analysis",
            name: "SWOT Analysis",
            description: "Strengths, Weaknesses, Opportunities, Threats.",
            items: vec![
                TemplateItem::new(ItemType::Note, "## Strengths\n- ")
                    .sized(250.0, 250.0)
                    .colored("#D1FAE5"),
                TemplateItem::new(ItemType::Note, "## Weaknesses\n- ")
                    .sized(250.0, 250.0)
                    .colored("#FEE2E2"),
                TemplateItem::new(ItemType::Note, "## Opportunities\n- ")
                    .sized(250.0, 250.0)
                    .colored("#DBEAFE"),
                TemplateItem::new(ItemType::Note, "## Threats\n- ")
                    .sized(250.0, 250.0)
                    .colored("#FEF3C7"),
            ],
        },
    ]
}

/// Replace the board's contents with the template, flowed into a grid of
/// [`TEMPLATE_COLUMNS`] columns. Each row is as tall as its tallest item.
/// Existing items and connections are discarded.
pub fn apply_template(board: &mut BoardData, template: &Template) {
    let mut items = Vec::with_capacity(template.items.len());
    let mut current_x = 0.0;
    let mut current_y = 0.0;
    let mut max_row_height = 0.0f64;

    for (index, entry) in template.items.iter().enumerate() {
        let width = entry.width.unwrap_or(240.0);
        let height = entry.height.unwrap_or(200.0);

        if index > 0 && index % TEMPLATE_COLUMNS == 0 {
            current_x = 0.0;
            current_y += max_row_height + TEMPLATE_PADDING;
            max_row_height = 0.0;
        }

        let mut item = BoardItem::new(entry.kind, Point::new(current_x, current_y), &entry.content);
        item.width = Some(width);
        item.height = Some(height);
        if let Some(color) = &entry.color {
            item.color = Some(color.clone());
        }
        if entry.style.is_some() {
            item.style = entry.style.clone();
        }
        items.push(item);

        current_x += width + TEMPLATE_PADDING;
        max_row_height = max_row_height.max(height);
    }

    board.items = items;
    board.connections.clear();
}
