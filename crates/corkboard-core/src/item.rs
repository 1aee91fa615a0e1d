//! Board item model: the things that live on a board.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a board item.
pub type ItemId = Uuid;

/// The kind of content an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Note,
    Image,
    Todo,
    Container,
    Link,
    /// Portal to a nested board.
    Board,
    /// Single color swatch.
    Swatch,
    /// Kanban column.
    Kanban,
    /// Freehand drawing path.
    Drawing,
    Comment,
}

/// Layout mode for container items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Free,
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
    #[serde(rename = "2xl")]
    Xxl,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Light,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Typography and visual styling for an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    pub font_size: FontSize,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl ItemStyle {
    pub fn new(font_size: FontSize, font_weight: FontWeight, text_align: TextAlign) -> Self {
        Self {
            font_size,
            font_weight,
            text_align,
            ..Self::default()
        }
    }
}

/// A single checklist entry on a todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            done: false,
        }
    }
}

/// Named default item colors.
pub mod colors {
    pub const WHITE: &str = "#FFFFFF";
    pub const GRAY: &str = "#F3F4F6";
    pub const YELLOW: &str = "#FEF3C7";
    pub const GREEN: &str = "#D1FAE5";
    pub const BLUE: &str = "#DBEAFE";
    pub const RED: &str = "#FEE2E2";
    pub const PURPLE: &str = "#F3E8FF";
    pub const DARK: &str = "#1F2937";
}

/// An item placed on a board.
///
/// `position` is the top-left corner in world coordinates. `width` and
/// `height` are explicit overrides; when absent the type's defaults apply
/// (see [`crate::geometry::dimensions_of`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub position: Point,
    /// Text content, image data URL, container title, link URL, or board title.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<Todo>>,

    // Link preview fields, filled in asynchronously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default)]
    pub loading: bool,

    /// Child board this portal item opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_board_id: Option<Uuid>,

    // Container fields.
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(default)]
    pub layout_mode: LayoutMode,
    #[serde(default)]
    pub auto_resize: bool,
    #[serde(default)]
    pub locked: bool,

    /// HEX value for swatch items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swatch_color: Option<String>,

    // Drawing fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,

    /// Explicit stacking override; absent means type-based default order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ItemStyle>,
}

impl BoardItem {
    /// Create an item with the creation-time defaults for its type.
    pub fn new(kind: ItemType, position: Point, content: impl Into<String>) -> Self {
        let (width, height) = match kind {
            ItemType::Todo => (280.0, 300.0),
            ItemType::Container => (500.0, 400.0),
            ItemType::Kanban => (300.0, 500.0),
            ItemType::Link => (300.0, 280.0),
            ItemType::Swatch => (80.0, 90.0),
            ItemType::Board => (200.0, 160.0),
            _ => (240.0, 200.0),
        };

        let style = if kind == ItemType::Board {
            ItemStyle::new(FontSize::Md, FontWeight::Bold, TextAlign::Center)
        } else {
            ItemStyle::default()
        };

        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            content: content.into(),
            color: Some(colors::WHITE.to_string()),
            width: Some(width),
            height: Some(height),
            todos: (kind == ItemType::Todo).then(|| vec![Todo::new("")]),
            title: None,
            description: None,
            image_url: None,
            favicon_url: None,
            site_name: None,
            loading: kind == ItemType::Link,
            linked_board_id: None,
            collapsed: false,
            padding: None,
            gap: None,
            layout_mode: LayoutMode::Free,
            auto_resize: false,
            locked: false,
            swatch_color: None,
            points: None,
            stroke_color: None,
            z_index: None,
            style: Some(style),
        }
    }

    /// Create a freehand drawing anchored at the first point of the path.
    pub fn drawing(points: Vec<Point>, stroke_color: impl Into<String>) -> Self {
        let anchor = points.first().copied().unwrap_or(Point::ZERO);
        let mut item = Self::new(ItemType::Drawing, anchor, "");
        item.width = None;
        item.height = None;
        item.points = Some(points);
        item.stroke_color = Some(stroke_color.into());
        item.style = None;
        item
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, style: ItemStyle) -> Self {
        self.style = Some(style);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_defaults() {
        let note = BoardItem::new(ItemType::Note, Point::new(10.0, 20.0), "hi");
        assert_eq!(note.width, Some(240.0));
        assert_eq!(note.height, Some(200.0));
        assert!(note.todos.is_none());
        assert!(!note.loading);

        let todo = BoardItem::new(ItemType::Todo, Point::ZERO, "My Tasks");
        assert_eq!(todo.width, Some(280.0));
        assert_eq!(todo.todos.as_ref().map(Vec::len), Some(1));

        let link = BoardItem::new(ItemType::Link, Point::ZERO, "https://example.com");
        assert!(link.loading);

        let kanban = BoardItem::new(ItemType::Kanban, Point::ZERO, "To Do");
        assert_eq!(kanban.height, Some(500.0));
    }

    #[test]
    fn test_serde_round_trip() {
        let item = BoardItem::new(ItemType::Container, Point::new(1.5, -2.0), "Group")
            .with_size(400.0, 300.0);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"CONTAINER\""));
        let back: BoardItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }

    #[test]
    fn test_item_style_serde_names() {
        let style = ItemStyle::new(FontSize::Xxl, FontWeight::Bold, TextAlign::Center);
        let json = serde_json::to_string(&style).unwrap();
        assert!(json.contains("\"2xl\""));
        assert!(json.contains("\"fontWeight\":\"bold\""));
    }

    #[test]
    fn test_drawing_anchor() {
        let points = vec![Point::new(5.0, 6.0), Point::new(7.0, 8.0)];
        let drawing = BoardItem::drawing(points.clone(), "#374151");
        assert_eq!(drawing.position, Point::new(5.0, 6.0));
        assert_eq!(drawing.points.as_deref(), Some(points.as_slice()));
    }
}
