//! External-service seams and asynchronous completion patches.
//!
//! Link previews, idea generation, and palette extraction run outside the
//! engine. Completions come back as [`ItemPatch`] messages that are applied
//! against the current board state; patches for items deleted in the
//! meantime are dropped.

use crate::board::BoardData;
use crate::item::{BoardItem, ItemId, ItemStyle, Todo};
use kurbo::Point;
use thiserror::Error;
use url::Url;

/// Maximum accepted length for item text content.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Width of a generated palette swatch and the gap between swatches.
pub const SWATCH_WIDTH: f64 = 80.0;
pub const SWATCH_GAP: f64 = 12.0;
/// Vertical offset from the source image to the swatch row.
pub const SWATCH_OFFSET: f64 = 20.0;

/// Cell pitch of the generated-ideas grid.
pub const IDEA_COLUMN_WIDTH: f64 = 260.0;
pub const IDEA_ROW_HEIGHT: f64 = 200.0;

/// Metadata scraped for a link card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub favicon_url: Option<String>,
    pub site_name: Option<String>,
}

/// Failure reported by an external collaborator service.
#[derive(Debug, Error)]
pub enum CollabError {
    #[error("image could not be decoded")]
    Decode,
    #[error("service failed: {0}")]
    Service(String),
}

/// Fetches preview metadata for a URL.
pub trait LinkPreview {
    fn fetch(&self, url: &Url) -> Result<LinkMetadata, CollabError>;
}

/// Produces related idea strings for a prompt.
pub trait IdeaGenerator {
    fn generate(&self, prompt: &str) -> Result<Vec<String>, CollabError>;
}

/// Extracts dominant colors from an image.
pub trait PaletteSource {
    fn extract(&self, image_url: &Url) -> Result<Vec<String>, CollabError>;
}

/// Cleans untrusted text before it enters board state.
pub trait Sanitizer {
    fn sanitize_text(&self, text: &str) -> String;
    fn sanitize_url(&self, url: &str) -> Option<String>;
}

/// Default sanitizer: strips markup and control characters from text,
/// normalizes and validates URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSanitizer;

/// Append a markup-free chunk, dropping control characters other than
/// newline and tab.
fn push_text(out: &mut String, chunk: &str) {
    for ch in chunk.chars() {
        if !ch.is_control() || ch == '\n' || ch == '\t' {
            out.push(ch);
        }
    }
}

/// Skip past the closing tag of a script or style element. Without one,
/// the rest of the input is dropped.
fn skip_element_content<'a>(rest: &'a str, name: &str) -> &'a str {
    let close = format!("</{}", name.to_ascii_lowercase());
    let Some(pos) = rest.to_ascii_lowercase().find(&close) else {
        return "";
    };
    match rest[pos..].find('>') {
        Some(end) => &rest[pos + end + 1..],
        None => "",
    }
}

impl Sanitizer for BasicSanitizer {
    /// Strip markup: tags are removed, script and style elements are
    /// removed along with their contents, and control characters are
    /// filtered out. An unclosed `<` drops the rest of the string.
    fn sanitize_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(lt) = rest.find('<') {
            push_text(&mut out, &rest[..lt]);
            let after = &rest[lt + 1..];
            let Some(gt) = after.find('>') else {
                rest = "";
                break;
            };
            let tag = after[..gt].trim_start();
            let is_closing = tag.starts_with('/');
            let name: String = tag
                .trim_start_matches('/')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            rest = &after[gt + 1..];
            if !is_closing
                && (name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style"))
            {
                rest = skip_element_content(rest, &name);
            }
        }
        push_text(&mut out, rest);

        let out = out.trim().to_string();
        if out.len() > MAX_CONTENT_LENGTH {
            let mut truncated = out;
            truncated.truncate(MAX_CONTENT_LENGTH);
            return truncated;
        }
        out
    }

    /// Trim, prefix bare `www.` addresses with `https://`, and reject
    /// anything that does not parse as an http(s) URL.
    fn sanitize_url(&self, url: &str) -> Option<String> {
        let trimmed = url.trim();
        let normalized = if trimmed.starts_with("www.") {
            format!("https://{trimmed}")
        } else {
            trimmed.to_string()
        };
        let parsed = Url::parse(&normalized).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        Some(parsed.to_string())
    }
}

/// A partial update for one item, produced by an asynchronous completion.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub content: Option<String>,
    pub color: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub favicon_url: Option<String>,
    pub site_name: Option<String>,
    pub loading: Option<bool>,
    pub todos: Option<Vec<Todo>>,
    pub style: Option<ItemStyle>,
}

impl ItemPatch {
    /// Completion patch for a link card. A failed metadata fetch degrades
    /// to showing the URL itself as the title.
    pub fn for_link(metadata: Option<LinkMetadata>, url: &str) -> Self {
        match metadata {
            Some(meta) => Self {
                loading: Some(false),
                title: meta.title,
                description: meta.description,
                image_url: meta.image_url,
                favicon_url: meta.favicon_url,
                site_name: meta.site_name,
                ..Self::default()
            },
            None => Self {
                loading: Some(false),
                title: Some(url.to_string()),
                ..Self::default()
            },
        }
    }
}

/// Apply a patch to an item. Returns false when the item no longer exists,
/// which is how stale completions for deleted items get dropped.
pub fn apply_patch(board: &mut BoardData, id: ItemId, patch: ItemPatch) -> bool {
    let Some(item) = board.item_mut(id) else {
        log::warn!("dropping patch for missing item {id}");
        return false;
    };
    if let Some(content) = patch.content {
        item.content = content;
    }
    if let Some(color) = patch.color {
        item.color = Some(color);
    }
    if let Some(width) = patch.width {
        item.width = Some(width);
    }
    if let Some(height) = patch.height {
        item.height = Some(height);
    }
    if patch.title.is_some() {
        item.title = patch.title;
    }
    if patch.description.is_some() {
        item.description = patch.description;
    }
    if patch.image_url.is_some() {
        item.image_url = patch.image_url;
    }
    if patch.favicon_url.is_some() {
        item.favicon_url = patch.favicon_url;
    }
    if patch.site_name.is_some() {
        item.site_name = patch.site_name;
    }
    if let Some(loading) = patch.loading {
        item.loading = loading;
    }
    if patch.todos.is_some() {
        item.todos = patch.todos;
    }
    if patch.style.is_some() {
        item.style = patch.style;
    }
    true
}

/// Positions for a row of `count` swatches laid out below an image item.
pub fn swatch_row(image: &BoardItem, count: usize) -> Vec<Point> {
    let dims = crate::geometry::dimensions_of(image);
    let y = image.position.y + dims.height + SWATCH_OFFSET;
    (0..count)
        .map(|i| {
            Point::new(
                image.position.x + i as f64 * (SWATCH_WIDTH + SWATCH_GAP),
                y,
            )
        })
        .collect()
}

/// Positions for generated idea notes: a 3-column grid centered on
/// `anchor`, starting one column to its left.
pub fn idea_grid(anchor: Point, count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let col = (i % 3) as f64;
            let row = (i / 3) as f64;
            Point::new(
                anchor.x + col * IDEA_COLUMN_WIDTH - IDEA_COLUMN_WIDTH,
                anchor.y + row * IDEA_ROW_HEIGHT,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemType;

    #[test]
    fn test_sanitize_text_strips_markup() {
        let s = BasicSanitizer;
        assert_eq!(s.sanitize_text("hello <script>evil()</script> world"), "hello  world");
        assert_eq!(s.sanitize_text("  plain text  "), "plain text");
        assert_eq!(s.sanitize_text("a\u{0007}b"), "ab");
        assert_eq!(s.sanitize_text("line\nbreak"), "line\nbreak");
    }

    #[test]
    fn test_sanitize_text_drops_script_and_style_content() {
        let s = BasicSanitizer;
        assert_eq!(s.sanitize_text("x<SCRIPT>bad()</SCRIPT>y"), "xy");
        assert_eq!(s.sanitize_text("a<style>p{color:red}</style>b"), "ab");
        // Other tags are removed but their text survives.
        assert_eq!(s.sanitize_text("keep <b>bold</b> text"), "keep bold text");
        // An unterminated script swallows the remainder.
        assert_eq!(s.sanitize_text("before<script>never closed"), "before");
    }

    #[test]
    fn test_sanitize_url_normalizes_www() {
        let s = BasicSanitizer;
        assert_eq!(
            s.sanitize_url("www.example.com"),
            Some("https://www.example.com/".to_string())
        );
        assert_eq!(
            s.sanitize_url("  https://example.com/page  "),
            Some("https://example.com/page".to_string())
        );
        assert_eq!(s.sanitize_url("not a url"), None);
        assert_eq!(s.sanitize_url("javascript:alert(1)"), None);
    }

    #[test]
    fn test_apply_patch_hits_live_item() {
        let mut board = BoardData::new("b", None);
        let id = board.add_item(BoardItem::new(ItemType::Link, Point::ZERO, "https://x.y"));

        let applied = apply_patch(
            &mut board,
            id,
            ItemPatch {
                title: Some("X".to_string()),
                loading: Some(false),
                ..ItemPatch::default()
            },
        );
        assert!(applied);
        let item = board.item(id).unwrap();
        assert_eq!(item.title.as_deref(), Some("X"));
        assert!(!item.loading);
    }

    #[test]
    fn test_link_patch_degrades_to_url_title() {
        let patch = ItemPatch::for_link(None, "https://example.com");
        assert_eq!(patch.loading, Some(false));
        assert_eq!(patch.title.as_deref(), Some("https://example.com"));
        assert!(patch.image_url.is_none());
    }

    #[test]
    fn test_apply_patch_drops_stale_id() {
        let mut board = BoardData::new("b", None);
        let ghost = uuid::Uuid::new_v4();
        assert!(!apply_patch(&mut board, ghost, ItemPatch::default()));
    }

    #[test]
    fn test_swatch_row_layout() {
        let image = BoardItem::new(ItemType::Image, Point::new(10.0, 20.0), "")
            .with_size(320.0, 240.0);
        let row = swatch_row(&image, 3);
        assert_eq!(row[0], Point::new(10.0, 280.0));
        assert_eq!(row[1], Point::new(10.0 + SWATCH_WIDTH + SWATCH_GAP, 280.0));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_idea_grid_wraps_after_three() {
        let grid = idea_grid(Point::new(100.0, 100.0), 4);
        assert_eq!(grid[0], Point::new(100.0 - IDEA_COLUMN_WIDTH, 100.0));
        assert_eq!(grid[1], Point::new(100.0, 100.0));
        assert_eq!(grid[2], Point::new(100.0 + IDEA_COLUMN_WIDTH, 100.0));
        assert_eq!(grid[3], Point::new(100.0 - IDEA_COLUMN_WIDTH, 300.0));
    }
}
