//! Resolved item geometry and stacking order.
//!
//! Every module that needs an item's on-canvas footprint goes through
//! [`dimensions_of`] so that default sizes are defined exactly once.

use crate::item::{BoardItem, ItemType};
use kurbo::{Point, Rect, Size};

/// Resolve the effective size of an item.
///
/// Explicit `width`/`height` win over the per-type defaults, with one
/// exception: a collapsed container always renders at header height.
pub fn dimensions_of(item: &BoardItem) -> Size {
    if item.kind == ItemType::Container && item.collapsed {
        return Size::new(item.width.unwrap_or(500.0), COLLAPSED_CONTAINER_HEIGHT);
    }

    let (dw, dh) = match item.kind {
        ItemType::Container => (500.0, 400.0),
        ItemType::Kanban => (300.0, 400.0),
        ItemType::Todo => (280.0, 300.0),
        ItemType::Link => (300.0, 280.0),
        ItemType::Board => (200.0, 160.0),
        ItemType::Swatch => (80.0, 90.0),
        _ => (240.0, 200.0),
    };

    Size::new(item.width.unwrap_or(dw), item.height.unwrap_or(dh))
}

/// Height of a collapsed container (title bar only).
pub const COLLAPSED_CONTAINER_HEIGHT: f64 = 48.0;

/// The item's axis-aligned bounding box in world coordinates.
pub fn bounds_of(item: &BoardItem) -> Rect {
    Rect::from_origin_size(item.position, dimensions_of(item))
}

/// The item's center point in world coordinates.
pub fn center_of(item: &BoardItem) -> Point {
    bounds_of(item).center()
}

/// Resolve the stacking order for an item.
///
/// An explicit `z_index` wins; otherwise containers sit at the bottom,
/// kanban columns just above them, and everything else on top.
pub fn z_index_of(item: &BoardItem) -> i64 {
    if let Some(z) = item.z_index {
        return z;
    }
    match item.kind {
        ItemType::Container => 1,
        ItemType::Kanban => 2,
        _ => 10,
    }
}

/// Whether two boxes overlap (edge contact counts as overlap).
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || b.x1 < a.x0 || a.y1 < b.y0 || b.y1 < a.y0)
}

/// Even-odd ray-casting point-in-polygon test.
///
/// Returns false for degenerate polygons with fewer than three vertices.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if ((pi.y > point.y) != (pj.y > point.y))
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Union of the bounding boxes of all given items.
pub fn union_bounds<'a>(items: impl IntoIterator<Item = &'a BoardItem>) -> Option<Rect> {
    let mut result: Option<Rect> = None;
    for item in items {
        let bounds = bounds_of(item);
        result = Some(match result {
            Some(r) => r.union(bounds),
            None => bounds,
        });
    }
    result
}
