//! Selection state and region selection (marquee and lasso).

use crate::geometry::{bounds_of, boxes_overlap, center_of, point_in_polygon, union_bounds};
use crate::item::{BoardItem, ItemId, ItemType};
use kurbo::{Point, Rect};

/// The set of selected items, in selection order.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<ItemId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click selection. Additive clicks toggle membership; plain clicks
    /// replace the selection.
    pub fn select(&mut self, id: ItemId, additive: bool) {
        if additive {
            if let Some(pos) = self.ids.iter().position(|&i| i == id) {
                self.ids.remove(pos);
            } else {
                self.ids.push(id);
            }
        } else {
            self.ids = vec![id];
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn set(&mut self, ids: Vec<ItemId>) {
        self.ids = ids;
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The most recently selected item.
    pub fn active(&self) -> Option<ItemId> {
        self.ids.last().copied()
    }

    /// Drop ids that no longer resolve to items.
    pub fn retain_existing(&mut self, items: &[BoardItem]) {
        self.ids.retain(|id| items.iter().any(|i| i.id == *id));
    }

    pub fn select_all(&mut self, items: &[BoardItem]) {
        self.ids = items.iter().map(|i| i.id).collect();
    }

    /// Select every item that is not currently selected.
    pub fn invert(&mut self, items: &[BoardItem]) {
        self.ids = items
            .iter()
            .map(|i| i.id)
            .filter(|id| !self.ids.contains(id))
            .collect();
    }

    pub fn select_by_type(&mut self, items: &[BoardItem], kind: ItemType) {
        self.ids = items.iter().filter(|i| i.kind == kind).map(|i| i.id).collect();
    }

    /// Select all items matching the first selected item: same type, and
    /// same color when the anchor has one.
    pub fn select_similar(&mut self, items: &[BoardItem]) {
        let Some(anchor_id) = self.ids.first().copied() else { return };
        let Some(anchor) = items.iter().find(|i| i.id == anchor_id) else {
            return;
        };
        let kind = anchor.kind;
        let color = anchor.color.clone();
        self.ids = items
            .iter()
            .filter(|i| i.kind == kind)
            .filter(|i| color.is_none() || i.color == color)
            .map(|i| i.id)
            .collect();
    }

    /// Combined bounding box of the selected items.
    pub fn bounds(&self, items: &[BoardItem]) -> Option<Rect> {
        union_bounds(items.iter().filter(|i| self.ids.contains(&i.id)))
    }
}

/// A shift-drag rectangle select in progress, in world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct MarqueeBox {
    pub start: Point,
    pub current: Point,
}

impl MarqueeBox {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

/// Items whose boxes intersect the marquee rectangle.
///
/// The hit set is recomputed from scratch on every call, so shrinking the
/// marquee deselects items it no longer reaches.
pub fn marquee_hits(items: &[BoardItem], rect: Rect) -> Vec<ItemId> {
    items
        .iter()
        .filter(|item| boxes_overlap(bounds_of(item), rect))
        .map(|i| i.id)
        .collect()
}

/// Items whose center point falls inside the lasso polygon.
/// Paths with fewer than three points select nothing.
pub fn lasso_hits(items: &[BoardItem], path: &[Point]) -> Vec<ItemId> {
    if path.len() < 3 {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| point_in_polygon(center_of(item), path))
        .map(|i| i.id)
        .collect()
}

/// Items hit by a point, front to back by resolved stacking order.
pub fn items_at_point(items: &[BoardItem], point: Point) -> Vec<ItemId> {
    let mut hits: Vec<&BoardItem> = items
        .iter()
        .filter(|i| bounds_of(i).contains(point))
        .collect();
    hits.sort_by_key(|i| std::cmp::Reverse(crate::geometry::z_index_of(i)));
    hits.iter().map(|i| i.id).collect()
}
