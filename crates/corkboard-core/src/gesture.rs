//! Pointer gesture state and the pure math behind drags and group resizes.
//!
//! At most one gesture is active at a time; the engine stores a single
//! [`Gesture`] value, so starting a new gesture structurally ends the
//! previous one.

use crate::geometry::{bounds_of, center_of, dimensions_of};
use crate::item::{BoardItem, ItemId, ItemType};
use crate::selection::MarqueeBox;
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::{HashMap, HashSet};

/// Floor for item width and height during a group resize.
pub const MIN_RESIZE_SIZE: f64 = 100.0;

/// One of the eight handles around the selection bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl ResizeHandle {
    pub fn has_east(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    pub fn has_west(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    pub fn has_north(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    pub fn has_south(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }
}

/// A drag of one or more items, anchored at the pointer-down position.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Items being moved, including children swept in by [`expand_drag_set`].
    pub item_ids: Vec<ItemId>,
    /// Pointer-down position in screen coordinates.
    pub start: Point,
    /// Position of each moved item at pointer-down.
    pub initial: HashMap<ItemId, Point>,
}

/// A proportional resize of the whole selection from one handle.
#[derive(Debug, Clone)]
pub struct GroupResizeState {
    pub handle: ResizeHandle,
    /// Selection bounds at pointer-down, in world coordinates.
    pub start_bounds: Rect,
    /// Pointer-down position in world coordinates.
    pub start_mouse: Point,
    /// Placement of each selected item at pointer-down.
    pub initial: HashMap<ItemId, (Point, Size)>,
}

/// Translucent stand-in rendered at the projected drop position of a
/// dragged item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostItem {
    pub id: ItemId,
    pub rect: Rect,
    pub kind: ItemType,
}

/// The active pointer gesture, if any.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Canvas pan; `last` is the previous pointer position in screen
    /// coordinates.
    Pan { last: Point },
    Marquee(MarqueeBox),
    /// Freehand selection path in world coordinates.
    Lasso { path: Vec<Point> },
    /// Freehand drawing stroke in world coordinates.
    Draw { points: Vec<Point> },
    DragItems(DragState),
    ResizeGroup(GroupResizeState),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Expand a set of dragged ids so containers and kanbans carry their
/// children: any item whose center lies inside a dragged container's box
/// moves with it. Order is preserved, children appended after the seeds.
pub fn expand_drag_set(items: &[BoardItem], seed_ids: &[ItemId]) -> Vec<ItemId> {
    let mut set: HashSet<ItemId> = seed_ids.iter().copied().collect();
    let mut expanded: Vec<ItemId> = seed_ids.to_vec();

    for &seed in seed_ids {
        let Some(parent) = items.iter().find(|i| i.id == seed) else {
            continue;
        };
        if !matches!(parent.kind, ItemType::Container | ItemType::Kanban) {
            continue;
        }
        let parent_box = bounds_of(parent);
        for child in items {
            if child.id == seed || set.contains(&child.id) {
                continue;
            }
            let c = center_of(child);
            if c.x > parent_box.x0 && c.x < parent_box.x1 && c.y > parent_box.y0 && c.y < parent_box.y1 {
                set.insert(child.id);
                expanded.push(child.id);
            }
        }
    }
    expanded
}

impl DragState {
    /// Capture initial positions for every item in the drag set.
    pub fn new(items: &[BoardItem], item_ids: Vec<ItemId>, start: Point) -> Self {
        let initial = item_ids
            .iter()
            .filter_map(|id| items.iter().find(|i| i.id == *id).map(|i| (*id, i.position)))
            .collect();
        Self {
            item_ids,
            start,
            initial,
        }
    }

    /// World-space movement since pointer-down, given the screen-space
    /// pointer position and zoom.
    pub fn world_delta(&self, screen: Point, zoom: f64) -> Vec2 {
        Vec2::new(
            (screen.x - self.start.x) / zoom,
            (screen.y - self.start.y) / zoom,
        )
    }
}

impl GroupResizeState {
    /// Capture the selection bounds and per-item placements at pointer-down.
    /// Returns `None` when the selection resolves to no items.
    pub fn begin(
        items: &[BoardItem],
        selected: &[ItemId],
        handle: ResizeHandle,
        mouse_world: Point,
    ) -> Option<Self> {
        let members: Vec<&BoardItem> = items.iter().filter(|i| selected.contains(&i.id)).collect();
        let start_bounds = crate::geometry::union_bounds(members.iter().copied())?;
        let initial = members
            .iter()
            .map(|i| {
                let dims = dimensions_of(i);
                (i.id, (i.position, Size::new(dims.width, dims.height)))
            })
            .collect();
        Some(Self {
            handle,
            start_bounds,
            start_mouse: mouse_world,
            initial,
        })
    }

    /// Scale factors for the current pointer position. Dragging the east
    /// handle right grows the selection; the west handle mirrors.
    pub fn scale_factors(&self, mouse_world: Point) -> (f64, f64) {
        let dx = mouse_world.x - self.start_mouse.x;
        let dy = mouse_world.y - self.start_mouse.y;
        let width = self.start_bounds.width();
        let height = self.start_bounds.height();

        let scale_x = if self.handle.has_east() {
            (width + dx) / width
        } else if self.handle.has_west() {
            (width - dx) / width
        } else {
            1.0
        };
        let scale_y = if self.handle.has_south() {
            (height + dy) / height
        } else if self.handle.has_north() {
            (height - dy) / height
        } else {
            1.0
        };
        (scale_x, scale_y)
    }

    /// New placement for every item, scaled proportionally about the
    /// captured bounds origin. Sizes never shrink below
    /// [`MIN_RESIZE_SIZE`] on either axis.
    pub fn placements(&self, mouse_world: Point) -> Vec<(ItemId, Point, Size)> {
        let (scale_x, scale_y) = self.scale_factors(mouse_world);
        let origin = self.start_bounds.origin();
        let scales_x = self.handle.has_east() || self.handle.has_west();
        let scales_y = self.handle.has_south() || self.handle.has_north();

        self.initial
            .iter()
            .map(|(&id, &(position, size))| {
                let mut x = position.x;
                let mut y = position.y;
                let mut width = size.width;
                let mut height = size.height;

                if scales_x {
                    x = origin.x + (position.x - origin.x) * scale_x;
                    width = size.width * scale_x;
                }
                if scales_y {
                    y = origin.y + (position.y - origin.y) * scale_y;
                    height = size.height * scale_y;
                }

                width = width.max(MIN_RESIZE_SIZE);
                height = height.max(MIN_RESIZE_SIZE);
                (id, Point::new(x, y), Size::new(width, height))
            })
            .collect()
    }
}
