//! Smart alignment guides for single-item drags.
//!
//! While an item is dragged, its edges and centerlines are compared against
//! every other item on the board. The closest alignment on each axis within
//! the threshold wins, the position is adjusted to match exactly, and a
//! guideline segment spanning both items is emitted for rendering.

use crate::geometry::dimensions_of;
use crate::item::BoardItem;
use kurbo::Point;

/// Snap threshold in screen pixels; divided by zoom to get world units.
pub const SNAP_THRESHOLD: f64 = 5.0;

/// Orientation of a rendered guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideOrientation {
    Vertical,
    Horizontal,
}

/// A guideline segment in world coordinates.
///
/// `pos` is the aligned coordinate (x for vertical, y for horizontal);
/// `start`/`end` span the extent of the two aligned items on the other axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guideline {
    pub orientation: GuideOrientation,
    pub pos: f64,
    pub start: f64,
    pub end: f64,
}

/// Result of a snap query: the adjusted position plus the guides to draw.
#[derive(Debug, Clone, Default)]
pub struct SnapOutcome {
    pub x: f64,
    pub y: f64,
    pub snapped_x: bool,
    pub snapped_y: bool,
    pub guides: Vec<Guideline>,
}

impl SnapOutcome {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Compute the snapped position for `active` at tentative position
/// `current`, against all `others` (the active item itself is skipped).
///
/// Five relations per axis are considered: left/left, right/right,
/// left/right, right/left, and center/center (top/bottom on the y axis).
/// Only a strictly closer candidate displaces the current best, so the
/// earliest-scanned item wins ties. At most one guide per axis is emitted.
pub fn snap_position(
    active: &BoardItem,
    current: Point,
    others: &[BoardItem],
    zoom: f64,
) -> SnapOutcome {
    let active_dims = dimensions_of(active);
    let (active_w, active_h) = (active_dims.width, active_dims.height);

    let active_left = current.x;
    let active_center_x = current.x + active_w / 2.0;
    let active_right = current.x + active_w;
    let active_top = current.y;
    let active_center_y = current.y + active_h / 2.0;
    let active_bottom = current.y + active_h;

    let mut outcome = SnapOutcome {
        x: current.x,
        y: current.y,
        ..SnapOutcome::default()
    };

    let mut min_dist_x = SNAP_THRESHOLD / zoom;
    let mut min_dist_y = SNAP_THRESHOLD / zoom;
    let mut best_guide_x: Option<Guideline> = None;
    let mut best_guide_y: Option<Guideline> = None;

    for item in others {
        if item.id == active.id {
            continue;
        }

        let dims = dimensions_of(item);
        let target_left = item.position.x;
        let target_center_x = item.position.x + dims.width / 2.0;
        let target_right = item.position.x + dims.width;
        let target_top = item.position.y;
        let target_center_y = item.position.y + dims.height / 2.0;
        let target_bottom = item.position.y + dims.height;

        let vertical_guide = |pos: f64| Guideline {
            orientation: GuideOrientation::Vertical,
            pos,
            start: active_top.min(target_top),
            end: active_bottom.max(target_bottom),
        };
        let horizontal_guide = |pos: f64| Guideline {
            orientation: GuideOrientation::Horizontal,
            pos,
            start: active_left.min(target_left),
            end: active_right.max(target_right),
        };

        // X axis relations: (active edge, target edge, snapped x).
        let x_candidates = [
            (active_left, target_left, target_left),
            (active_right, target_right, target_right - active_w),
            (active_left, target_right, target_right),
            (active_right, target_left, target_left - active_w),
            (active_center_x, target_center_x, target_center_x - active_w / 2.0),
        ];
        for (edge, target, snapped) in x_candidates {
            let dist = (edge - target).abs();
            if dist < min_dist_x {
                min_dist_x = dist;
                outcome.x = snapped;
                outcome.snapped_x = true;
                best_guide_x = Some(vertical_guide(target));
            }
        }

        // Y axis relations.
        let y_candidates = [
            (active_top, target_top, target_top),
            (active_bottom, target_bottom, target_bottom - active_h),
            (active_top, target_bottom, target_bottom),
            (active_bottom, target_top, target_top - active_h),
            (active_center_y, target_center_y, target_center_y - active_h / 2.0),
        ];
        for (edge, target, snapped) in y_candidates {
            let dist = (edge - target).abs();
            if dist < min_dist_y {
                min_dist_y = dist;
                outcome.y = snapped;
                outcome.snapped_y = true;
                best_guide_y = Some(horizontal_guide(target));
            }
        }
    }

    outcome.guides.extend(best_guide_x);
    outcome.guides.extend(best_guide_y);
    outcome
}
