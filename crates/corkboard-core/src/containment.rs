//! Container membership, kanban column stacking, and smart-frame reflow.

use crate::board::BoardData;
use crate::geometry::{bounds_of, center_of, dimensions_of};
use crate::item::{BoardItem, ItemId, ItemType, LayoutMode};
use kurbo::Rect;

/// Vertical space reserved for a kanban column's title bar.
pub const KANBAN_HEADER_HEIGHT: f64 = 60.0;
/// Gap between stacked cards in a column.
pub const KANBAN_GAP: f64 = 12.0;
/// A column never shrinks below this height.
pub const KANBAN_MIN_HEIGHT: f64 = 400.0;
/// Extra room kept below the last card when the column grows.
pub const KANBAN_TAIL: f64 = 50.0;

/// Default container padding and gap for smart layouts.
pub const CONTAINER_PADDING: f64 = 20.0;
pub const CONTAINER_GAP: f64 = 10.0;
/// Auto-resized containers never shrink below this height.
pub const CONTAINER_MIN_HEIGHT: f64 = 100.0;

/// Items whose center lies within the container's resolved box.
/// The container itself and drawings are never members.
pub fn items_in_container<'a>(
    container: &BoardItem,
    items: &'a [BoardItem],
) -> Vec<&'a BoardItem> {
    let bounds = bounds_of(container);
    items
        .iter()
        .filter(|item| {
            if item.id == container.id || item.kind == ItemType::Drawing {
                return false;
            }
            let c = center_of(item);
            c.x >= bounds.x0 && c.x <= bounds.x1 && c.y >= bounds.y0 && c.y <= bounds.y1
        })
        .collect()
}

/// The container an item was dropped into, by center containment.
/// Containers with a smart layout mode are preferred over free ones.
pub fn find_container_for_item(item: &BoardItem, items: &[BoardItem]) -> Option<ItemId> {
    let center = center_of(item);
    let mut containers: Vec<&BoardItem> = items
        .iter()
        .filter(|i| i.kind == ItemType::Container && i.id != item.id)
        .collect();
    containers.sort_by_key(|c| c.layout_mode == LayoutMode::Free);

    containers
        .iter()
        .find(|container| {
            let b = bounds_of(container);
            center.x >= b.x0 && center.x <= b.x1 && center.y >= b.y0 && center.y <= b.y1
        })
        .map(|c| c.id)
}

/// Cards currently stacked in a kanban column.
///
/// Membership is open at the bottom (center below the column top and
/// horizontally within it) so a stack keeps its members even while it is
/// outgrowing the column box. Containers, other columns, and drawings
/// never stack.
fn column_members<'a>(
    column: &BoardItem,
    items: &'a [BoardItem],
    exclude: ItemId,
) -> Vec<&'a BoardItem> {
    let col_x = column.position.x;
    let col_y = column.position.y;
    let col_w = dimensions_of(column).width;

    items
        .iter()
        .filter(|i| {
            if i.id == column.id || i.id == exclude {
                return false;
            }
            if matches!(
                i.kind,
                ItemType::Container | ItemType::Kanban | ItemType::Drawing
            ) {
                return false;
            }
            let c = center_of(i);
            c.x > col_x && c.x < col_x + col_w && c.y > col_y
        })
        .collect()
}

/// Where a dropped card slots into the column's member list: before the
/// first member whose center is below the card's raw top edge.
fn insert_index(dropped: &BoardItem, members: &[&BoardItem]) -> usize {
    for (i, member) in members.iter().enumerate() {
        if dropped.position.y < center_of(member).y {
            return i;
        }
    }
    members.len()
}

/// Stack a dropped item into a kanban column.
///
/// Members sort by their current Y, the dropped item slots in by its raw
/// drop position, and the whole stack re-lays from the header down with
/// every card horizontally centered. The column grows to fit and never
/// shrinks below [`KANBAN_MIN_HEIGHT`]. Stale ids or a non-kanban target
/// leave the board untouched. Dropping an item already in place is
/// idempotent.
pub fn snap_into_column(board: &mut BoardData, dropped_id: ItemId, column_id: ItemId) {
    let Some(column) = board.item(column_id).cloned() else {
        return;
    };
    let Some(dropped) = board.item(dropped_id).cloned() else {
        return;
    };
    if column.kind != ItemType::Kanban {
        return;
    }

    let col_x = column.position.x;
    let col_y = column.position.y;
    let col_w = dimensions_of(&column).width;

    let mut members = column_members(&column, &board.items, dropped_id);
    members.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));

    let index = insert_index(&dropped, &members);
    let mut stack: Vec<ItemId> = members.iter().map(|m| m.id).collect();
    stack.insert(index, dropped_id);

    let mut current_y = col_y + KANBAN_HEADER_HEIGHT;
    for id in stack {
        let Some(item) = board.item(id) else { continue };
        let dims = dimensions_of(item);
        let x = col_x + (col_w - dims.width) / 2.0;
        let y = current_y;
        current_y += dims.height + KANBAN_GAP;
        if let Some(item) = board.item_mut(id) {
            item.position = kurbo::Point::new(x, y);
        }
    }

    let required = KANBAN_MIN_HEIGHT.max(current_y - col_y + KANBAN_TAIL);
    if let Some(column) = board.item_mut(column_id) {
        column.height = Some(required);
    }
}

/// Ghost rectangle showing where a dragged card would land in a column.
/// Pure preview: computes the same slot as [`snap_into_column`] without
/// mutating anything.
pub fn kanban_preview(board: &BoardData, dropped_id: ItemId, column_id: ItemId) -> Option<Rect> {
    let column = board.item(column_id)?;
    let dropped = board.item(dropped_id)?;
    if column.kind != ItemType::Kanban {
        return None;
    }

    let col_x = column.position.x;
    let col_y = column.position.y;
    let col_w = dimensions_of(column).width;

    let mut members = column_members(column, &board.items, dropped_id);
    members.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
    let index = insert_index(dropped, &members);

    let mut ghost_y = col_y + KANBAN_HEADER_HEIGHT;
    for member in members.iter().take(index) {
        ghost_y += dimensions_of(member).height + KANBAN_GAP;
    }

    let dims = dimensions_of(dropped);
    let ghost_x = col_x + (col_w - dims.width) / 2.0;
    Some(Rect::from_origin_size(
        kurbo::Point::new(ghost_x, ghost_y),
        dims,
    ))
}

/// Reflow a container's members according to its layout mode.
///
/// Free containers never reflow. Members sort top-to-bottom with a 10 px
/// row bucket, then left-to-right. List mode stacks them vertically and
/// stretches widths to the padded interior; grid mode flows them into rows.
/// With `auto_resize` the container's height tracks the content extent.
pub fn reflow_container(board: &mut BoardData, container_id: ItemId) {
    let Some(container) = board.item(container_id).cloned() else {
        return;
    };
    if container.kind != ItemType::Container || container.layout_mode == LayoutMode::Free {
        return;
    }

    let mut sorted: Vec<(ItemId, kurbo::Point)> = items_in_container(&container, &board.items)
        .iter()
        .map(|i| (i.id, i.position))
        .collect();
    if sorted.is_empty() {
        return;
    }

    let padding = container.padding.unwrap_or(CONTAINER_PADDING);
    let gap = container.gap.unwrap_or(CONTAINER_GAP);
    let container_w = dimensions_of(&container).width;

    sorted.sort_by(|(_, a), (_, b)| {
        if (a.y - b.y).abs() < 10.0 {
            a.x.total_cmp(&b.x)
        } else {
            a.y.total_cmp(&b.y)
        }
    });
    let members: Vec<ItemId> = sorted.into_iter().map(|(id, _)| id).collect();

    let origin = container.position;
    let mut current_y = origin.y + padding;

    match container.layout_mode {
        LayoutMode::List => {
            for id in &members {
                let height = board.item(*id).map(|i| dimensions_of(i).height).unwrap_or(0.0);
                if let Some(item) = board.item_mut(*id) {
                    item.position = kurbo::Point::new(origin.x + padding, current_y);
                    item.width = Some(container_w - padding * 2.0);
                }
                current_y += height + gap;
            }
            if container.auto_resize {
                let total = current_y - origin.y + padding - gap;
                if let Some(item) = board.item_mut(container_id) {
                    item.height = Some(total.max(CONTAINER_MIN_HEIGHT));
                }
            }
        }
        LayoutMode::Grid => {
            let mut current_x = origin.x + padding;
            let mut row_height = 0.0f64;
            for id in &members {
                let Some(item) = board.item(*id) else { continue };
                let dims = dimensions_of(item);
                if current_x + dims.width > origin.x + container_w - padding {
                    current_y += row_height + gap;
                    current_x = origin.x + padding;
                    row_height = 0.0;
                }
                if let Some(item) = board.item_mut(*id) {
                    item.position = kurbo::Point::new(current_x, current_y);
                }
                current_x += dims.width + gap;
                row_height = row_height.max(dims.height);
            }
            if container.auto_resize {
                let total = current_y + row_height - origin.y + padding;
                if let Some(item) = board.item_mut(container_id) {
                    item.height = Some(total.max(CONTAINER_MIN_HEIGHT));
                }
            }
        }
        LayoutMode::Free => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn board_with(items: Vec<BoardItem>) -> BoardData {
        let mut board = BoardData::new("test", None);
        for item in items {
            board.add_item(item);
        }
        board
    }

    fn card(x: f64, y: f64) -> BoardItem {
        BoardItem::new(ItemType::Note, Point::new(x, y), "").with_size(240.0, 200.0)
    }

    fn kanban_at(x: f64, y: f64) -> BoardItem {
        BoardItem::new(ItemType::Kanban, Point::new(x, y), "To Do").with_size(300.0, 400.0)
    }

    #[test]
    fn test_items_in_container_by_center() {
        let container =
            BoardItem::new(ItemType::Container, Point::ZERO, "Group").with_size(500.0, 400.0);
        let inside = card(50.0, 50.0); // center (170, 150)
        let outside = card(450.0, 50.0); // center (570, 150)
        let drawing = BoardItem::drawing(vec![Point::new(10.0, 10.0)], "#000");

        let items = vec![container.clone(), inside.clone(), outside, drawing];
        let members = items_in_container(&container, &items);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, inside.id);
    }

    #[test]
    fn test_find_container_prefers_smart_layout() {
        let free =
            BoardItem::new(ItemType::Container, Point::ZERO, "free").with_size(500.0, 400.0);
        let mut smart =
            BoardItem::new(ItemType::Container, Point::ZERO, "smart").with_size(500.0, 400.0);
        smart.layout_mode = LayoutMode::List;

        let dropped = card(100.0, 100.0);
        let items = vec![free, smart.clone(), dropped.clone()];
        assert_eq!(find_container_for_item(&dropped, &items), Some(smart.id));
    }

    #[test]
    fn test_kanban_snap_stacks_and_grows() {
        let column = kanban_at(0.0, 0.0);
        let existing = card(30.0, 100.0);
        let dropped = card(500.0, 50.0);
        let column_id = column.id;
        let existing_id = existing.id;
        let dropped_id = dropped.id;
        let mut board = board_with(vec![column, existing, dropped]);

        // Move the dropped card over the column, above the existing one.
        board.item_mut(dropped_id).unwrap().position = Point::new(20.0, 80.0);
        snap_into_column(&mut board, dropped_id, column_id);

        // Dropped card slots first: its raw top (80) is above the existing
        // card's center (200).
        let dropped = board.item(dropped_id).unwrap();
        assert_eq!(dropped.position, Point::new(30.0, 60.0));
        let existing = board.item(existing_id).unwrap();
        assert_eq!(existing.position, Point::new(30.0, 272.0));

        // Stack bottom is 472 + gap = 484; column grows to 484 + 50.
        let column = board.item(column_id).unwrap();
        assert_eq!(column.height, Some(534.0));
    }

    #[test]
    fn test_kanban_snap_ignores_drawings() {
        let column = kanban_at(0.0, 0.0);
        let stroke = BoardItem::drawing(
            vec![Point::new(50.0, 100.0), Point::new(120.0, 160.0)],
            "#374151",
        );
        let dropped = card(500.0, 50.0);
        let column_id = column.id;
        let stroke_id = stroke.id;
        let dropped_id = dropped.id;
        let stroke_pos = stroke.position;
        let mut board = board_with(vec![column, stroke, dropped]);

        board.item_mut(dropped_id).unwrap().position = Point::new(20.0, 80.0);
        snap_into_column(&mut board, dropped_id, column_id);

        // The stroke keeps its place; only the card stacks under the header.
        assert_eq!(board.item(stroke_id).unwrap().position, stroke_pos);
        assert_eq!(
            board.item(dropped_id).unwrap().position,
            Point::new(30.0, 60.0)
        );
    }

    #[test]
    fn test_kanban_snap_is_idempotent() {
        let column = kanban_at(0.0, 0.0);
        let a = card(10.0, 70.0);
        let b = card(10.0, 300.0);
        let column_id = column.id;
        let (a_id, b_id) = (a.id, b.id);
        let mut board = board_with(vec![column, a, b]);

        snap_into_column(&mut board, a_id, column_id);
        snap_into_column(&mut board, b_id, column_id);
        let positions: Vec<Point> = [a_id, b_id, column_id]
            .iter()
            .map(|id| board.item(*id).unwrap().position)
            .collect();
        let height = board.item(column_id).unwrap().height;

        snap_into_column(&mut board, b_id, column_id);
        let after: Vec<Point> = [a_id, b_id, column_id]
            .iter()
            .map(|id| board.item(*id).unwrap().position)
            .collect();
        assert_eq!(positions, after);
        assert_eq!(board.item(column_id).unwrap().height, height);
    }

    #[test]
    fn test_kanban_snap_keeps_min_height() {
        let column = kanban_at(0.0, 0.0);
        let small = BoardItem::new(ItemType::Note, Point::new(10.0, 70.0), "")
            .with_size(100.0, 50.0);
        let column_id = column.id;
        let small_id = small.id;
        let mut board = board_with(vec![column, small]);

        snap_into_column(&mut board, small_id, column_id);
        assert_eq!(board.item(column_id).unwrap().height, Some(400.0));
    }

    #[test]
    fn test_kanban_preview_matches_snap_slot() {
        let column = kanban_at(0.0, 0.0);
        let existing = card(30.0, 60.0);
        let dropped = card(20.0, 500.0); // below the existing card's center
        let column_id = column.id;
        let dropped_id = dropped.id;
        let board = board_with(vec![column, existing, dropped]);

        let ghost = kanban_preview(&board, dropped_id, column_id).unwrap();
        // Slot 1: header + existing height + gap.
        assert_eq!(ghost.y0, 60.0 + 200.0 + 12.0);
        assert_eq!(ghost.x0, 30.0);
        assert_eq!(ghost.width(), 240.0);
    }

    #[test]
    fn test_kanban_snap_stale_ids_are_noop() {
        let column = kanban_at(0.0, 0.0);
        let column_id = column.id;
        let mut board = board_with(vec![column]);
        let before = board.clone();

        snap_into_column(&mut board, uuid::Uuid::new_v4(), column_id);
        snap_into_column(&mut board, column_id, uuid::Uuid::new_v4());
        assert_eq!(board, before);
    }

    #[test]
    fn test_list_reflow_stacks_and_stretches() {
        let mut container =
            BoardItem::new(ItemType::Container, Point::ZERO, "list").with_size(500.0, 400.0);
        container.layout_mode = LayoutMode::List;
        let a = card(200.0, 200.0).with_size(240.0, 100.0);
        let b = card(100.0, 50.0).with_size(240.0, 100.0);
        let container_id = container.id;
        let (a_id, b_id) = (a.id, b.id);
        let mut board = board_with(vec![container, a, b]);

        reflow_container(&mut board, container_id);

        // b sorts first (higher up), both stretch to the padded interior.
        let b = board.item(b_id).unwrap();
        assert_eq!(b.position, Point::new(20.0, 20.0));
        assert_eq!(b.width, Some(460.0));
        let a = board.item(a_id).unwrap();
        assert_eq!(a.position, Point::new(20.0, 130.0));
    }

    #[test]
    fn test_grid_reflow_wraps_rows() {
        let mut container =
            BoardItem::new(ItemType::Container, Point::ZERO, "grid").with_size(500.0, 600.0);
        container.layout_mode = LayoutMode::Grid;
        container.auto_resize = true;
        let a = card(50.0, 50.0).with_size(200.0, 150.0);
        let b = card(260.0, 50.0).with_size(200.0, 150.0);
        let c = card(50.0, 260.0).with_size(200.0, 150.0);
        let container_id = container.id;
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        let mut board = board_with(vec![container, a, b, c]);

        reflow_container(&mut board, container_id);

        assert_eq!(board.item(a_id).unwrap().position, Point::new(20.0, 20.0));
        assert_eq!(board.item(b_id).unwrap().position, Point::new(230.0, 20.0));
        // Third card would end at 440 + 200 > 480, so it wraps.
        assert_eq!(board.item(c_id).unwrap().position, Point::new(20.0, 180.0));
        // Auto-resize: 180 + 150 + 20 = 350.
        assert_eq!(board.item(container_id).unwrap().height, Some(350.0));
    }

    #[test]
    fn test_free_container_never_reflows() {
        let container =
            BoardItem::new(ItemType::Container, Point::ZERO, "free").with_size(500.0, 400.0);
        let a = card(123.0, 45.0);
        let container_id = container.id;
        let a_id = a.id;
        let mut board = board_with(vec![container, a]);

        reflow_container(&mut board, container_id);
        assert_eq!(board.item(a_id).unwrap().position, Point::new(123.0, 45.0));
    }
}
