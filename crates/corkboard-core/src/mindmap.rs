//! Mind-map operations over notes and their connections.
//!
//! The connection graph doubles as the tree: a connection points from
//! parent to child, and a node's parent is the first connection targeting
//! it. Placement is recomputed from the live graph on every call, so
//! manually moved nodes are respected.

use crate::board::{BoardData, Connection};
use crate::item::{
    BoardItem, FontSize, FontWeight, ItemId, ItemStyle, ItemType, TextAlign,
};
use kurbo::{Point, Rect};
use std::collections::HashSet;
use thiserror::Error;

/// Branch color palette, assigned by the branch's index among root children.
pub const BRANCH_COLORS: [&str; 8] = [
    "#3B82F6", // blue
    "#10B981", // green
    "#F59E0B", // amber
    "#EF4444", // red
    "#8B5CF6", // purple
    "#EC4899", // pink
    "#06B6D4", // cyan
    "#F97316", // orange
];

/// Distance from the root at which first-level children fan out.
pub const STAR_BURST_RADIUS: f64 = 350.0;
/// Horizontal space between a parent and its child.
pub const HORIZONTAL_SPACING: f64 = 280.0;
/// Vertical space between siblings.
pub const VERTICAL_SPACING: f64 = 120.0;
/// Step used when nudging a candidate out of a collision.
pub const COLLISION_NUDGE: f64 = 20.0;
/// Estimated node box for collision checks when no explicit size is set.
pub const NODE_WIDTH: f64 = 240.0;
pub const NODE_HEIGHT: f64 = 80.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MindMapError {
    #[error("node not found")]
    MissingNode,
    #[error("the root node has no siblings")]
    RootHasNoSiblings,
}

/// Direction for arrow-key traversal of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    /// First child.
    Child,
    /// Parent.
    Parent,
    /// Next sibling.
    NextSibling,
    /// Previous sibling.
    PrevSibling,
}

/// The first connection targeting `id` defines its parent.
pub fn parent_of(id: ItemId, connections: &[Connection]) -> Option<ItemId> {
    connections.iter().find(|c| c.to_id == id).map(|c| c.from_id)
}

/// Distance from the root, with a visited set guarding against cycles.
pub fn depth_of(id: ItemId, connections: &[Connection]) -> usize {
    let mut visited = HashSet::new();
    let mut depth = 0;
    let mut cursor = id;
    while visited.insert(cursor) {
        match parent_of(cursor, connections) {
            Some(parent) => {
                depth += 1;
                cursor = parent;
            }
            None => return depth,
        }
    }
    // Cycle: treat the revisited node as the root.
    depth
}

/// The node no connection targets.
pub fn root_node<'a>(items: &'a [BoardItem], connections: &[Connection]) -> Option<&'a BoardItem> {
    let child_ids: HashSet<ItemId> = connections.iter().map(|c| c.to_id).collect();
    items.iter().find(|i| !child_ids.contains(&i.id))
}

/// Which root branch a node hangs from: the index of its ancestor among the
/// root's direct children. The root itself maps to branch 0.
pub fn branch_index_of(id: ItemId, items: &[BoardItem], connections: &[Connection]) -> usize {
    let Some(root) = root_node(items, connections) else {
        return 0;
    };
    if id == root.id {
        return 0;
    }

    let root_children: Vec<ItemId> = connections
        .iter()
        .filter(|c| c.from_id == root.id)
        .map(|c| c.to_id)
        .collect();

    if let Some(index) = root_children.iter().position(|&c| c == id) {
        return index;
    }

    let mut visited = HashSet::new();
    let mut cursor = id;
    while visited.insert(cursor) {
        let Some(parent) = parent_of(cursor, connections) else {
            return 0;
        };
        if let Some(index) = root_children.iter().position(|&c| c == parent) {
            return index;
        }
        cursor = parent;
    }
    0
}

pub fn branch_color(branch_index: usize) -> &'static str {
    BRANCH_COLORS[branch_index % BRANCH_COLORS.len()]
}

/// Style and fill color for a node at the given depth.
pub fn node_style(depth: usize, branch_color: &str) -> (ItemStyle, String) {
    match depth {
        0 => (
            ItemStyle::new(FontSize::Xl, FontWeight::Bold, TextAlign::Center),
            "#1F2937".to_string(),
        ),
        1 => (
            ItemStyle::new(FontSize::Lg, FontWeight::Bold, TextAlign::Left),
            branch_color.to_string(),
        ),
        _ => (
            ItemStyle::new(FontSize::Md, FontWeight::Normal, TextAlign::Left),
            branch_color.to_string(),
        ),
    }
}

fn node_box(item: &BoardItem) -> Rect {
    Rect::from_origin_size(
        item.position,
        (
            item.width.unwrap_or(NODE_WIDTH),
            item.height.unwrap_or(NODE_HEIGHT),
        ),
    )
}

fn estimated_box(position: Point) -> Rect {
    Rect::from_origin_size(position, (NODE_WIDTH, NODE_HEIGHT))
}

fn overlaps_any(candidate: Rect, boxes: &[Rect]) -> bool {
    boxes
        .iter()
        .any(|b| crate::geometry::boxes_overlap(candidate, *b))
}

fn star_burst_position(center: Point, index: usize, total: usize) -> Point {
    let angle = (index as f64 / total.max(1) as f64) * std::f64::consts::TAU;
    Point::new(
        center.x + angle.cos() * STAR_BURST_RADIUS,
        center.y + angle.sin() * STAR_BURST_RADIUS,
    )
}

/// Position for a new child of `parent`.
///
/// Children of the root fan out on a circle; the angle is recomputed from
/// the live child count, so earlier siblings keep their (possibly moved)
/// spots while new ones land on fresh spokes. Deeper children stack to the
/// right of the parent, nudged down until they clear their siblings.
fn child_position(
    parent: &BoardItem,
    siblings: &[&BoardItem],
    is_root_child: bool,
    root_child_index: usize,
    total_root_children: usize,
) -> Point {
    if is_root_child {
        return star_burst_position(parent.position, root_child_index, total_root_children);
    }

    let base_x = parent.position.x + HORIZONTAL_SPACING;
    if siblings.is_empty() {
        return Point::new(base_x, parent.position.y);
    }

    let sibling_boxes: Vec<Rect> = siblings.iter().map(|s| node_box(s)).collect();
    let lowest = sibling_boxes
        .iter()
        .copied()
        .reduce(|lowest, b| if b.y1 > lowest.y1 { b } else { lowest })
        .unwrap_or_default();

    let mut candidate_y = lowest.y1 + VERTICAL_SPACING;
    while overlaps_any(estimated_box(Point::new(base_x, candidate_y)), &sibling_boxes) {
        candidate_y += COLLISION_NUDGE;
    }
    Point::new(base_x, candidate_y)
}

fn sibling_position(
    current: &BoardItem,
    siblings: &[&BoardItem],
    parent: Option<&BoardItem>,
    is_root_sibling: bool,
    branch_index: usize,
    total_root_children: usize,
) -> Point {
    if is_root_sibling {
        if let Some(parent) = parent {
            return star_burst_position(
                parent.position,
                branch_index + 1,
                total_root_children + 1,
            );
        }
    }

    let current_box = node_box(current);
    let sibling_boxes: Vec<Rect> = siblings.iter().map(|s| node_box(s)).collect();
    let mut candidate_y = current_box.y1 + VERTICAL_SPACING;
    while overlaps_any(
        estimated_box(Point::new(current.position.x, candidate_y)),
        &sibling_boxes,
    ) {
        candidate_y += COLLISION_NUDGE;
    }
    Point::new(current.position.x, candidate_y)
}

/// Create the central node of a new mind map.
pub fn create_root(board: &mut BoardData, position: Point) -> ItemId {
    let root = BoardItem::new(ItemType::Note, position, "Central Idea")
        .with_size(300.0, 100.0)
        .with_style(ItemStyle::new(FontSize::Xl, FontWeight::Bold, TextAlign::Center));
    board.add_item(root)
}

/// Add a child node under `parent_id`, placed and styled by depth.
pub fn add_child(board: &mut BoardData, parent_id: ItemId) -> Result<ItemId, MindMapError> {
    let parent = board.item(parent_id).cloned().ok_or(MindMapError::MissingNode)?;

    let is_root_child = root_node(&board.items, &board.connections)
        .map(|r| r.id == parent_id)
        .unwrap_or(false);

    let child_ids: Vec<ItemId> = board
        .connections
        .iter()
        .filter(|c| c.from_id == parent_id)
        .map(|c| c.to_id)
        .collect();
    let siblings: Vec<&BoardItem> = board
        .items
        .iter()
        .filter(|i| child_ids.contains(&i.id))
        .collect();

    let total_root_children = root_node(&board.items, &board.connections)
        .map(|r| {
            board
                .connections
                .iter()
                .filter(|c| c.from_id == r.id)
                .count()
        })
        .unwrap_or(0);

    let position = child_position(
        &parent,
        &siblings,
        is_root_child,
        siblings.len(),
        total_root_children + 1,
    );

    let depth = depth_of(parent_id, &board.connections) + 1;
    let branch = branch_index_of(parent_id, &board.items, &board.connections);
    let (style, color) = node_style(depth, branch_color(branch));

    let child = BoardItem::new(ItemType::Note, position, "New Idea")
        .with_size(NODE_WIDTH, NODE_HEIGHT)
        .with_color(color)
        .with_style(style);
    let child_id = board.add_item(child);
    board.add_connection(parent_id, child_id);
    Ok(child_id)
}

/// Add a sibling after `current_id`. Fails on the root, which has no parent.
pub fn add_sibling(board: &mut BoardData, current_id: ItemId) -> Result<ItemId, MindMapError> {
    let current = board.item(current_id).cloned().ok_or(MindMapError::MissingNode)?;
    let parent_id =
        parent_of(current_id, &board.connections).ok_or(MindMapError::RootHasNoSiblings)?;
    let parent = board.item(parent_id).cloned();

    let root = root_node(&board.items, &board.connections);
    let is_root_sibling = parent.as_ref().map(|p| p.id) == root.map(|r| r.id);
    let total_root_children = root
        .map(|r| {
            board
                .connections
                .iter()
                .filter(|c| c.from_id == r.id)
                .count()
        })
        .unwrap_or(0);

    let sibling_ids: Vec<ItemId> = board
        .connections
        .iter()
        .filter(|c| c.from_id == parent_id && c.to_id != current_id)
        .map(|c| c.to_id)
        .collect();
    let siblings: Vec<&BoardItem> = board
        .items
        .iter()
        .filter(|i| sibling_ids.contains(&i.id))
        .collect();

    let branch = branch_index_of(current_id, &board.items, &board.connections);
    let position = sibling_position(
        &current,
        &siblings,
        parent.as_ref(),
        is_root_sibling,
        branch,
        total_root_children,
    );

    let depth = depth_of(current_id, &board.connections);
    let (style, color) = node_style(depth, branch_color(branch));

    let sibling = BoardItem::new(ItemType::Note, position, "New Idea")
        .with_size(NODE_WIDTH, NODE_HEIGHT)
        .with_color(color)
        .with_style(style);
    let sibling_id = board.add_item(sibling);
    board.add_connection(parent_id, sibling_id);
    Ok(sibling_id)
}

/// Arrow-key navigation over the tree. Returns the node to select, or
/// `None` when there is nothing in that direction.
pub fn navigate(
    current_id: ItemId,
    connections: &[Connection],
    direction: NavDirection,
) -> Option<ItemId> {
    match direction {
        NavDirection::Child => connections
            .iter()
            .find(|c| c.from_id == current_id)
            .map(|c| c.to_id),
        NavDirection::Parent => parent_of(current_id, connections),
        NavDirection::NextSibling | NavDirection::PrevSibling => {
            let parent = parent_of(current_id, connections)?;
            let siblings: Vec<ItemId> = connections
                .iter()
                .filter(|c| c.from_id == parent)
                .map(|c| c.to_id)
                .collect();
            let index = siblings.iter().position(|&s| s == current_id)?;
            match direction {
                NavDirection::NextSibling => siblings.get(index + 1).copied(),
                _ => index.checked_sub(1).and_then(|i| siblings.get(i).copied()),
            }
        }
    }
}
