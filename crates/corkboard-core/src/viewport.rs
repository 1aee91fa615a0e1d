//! Pan/zoom viewport and screen/world conversion.
//!
//! `world = (screen - pan) / zoom`. Pan is stored in screen pixels.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Wheel zoom bounds (10% to 500%).
pub const WHEEL_ZOOM_MIN: f64 = 0.1;
pub const WHEEL_ZOOM_MAX: f64 = 5.0;

/// Zoom button bounds (20% to 200%) and step.
pub const BUTTON_ZOOM_MIN: f64 = 0.2;
pub const BUTTON_ZOOM_MAX: f64 = 2.0;
pub const BUTTON_ZOOM_STEP: f64 = 0.1;

/// Arrow-key pan step in screen pixels; tripled while shift is held.
pub const PAN_STEP: f64 = 50.0;
pub const PAN_FAST_MULTIPLIER: f64 = 3.0;

/// Arrow-key pan direction. Panning moves the viewport, so the content
/// shifts the opposite way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

/// The camera: screen-space pan offset plus zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.pan.x,
            world.y * self.zoom + self.pan.y,
        )
    }

    /// Wheel zoom by one tick toward or away from the cursor.
    ///
    /// The world point under `cursor` (screen coordinates) stays put:
    /// `pan' = cursor - (cursor - pan) * (zoom' / zoom)`.
    pub fn wheel_zoom(&mut self, cursor: Point, zoom_in: bool) {
        let delta = if zoom_in { 1.1 } else { 0.9 };
        let new_zoom = (self.zoom * delta).clamp(WHEEL_ZOOM_MIN, WHEEL_ZOOM_MAX);
        let ratio = new_zoom / self.zoom;
        self.pan = Vec2::new(
            cursor.x - (cursor.x - self.pan.x) * ratio,
            cursor.y - (cursor.y - self.pan.y) * ratio,
        );
        self.zoom = new_zoom;
    }

    /// Zoom button step in. Pan is unchanged, so the screen origin is the
    /// fixed point.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + BUTTON_ZOOM_STEP).clamp(BUTTON_ZOOM_MIN, BUTTON_ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - BUTTON_ZOOM_STEP).clamp(BUTTON_ZOOM_MIN, BUTTON_ZOOM_MAX);
    }

    /// Translate by a screen-space delta (drag panning).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Arrow-key panning. Pressing Up increases pan.y, which moves the
    /// content down and reveals what is above the viewport.
    pub fn arrow_pan(&mut self, direction: PanDirection, fast: bool) {
        let step = if fast {
            PAN_STEP * PAN_FAST_MULTIPLIER
        } else {
            PAN_STEP
        };
        let delta = match direction {
            PanDirection::Up => Vec2::new(0.0, step),
            PanDirection::Down => Vec2::new(0.0, -step),
            PanDirection::Left => Vec2::new(step, 0.0),
            PanDirection::Right => Vec2::new(-step, 0.0),
        };
        self.pan += delta;
    }

    /// Jump back to the origin at 100%.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
