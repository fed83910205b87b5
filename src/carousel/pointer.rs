//! Turns raw press/move/release events into rotation gestures or taps.

use super::projection::{Viewport, VisibleItem};
use crate::catalog::CatalogIndex;
use crate::config::CarouselConfig;
use std::time::Duration;
use strum::Display as StrumDisplay;

/// Viewport pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum PointerPhase {
    #[default]
    Idle,
    /// Down, but not yet past the drag threshold.
    Pressed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    None,
    /// Rotate by `delta_degrees`, observed over `dt` seconds.
    Rotate { delta_degrees: f64, dt: f64 },
    /// Released without travelling past the threshold.
    Tap(Point),
    DragEnd,
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    phase: PointerPhase,
    start: Point,
    last: Point,
    last_time: Duration,
    travel: f64,
    captured: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Cumulative horizontal travel since the press, in pixels.
    pub fn travel(&self) -> f64 {
        self.travel
    }

    pub fn press(&mut self, pos: Point, at: Duration) {
        self.phase = PointerPhase::Pressed;
        self.start = pos;
        self.last = pos;
        self.last_time = at;
        self.travel = 0.0;
        self.captured = true;
    }

    pub fn moved(&mut self, pos: Point, at: Duration, config: &CarouselConfig) -> Gesture {
        if self.phase == PointerPhase::Idle {
            return Gesture::None;
        }

        let dx = pos.x - self.last.x;
        let dt = at.saturating_sub(self.last_time).as_secs_f64();
        self.travel += dx.abs();
        self.last = pos;
        self.last_time = at;

        match self.phase {
            PointerPhase::Pressed if self.travel > config.drag_threshold => {
                self.phase = PointerPhase::Dragging;
                // The travel spent crossing the threshold still turns the ring.
                Gesture::Rotate {
                    delta_degrees: (pos.x - self.start.x) * config.sensitivity,
                    dt,
                }
            }
            PointerPhase::Dragging => Gesture::Rotate {
                delta_degrees: dx * config.sensitivity,
                dt,
            },
            _ => Gesture::None,
        }
    }

    pub fn release(&mut self, pos: Point, _at: Duration) -> Gesture {
        let gesture = match self.phase {
            PointerPhase::Idle => Gesture::None,
            PointerPhase::Pressed => Gesture::Tap(pos),
            PointerPhase::Dragging => Gesture::DragEnd,
        };
        self.finish();
        gesture
    }

    /// Aborts the interaction. Only a real drag needs winding down.
    pub fn cancel(&mut self, _at: Duration) -> Gesture {
        let gesture = match self.phase {
            PointerPhase::Dragging => Gesture::DragEnd,
            PointerPhase::Idle | PointerPhase::Pressed => Gesture::None,
        };
        self.finish();
        gesture
    }

    fn finish(&mut self) {
        self.phase = PointerPhase::Idle;
        self.captured = false;
        self.travel = 0.0;
    }
}

/// Finds the cover drawn under `pos` in a published frame. Overlaps go to the highest
/// `z_index`.
///
/// Each transform is seen through a camera `perspective` pixels in front of the `z = 0`
/// plane, so a cover at depth `z` appears scaled by `p / (p - z)` about the viewport
/// centre. A non-positive `perspective` means an orthographic view.
pub fn hit_test(
    frame: &[VisibleItem],
    pos: Point,
    viewport: Viewport,
    item_size: f64,
    perspective: f64,
) -> Option<CatalogIndex> {
    let center_x = viewport.width / 2.0;
    let center_y = viewport.height / 2.0;

    frame
        .iter()
        .filter(|item| {
            let t = &item.transform;
            let Some(depth) = depth_scale(t.z, perspective) else {
                return false;
            };

            // Undo the projection, then the tilts, then the in-plane spin.
            let dx = (pos.x - center_x) / depth - t.x;
            let dy = (pos.y - center_y) / depth - t.y;
            let tilt_x = t.rotate_y.to_radians().cos().abs();
            let tilt_y = t.rotate_x.to_radians().cos().abs();
            if tilt_x < f64::EPSILON || tilt_y < f64::EPSILON {
                return false;
            }
            let (sx, sy) = (dx / tilt_x, dy / tilt_y);
            let (sin, cos) = t.rotate_z.to_radians().sin_cos();
            let u = sx * cos + sy * sin;
            let v = -sx * sin + sy * cos;

            let half = item_size / 2.0 * t.scale;
            u.abs() <= half && v.abs() <= half
        })
        .max_by_key(|item| item.transform.z_index)
        .map(|item| item.catalog_index)
}

fn depth_scale(z: f64, perspective: f64) -> Option<f64> {
    if !(perspective > 0.0 && perspective.is_finite()) {
        return Some(1.0);
    }
    let distance = perspective - z;
    (distance > 0.0).then(|| perspective / distance)
}
