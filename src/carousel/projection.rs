use super::window::Item;
use super::{REFERENCE_HEIGHT, REFERENCE_WIDTH};
use crate::catalog::CatalogIndex;
use crate::config::{CarouselConfig, ViewMode};
use std::fmt;

/// Where and how to draw one cover. Translations are in pixels, rotations in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub rotate_z: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i32,
}

/// Renders as a CSS `transform` value.
impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate3d({:.2}px, {:.2}px, {:.2}px)",
            self.x, self.y, self.z
        )?;
        if self.rotate_x != 0.0 {
            write!(f, " rotateX({:.2}deg)", self.rotate_x)?;
        }
        write!(f, " rotateY({:.2}deg)", self.rotate_y)?;
        if self.rotate_z != 0.0 {
            write!(f, " rotateZ({:.2}deg)", self.rotate_z)?;
        }
        write!(f, " scale({:.3})", self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleItem {
    pub catalog_index: CatalogIndex,
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: REFERENCE_WIDTH,
            height: REFERENCE_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Edge length of one (unscaled) cover.
    pub fn item_size(&self, cover_scale: f64) -> f64 {
        (self.width * cover_scale).floor()
    }
}

/// Places `item` on the ring for the given rotation. Pure: no window or physics needed.
pub fn project(item: &Item, rotation: f64, config: &CarouselConfig) -> Transform {
    let angle = item.effective_angle(rotation);
    let abs_angle = angle.abs();
    let (sin, cos) = angle.to_radians().sin_cos();
    let radius = config.radius;

    let reach = config.max_angle.abs();
    let opacity = if reach > 0.0 {
        (1.0 - (abs_angle / reach) * 0.4).max(0.6)
    } else {
        0.6
    };
    let z_index = 1000 + ((config.max_angle - abs_angle) * 10.0).round() as i32;

    // linear blend over one slot, flat beyond
    let emphasis = (1.0 - abs_angle / config.angle_step).max(0.0);
    let scale = 1.0 + (config.central_scale - 1.0) * emphasis;

    let x = sin * radius;
    let base = Transform {
        x,
        scale,
        opacity,
        z_index,
        ..Transform::default()
    };

    match config.view_mode {
        ViewMode::Front => Transform {
            z: -cos * radius,
            rotate_y: -angle,
            ..base
        },
        ViewMode::Plan => {
            let (tilt_sin, tilt_cos) = config.plan_tilt.to_radians().sin_cos();
            // Measured from the front of the ring so the facing cover sits on screen centre.
            Transform {
                y: (cos - 1.0) * radius * tilt_sin,
                z: -cos * radius * tilt_cos,
                rotate_x: 90.0 - config.plan_tilt,
                rotate_z: -angle,
                ..base
            }
        }
    }
}
