pub mod engine;
pub mod physics;
pub mod pointer;
pub mod projection;
pub mod window;

pub use engine::{Carousel, CarouselObserver, NoOpObserver};
pub use physics::{Phase, Physics, RotationState, StepOutcome, VelocityTracker};
pub use pointer::{Gesture, Point, PointerPhase, PointerTracker};
pub use projection::{Transform, Viewport, VisibleItem, project};
pub use window::{Item, Window};

/// Slack for comparing angles that were built from sums of `angle_step`.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Largest rotation magnitude accepted from outside. Beyond it `f64` can no longer tell
/// neighbouring slots apart.
pub const MAX_ROTATION: f64 = 1e12;

/// Finite and within [`MAX_ROTATION`].
pub fn is_valid_rotation(rotation: f64) -> bool {
    rotation.is_finite() && rotation.abs() <= MAX_ROTATION
}

/// Default viewport until the host reports a real one.
pub const REFERENCE_WIDTH: f64 = 1920.0;
pub const REFERENCE_HEIGHT: f64 = 1080.0;

/// Rounds `angle` to the nearest multiple of `step`.
pub fn snap_to_grid(angle: f64, step: f64) -> f64 {
    (angle / step).round() * step
}
