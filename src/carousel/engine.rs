//! The carousel engine: one window, one physics integrator and one pointer tracker,
//! kept in lockstep. Every call that moves the ring reconciles the window and
//! republishes the frame before it returns.

use super::is_valid_rotation;
use super::physics::{Phase, Physics, RotationState, StepOutcome};
use super::pointer::{self, Gesture, Point, PointerPhase, PointerTracker};
use super::projection::{Viewport, VisibleItem, project};
use super::window::Window;
use crate::catalog::CatalogIndex;
use crate::config::CarouselConfig;
use crate::error::Result;
use std::time::Duration;

/// Receives the carousel's outward notifications.
pub trait CarouselObserver {
    /// A cover was tapped.
    fn on_select(&mut self, _index: CatalogIndex) {}

    /// The ring moved, by drag or by glide.
    fn on_rotation_changed(&mut self, _rotation: f64) {}
}

/// Observer for callers that only poll.
pub struct NoOpObserver;

impl CarouselObserver for NoOpObserver {}

#[derive(Debug, Clone)]
pub struct Carousel {
    config: CarouselConfig,
    window: Window,
    physics: Physics,
    pointer: PointerTracker,
    viewport: Viewport,
    frame: Vec<VisibleItem>,
}

impl Carousel {
    pub fn new(catalog_size: usize, config: CarouselConfig) -> Result<Self> {
        Self::with_rotation(catalog_size, config, 0.0)
    }

    /// Starts at `rotation`, e.g. one restored from a previous session.
    pub fn with_rotation(catalog_size: usize, config: CarouselConfig, rotation: f64) -> Result<Self> {
        let rotation = if is_valid_rotation(rotation) {
            rotation
        } else {
            log::warn!("ignoring out-of-range start rotation {rotation}");
            0.0
        };
        let window =
            Window::initialize_around(catalog_size, &config, rotation, CatalogIndex::default())?;

        let mut carousel = Self {
            physics: Physics::new(rotation, &config),
            pointer: PointerTracker::new(),
            viewport: Viewport::default(),
            frame: Vec::with_capacity(config.max_visible),
            window,
            config,
        };
        carousel.publish();
        Ok(carousel)
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Swaps in a new configuration. Nothing changes if it fails validation.
    ///
    /// A new `angle_step` rebuilds the window on the new grid, keeping the album that
    /// faced the camera in front.
    pub fn reconfigure(
        &mut self,
        config: CarouselConfig,
        observer: &mut impl CarouselObserver,
    ) -> Result<()> {
        config.validate()?;

        let rotation = self.physics.rotation();
        if config.angle_step != self.config.angle_step {
            let facing = self.center_item().unwrap_or_default();
            let slot = (-rotation / config.angle_step).round() as i64;
            let reference = facing.offset(-slot, self.window.catalog_size());
            self.window =
                Window::initialize_around(self.window.catalog_size(), &config, rotation, reference)?;
            self.physics.retarget(config.angle_step);
            log::info!(
                "angle step {} -> {}, window rebuilt around {}",
                self.config.angle_step,
                config.angle_step,
                facing
            );
        }
        self.physics.set_velocity_samples(config.velocity_samples);
        self.config = config;
        self.sync(observer);
        Ok(())
    }

    /// Jumps to `rotation`, dropping any drag or glide.
    pub fn reset(&mut self, rotation: f64, observer: &mut impl CarouselObserver) {
        if !is_valid_rotation(rotation) {
            log::warn!("ignoring reset to out-of-range rotation {rotation}");
            return;
        }
        self.pointer = PointerTracker::new();
        self.physics.reset(rotation);
        self.sync(observer);
    }

    /// Stops all motion where it is. Safe to call before tearing the host down.
    pub fn halt(&mut self) {
        self.pointer = PointerTracker::new();
        self.physics.halt();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn press(&mut self, pos: Point, at: Duration, observer: &mut impl CarouselObserver) {
        if self.pointer.phase() != PointerPhase::Idle {
            self.cancel(at, observer);
        }
        self.pointer.press(pos, at);
        self.physics.begin_drag();
    }

    pub fn pointer_move(&mut self, pos: Point, at: Duration, observer: &mut impl CarouselObserver) {
        if let Gesture::Rotate { delta_degrees, dt } = self.pointer.moved(pos, at, &self.config) {
            self.rotate_by(delta_degrees, dt, observer);
        }
    }

    pub fn release(&mut self, pos: Point, at: Duration, observer: &mut impl CarouselObserver) {
        match self.pointer.release(pos, at) {
            Gesture::Tap(pos) => {
                let item_size = self.viewport.item_size(self.config.cover_scale);
                let hit = pointer::hit_test(
                    &self.frame,
                    pos,
                    self.viewport,
                    item_size,
                    self.config.perspective,
                );
                if let Some(index) = hit {
                    log::info!("selected catalog index {index}");
                    observer.on_select(index);
                }
                self.release_drag(observer);
            }
            Gesture::DragEnd => self.release_drag(observer),
            Gesture::None | Gesture::Rotate { .. } => {}
        }
    }

    pub fn cancel(&mut self, at: Duration, observer: &mut impl CarouselObserver) {
        self.pointer.cancel(at);
        self.release_drag(observer);
    }

    /// Rotates by `delta_px` of horizontal pointer travel observed over `dt` seconds.
    pub fn apply_drag_delta(
        &mut self,
        delta_px: f64,
        dt: f64,
        observer: &mut impl CarouselObserver,
    ) {
        self.rotate_by(delta_px * self.config.sensitivity, dt, observer);
    }

    /// Ends a drag and starts the glide toward the nearest detent.
    pub fn release_drag(&mut self, _observer: &mut impl CarouselObserver) {
        if self.physics.phase() == Phase::Dragging {
            self.physics.end_drag(self.config.angle_step);
        }
    }

    /// Advances the glide by `dt` seconds. The host calls this once per display refresh
    /// while [`is_animating`](Self::is_animating).
    pub fn tick(&mut self, dt: f64, observer: &mut impl CarouselObserver) -> StepOutcome {
        let outcome = self.physics.step(dt, &self.config);
        if outcome != StepOutcome::Unchanged {
            self.sync(observer);
        }
        outcome
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.physics.phase(), Phase::Settling | Phase::Snapped)
    }

    pub fn state(&self) -> RotationState {
        self.physics.state()
    }

    pub fn rotation(&self) -> f64 {
        self.physics.rotation()
    }

    pub fn velocity(&self) -> f64 {
        self.physics.state().velocity
    }

    pub fn target_rotation(&self) -> f64 {
        self.physics.state().target_rotation
    }

    pub fn phase(&self) -> Phase {
        self.physics.phase()
    }

    pub fn pointer_phase(&self) -> PointerPhase {
        self.pointer.phase()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The last published frame, left to right.
    pub fn visible_window(&self) -> &[VisibleItem] {
        &self.frame
    }

    /// The album currently facing the camera.
    pub fn center_item(&self) -> Option<CatalogIndex> {
        self.window
            .nearest_to_center(self.physics.rotation())
            .map(|item| item.catalog_index)
    }

    fn rotate_by(&mut self, delta_degrees: f64, dt: f64, observer: &mut impl CarouselObserver) {
        if !delta_degrees.is_finite()
            || !is_valid_rotation(self.physics.rotation() + delta_degrees)
        {
            log::debug!("dropping drag delta {delta_degrees}");
            return;
        }
        self.physics.drag(delta_degrees, dt);
        self.sync(observer);
    }

    fn sync(&mut self, observer: &mut impl CarouselObserver) {
        let rotation = self.physics.rotation();
        self.window.reconcile(rotation, &self.config);
        self.publish();
        observer.on_rotation_changed(rotation);
    }

    fn publish(&mut self) {
        let rotation = self.physics.rotation();
        self.frame.clear();
        self.frame.extend(self.window.iter().map(|item| VisibleItem {
            catalog_index: item.catalog_index,
            transform: project(item, rotation, &self.config),
        }));
    }
}
