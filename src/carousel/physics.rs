//! Drag tracking and the post-release spring-damper glide.
//!
//! The glide is a first-order control law rather than a mass-spring model:
//! velocity decays exponentially (`damping`) while a proportional pull
//! (`spring_strength`) drags rotation toward the nearest detent. Both constants are
//! scaled by a fixed reference `frame_rate` so they behave the same at any real
//! refresh rate.

use super::snap_to_grid;
use crate::config::CarouselConfig;
use std::collections::VecDeque;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum Phase {
    #[default]
    Idle,
    Dragging,
    Settling,
    /// Landed on a detent this cycle. Becomes `Idle` on the next step.
    Snapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub rotation: f64,
    pub target_rotation: f64,
    /// Degrees per second.
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Unchanged,
    Moved,
    Snapped,
}

/// Trailing average of the most recent drag velocities.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl VelocityTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `delta` degrees moved over `dt` seconds. Samples without elapsed time are
    /// dropped since they carry no rate.
    pub fn record(&mut self, delta: f64, dt: f64) {
        if !(dt > 0.0 && dt.is_finite() && delta.is_finite()) {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(delta / dt);
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Physics {
    state: RotationState,
    phase: Phase,
    tracker: VelocityTracker,
    settle_elapsed: f64,
}

impl Physics {
    pub fn new(rotation: f64, config: &CarouselConfig) -> Self {
        Self {
            state: RotationState {
                rotation,
                target_rotation: rotation,
                velocity: 0.0,
            },
            phase: Phase::Idle,
            tracker: VelocityTracker::new(config.velocity_samples),
            settle_elapsed: 0.0,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rotation(&self) -> f64 {
        self.state.rotation
    }

    pub fn is_settling(&self) -> bool {
        self.phase == Phase::Settling
    }

    /// Takes direct control. Any glide in progress is dropped where it stands.
    pub fn begin_drag(&mut self) {
        if self.phase == Phase::Settling {
            log::debug!("glide interrupted at {:.2}", self.state.rotation);
        }
        self.phase = Phase::Dragging;
        self.state.velocity = 0.0;
        self.state.target_rotation = self.state.rotation;
        self.tracker.clear();
        self.settle_elapsed = 0.0;
    }

    /// Applies a drag delta 1:1 and feeds the velocity estimate. Returns the new rotation.
    pub fn drag(&mut self, delta: f64, dt: f64) -> f64 {
        if self.phase != Phase::Dragging {
            self.begin_drag();
        }
        if delta.is_finite() {
            self.state.rotation += delta;
            self.state.target_rotation = self.state.rotation;
        }
        self.tracker.record(delta, dt);
        self.state.velocity = self.tracker.average();
        self.state.rotation
    }

    /// Releases the drag: aims at the nearest detent and glides with the smoothed velocity.
    pub fn end_drag(&mut self, angle_step: f64) {
        self.state.target_rotation = snap_to_grid(self.state.rotation, angle_step);
        self.state.velocity = self.tracker.average();
        self.tracker.clear();
        self.settle_elapsed = 0.0;
        self.phase = Phase::Settling;
        log::debug!(
            "release at {:.2} toward {:.2} with {:.2} deg/s",
            self.state.rotation,
            self.state.target_rotation,
            self.state.velocity
        );
    }

    /// Moves the glide target onto a new detent grid. Only meaningful while settling.
    pub fn retarget(&mut self, angle_step: f64) {
        if self.phase == Phase::Settling {
            self.state.target_rotation = snap_to_grid(self.state.target_rotation, angle_step);
        }
    }

    /// Advances the glide by `dt` seconds.
    pub fn step(&mut self, dt: f64, config: &CarouselConfig) -> StepOutcome {
        match self.phase {
            Phase::Settling => {}
            Phase::Snapped => {
                self.phase = Phase::Idle;
                return StepOutcome::Unchanged;
            }
            Phase::Idle | Phase::Dragging => return StepOutcome::Unchanged,
        }

        if self.is_settled(config) {
            return self.snap();
        }

        let dt = clamp_frame_time(dt, config.max_frame_time);
        if dt == 0.0 {
            return StepOutcome::Unchanged;
        }

        let state = &mut self.state;
        let distance = state.target_rotation - state.rotation;
        let spring_force = if config.spring_strength > 0.0 {
            distance * config.spring_strength * config.frame_rate
        } else {
            0.0
        };
        let damping_factor = (-config.damping * config.frame_rate * dt).exp();

        state.velocity = state.velocity * damping_factor + spring_force * dt;
        state.rotation += state.velocity * dt;
        self.settle_elapsed += dt;

        log::trace!(
            "step dt={:.4} rotation={:.3} velocity={:.3}",
            dt,
            state.rotation,
            state.velocity
        );

        if config.spring_strength <= 0.0 && state.velocity.abs() < config.min_velocity {
            // Coasted to a stop with nothing pulling: settle on the nearest detent.
            state.target_rotation = snap_to_grid(state.rotation, config.angle_step);
            return self.snap();
        }

        if self.is_settled(config) {
            return self.snap();
        }
        // Without damping nothing bleeds off energy, so only a deadline ends the glide.
        if config.damping <= 0.0 && self.settle_elapsed >= config.max_settle_time {
            log::warn!(
                "undamped glide still moving after {:.1}s, forcing snap",
                config.max_settle_time
            );
            if config.spring_strength <= 0.0 {
                self.state.target_rotation = snap_to_grid(self.state.rotation, config.angle_step);
            }
            return self.snap();
        }
        StepOutcome::Moved
    }

    /// Stops any motion in place without snapping.
    pub fn halt(&mut self) {
        self.phase = Phase::Idle;
        self.state.velocity = 0.0;
        self.state.target_rotation = self.state.rotation;
        self.tracker.clear();
        self.settle_elapsed = 0.0;
    }

    pub fn reset(&mut self, rotation: f64) {
        self.state = RotationState {
            rotation,
            target_rotation: rotation,
            velocity: 0.0,
        };
        self.phase = Phase::Idle;
        self.tracker.clear();
        self.settle_elapsed = 0.0;
    }

    pub fn set_velocity_samples(&mut self, samples: usize) {
        self.tracker.resize(samples);
    }

    fn is_settled(&self, config: &CarouselConfig) -> bool {
        (self.state.target_rotation - self.state.rotation).abs() < config.snap_threshold
            && self.state.velocity.abs() < config.min_velocity
    }

    fn snap(&mut self) -> StepOutcome {
        self.state.rotation = self.state.target_rotation;
        self.state.velocity = 0.0;
        self.settle_elapsed = 0.0;
        self.phase = Phase::Snapped;
        log::info!("snapped to {:.2}", self.state.rotation);
        StepOutcome::Snapped
    }
}

/// Zero for stalled or nonsensical clocks, capped at `max` after a long stall.
fn clamp_frame_time(dt: f64, max: f64) -> f64 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max)
    }
}
