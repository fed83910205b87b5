//! The bounded window of ring slots currently materialized around the camera.
//!
//! Slots sit on a fixed angular grid: slot `k` has base angle `k * angle_step` and shows
//! catalog entry `reference + k (mod N)`. Every item in a window is one such slot, so
//! identity and ordering survive any sequence of rotations without drift.

use super::ANGLE_EPSILON;
use crate::catalog::CatalogIndex;
use crate::config::CarouselConfig;
use crate::error::{CarouselError, Result};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub catalog_index: CatalogIndex,
    pub base_angle: f64,
}

impl Item {
    pub fn effective_angle(&self, rotation: f64) -> f64 {
        self.base_angle + rotation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Items ordered by base angle, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    items: VecDeque<Item>,
    catalog_size: usize,
    angle_step: f64,
    reference: CatalogIndex,
}

impl Window {
    /// Builds the window for rotation 0 with catalog entry 0 facing the camera.
    pub fn initialize(catalog_size: usize, config: &CarouselConfig) -> Result<Self> {
        Self::initialize_around(catalog_size, config, 0.0, CatalogIndex::default())
    }

    /// Builds the window for `rotation`, where the slot at base angle 0 shows `reference`.
    pub fn initialize_around(
        catalog_size: usize,
        config: &CarouselConfig,
        rotation: f64,
        reference: CatalogIndex,
    ) -> Result<Self> {
        if catalog_size == 0 {
            return Err(CarouselError::InvalidCatalog);
        }
        config.validate()?;

        let mut window = Self {
            items: VecDeque::with_capacity(config.max_visible + 1),
            catalog_size,
            angle_step: config.angle_step,
            reference: CatalogIndex::new(reference.get() % catalog_size),
        };
        window.seed(rotation, config);
        window.fill(rotation, config);
        Ok(window)
    }

    /// Brings the window in line with `rotation`.
    ///
    /// Returns `true` when the ordered item sequence changed, so callers can skip
    /// redundant re-renders.
    pub fn reconcile(&mut self, rotation: f64, config: &CarouselConfig) -> bool {
        debug_assert_eq!(self.angle_step, config.angle_step, "stale angle grid");

        let before = self.items.clone();

        self.items
            .retain(|item| Self::in_bounds(item, rotation, config));
        let evicted = before.len() - self.items.len();

        if self.items.is_empty() {
            self.seed(rotation, config);
        }
        self.trim(rotation, config.max_visible);
        self.fill(rotation, config);

        let changed = self.items != before;
        if changed {
            log::debug!(
                "window: {} items after evicting {} at rotation {:.2}",
                self.items.len(),
                evicted,
                rotation
            );
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog_size
    }

    pub fn angle_step(&self) -> f64 {
        self.angle_step
    }

    pub fn reference(&self) -> CatalogIndex {
        self.reference
    }

    pub fn catalog_indices(&self) -> Vec<CatalogIndex> {
        self.items.iter().map(|i| i.catalog_index).collect()
    }

    /// The item whose effective angle is closest to the camera's forward axis.
    pub fn nearest_to_center(&self, rotation: f64) -> Option<&Item> {
        self.items.iter().min_by(|a, b| {
            a.effective_angle(rotation)
                .abs()
                .total_cmp(&b.effective_angle(rotation).abs())
        })
    }

    fn in_bounds(item: &Item, rotation: f64, config: &CarouselConfig) -> bool {
        let angle = item.effective_angle(rotation);
        angle >= config.min_angle - ANGLE_EPSILON && angle <= config.max_angle + ANGLE_EPSILON
    }

    fn slot(&self, k: i64) -> Item {
        Item {
            catalog_index: self.reference.offset(k, self.catalog_size),
            base_angle: k as f64 * self.angle_step,
        }
    }

    fn slot_of(&self, item: &Item) -> i64 {
        (item.base_angle / self.angle_step).round() as i64
    }

    /// The next slot outward on `side`, or `None` at the end of the representable grid.
    fn neighbor(&self, side: Side) -> Option<Item> {
        let k = match side {
            Side::Left => self.slot_of(self.items.front()?).checked_sub(1)?,
            Side::Right => self.slot_of(self.items.back()?).checked_add(1)?,
        };
        Some(self.slot(k))
    }

    /// Places the single slot nearest the centre of the visible cone.
    fn seed(&mut self, rotation: f64, config: &CarouselConfig) {
        let focus = 0.0_f64.clamp(config.min_angle, config.max_angle);
        let k = ((focus - rotation) / self.angle_step).round() as i64;
        self.items.push_back(self.slot(k));
    }

    /// Grows the window outward, nearest slot first, while free slots lie in bounds.
    /// At capacity a nearer slot may still displace the far edge.
    fn fill(&mut self, rotation: f64, config: &CarouselConfig) {
        let in_bounds = |item: &Item| Self::in_bounds(item, rotation, config);
        let distance = |item: &Item| item.effective_angle(rotation).abs();

        loop {
            let left = self.neighbor(Side::Left).filter(in_bounds);
            let right = self.neighbor(Side::Right).filter(in_bounds);

            let (side, candidate) = match (left, right) {
                (Some(l), Some(r)) if distance(&r) < distance(&l) => (Side::Right, r),
                (Some(l), _) => (Side::Left, l),
                (None, Some(r)) => (Side::Right, r),
                (None, None) => break,
            };

            if self.items.len() >= config.max_visible {
                let far_edge = self.far_edge_distance(rotation);
                if distance(&candidate) >= far_edge - ANGLE_EPSILON {
                    break;
                }
            }

            match side {
                Side::Left => self.items.push_front(candidate),
                Side::Right => self.items.push_back(candidate),
            }
            self.trim(rotation, config.max_visible);
        }
    }

    fn far_edge_distance(&self, rotation: f64) -> f64 {
        let front = self.items.front().map(|i| i.effective_angle(rotation).abs());
        let back = self.items.back().map(|i| i.effective_angle(rotation).abs());
        front.into_iter().chain(back).fold(0.0, f64::max)
    }

    /// Drops the items furthest from centre until the window fits `max_visible`.
    fn trim(&mut self, rotation: f64, max_visible: usize) {
        while self.items.len() > max_visible {
            let furthest = self
                .items
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    a.effective_angle(rotation)
                        .abs()
                        .total_cmp(&b.effective_angle(rotation).abs())
                })
                .map(|(i, _)| i);

            match furthest {
                Some(i) => {
                    self.items.remove(i);
                }
                None => break,
            }
        }
    }
}
