//! End-to-end interaction scenarios driven through the public engine API.

use album_carousel::carousel::{
    Carousel, CarouselObserver, NoOpObserver, Phase, Point, StepOutcome,
};
use album_carousel::catalog::CatalogIndex;
use album_carousel::config::CarouselConfig;
use proptest::prelude::*;
use std::time::Duration;

const FRAME: f64 = 1.0 / 60.0;

#[derive(Default)]
struct Recorder {
    selected: Vec<CatalogIndex>,
    rotation_changes: usize,
}

impl CarouselObserver for Recorder {
    fn on_select(&mut self, index: CatalogIndex) {
        self.selected.push(index);
    }

    fn on_rotation_changed(&mut self, _rotation: f64) {
        self.rotation_changes += 1;
    }
}

fn eight_degree_grid() -> CarouselConfig {
    CarouselConfig {
        angle_step: 8.0,
        min_angle: -45.0,
        max_angle: 45.0,
        max_visible: 25,
        ..CarouselConfig::default()
    }
}

fn indices(carousel: &Carousel) -> Vec<usize> {
    carousel
        .visible_window()
        .iter()
        .map(|item| item.catalog_index.get())
        .collect()
}

/// Ticks until the glide is over. Returns the number of frames.
fn run_to_rest(carousel: &mut Carousel, observer: &mut impl CarouselObserver) -> usize {
    let mut frames = 0;
    while carousel.is_animating() {
        carousel.tick(FRAME, observer);
        frames += 1;
        assert!(frames < 10_000, "carousel never came to rest");
    }
    frames
}

#[test]
fn test_small_catalog_wraps_at_both_ends() {
    let carousel = Carousel::new(10, eight_degree_grid()).unwrap();

    assert_eq!(indices(&carousel), vec![5, 6, 7, 8, 9, 0, 1, 2, 3, 4, 5]);
    assert_eq!(carousel.center_item(), Some(CatalogIndex::new(0)));
}

#[test]
fn test_hundred_pixel_drag_fills_trailing_edge() {
    let mut carousel = Carousel::new(100, eight_degree_grid()).unwrap();
    let mut recorder = Recorder::default();

    carousel.apply_drag_delta(100.0, 0.1, &mut recorder);

    assert!((carousel.rotation() - 15.0).abs() < 1e-9);
    assert_eq!(recorder.rotation_changes, 1);

    let visible = indices(&carousel);
    assert_eq!(visible.len(), 11);
    assert_eq!(visible.first(), Some(&93));
    assert_eq!(visible.last(), Some(&3));
    for item in carousel.visible_window() {
        assert!(item.transform.opacity >= 0.6);
    }
}

#[test]
fn test_release_at_thirteen_lands_on_sixteen() {
    let config = CarouselConfig {
        sensitivity: 1.0,
        ..eight_degree_grid()
    };
    let mut carousel = Carousel::new(100, config).unwrap();
    let mut observer = NoOpObserver;

    carousel.apply_drag_delta(13.0, FRAME, &mut observer);
    carousel.release_drag(&mut observer);
    run_to_rest(&mut carousel, &mut observer);

    assert_eq!(carousel.rotation(), 16.0);
    assert_eq!(carousel.velocity(), 0.0);
    assert_eq!(carousel.phase(), Phase::Idle);
}

#[test]
fn test_tap_in_centre_selects_first_album() {
    let mut carousel = Carousel::new(40, CarouselConfig::default()).unwrap();
    let mut recorder = Recorder::default();
    let centre = Point::new(960.0, 540.0);

    carousel.press(centre, Duration::from_millis(10), &mut recorder);
    carousel.pointer_move(Point::new(962.0, 541.0), Duration::from_millis(20), &mut recorder);
    carousel.release(centre, Duration::from_millis(30), &mut recorder);
    run_to_rest(&mut carousel, &mut recorder);

    assert_eq!(recorder.selected, vec![CatalogIndex::new(0)]);
    assert_eq!(carousel.rotation(), 0.0);
}

#[test]
fn test_fling_then_grab_then_release() {
    let mut carousel = Carousel::new(60, eight_degree_grid()).unwrap();
    let mut recorder = Recorder::default();
    let ms = Duration::from_millis;

    carousel.press(Point::new(200.0, 540.0), ms(0), &mut recorder);
    for step in 1..=6u64 {
        let x = 200.0 + step as f64 * 40.0;
        carousel.pointer_move(Point::new(x, 540.0), ms(step * 16), &mut recorder);
    }
    carousel.release(Point::new(440.0, 540.0), ms(100), &mut recorder);
    for _ in 0..5 {
        carousel.tick(FRAME, &mut recorder);
    }
    assert_eq!(carousel.phase(), Phase::Settling);

    // Grabbing mid-glide freezes the ring until the next release.
    carousel.press(Point::new(440.0, 540.0), ms(200), &mut recorder);
    let held = carousel.rotation();
    assert_eq!(carousel.tick(FRAME, &mut recorder), StepOutcome::Unchanged);
    assert_eq!(carousel.rotation(), held);

    carousel.release(Point::new(440.0, 540.0), ms(300), &mut recorder);
    run_to_rest(&mut carousel, &mut recorder);

    let rest = carousel.rotation();
    assert_eq!(rest, (rest / 8.0).round() * 8.0);
    assert!(recorder.selected.len() <= 1);
}

#[test]
fn test_identical_input_gives_identical_frames() {
    let script = |carousel: &mut Carousel| {
        let mut observer = NoOpObserver;
        for delta in [12.0, 30.0, -4.0, 55.0, 7.5] {
            carousel.apply_drag_delta(delta, FRAME, &mut observer);
        }
        carousel.release_drag(&mut observer);
        run_to_rest(carousel, &mut observer);
    };

    let mut a = Carousel::new(33, CarouselConfig::default()).unwrap();
    let mut b = Carousel::new(33, CarouselConfig::default()).unwrap();
    script(&mut a);
    script(&mut b);

    assert_eq!(a.rotation(), b.rotation());
    assert_eq!(a.visible_window(), b.visible_window());
}

proptest! {
    /// Property: any release settles in finite time onto the nearest detent
    #[test]
    fn glide_settles_on_grid(
        step in 1.0f64..12.0,
        damping in 0.05f64..1.0,
        spring_strength in 0.05f64..1.0,
        drags in prop::collection::vec(-40.0f64..40.0, 1..8),
    ) {
        let config = CarouselConfig {
            angle_step: step,
            damping,
            spring_strength,
            ..CarouselConfig::default()
        };
        // Damped glides run to their natural stop; the slowest here lasts about 4000 frames.
        let limit = 6_000;
        let mut carousel = Carousel::new(50, config).unwrap();
        let mut observer = NoOpObserver;

        for px in drags {
            carousel.apply_drag_delta(px, FRAME, &mut observer);
        }
        carousel.release_drag(&mut observer);
        let target = carousel.target_rotation();
        prop_assert_eq!(target, (carousel.rotation() / step).round() * step);

        let mut frames = 0;
        while carousel.tick(FRAME, &mut observer) != StepOutcome::Snapped {
            frames += 1;
            prop_assert!(frames <= limit, "still gliding after {} frames", frames);
        }
        prop_assert_eq!(carousel.rotation(), target);
        prop_assert_eq!(carousel.velocity(), 0.0);
    }
}
