use crate::assets::ResolutionTier;
use crate::catalog::DisplayKey;
use crate::error::ConfigViolation;
use crate::events::HostEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

// Display ranges for host-side sliders. The engine itself never clamps.
pub const MIN_RADIUS: f64 = 2000.0;
pub const MAX_RADIUS: f64 = 10000.0;
pub const MIN_COVER_SCALE: f64 = 0.15;
pub const MAX_COVER_SCALE: f64 = 0.9;
pub const MIN_CENTRAL_SCALE: f64 = 1.0;
pub const MAX_CENTRAL_SCALE: f64 = 2.0;
pub const MIN_PLAN_TILT: f64 = 45.0;
pub const MAX_PLAN_TILT: f64 = 90.0;
pub const MIN_PERSPECTIVE: f64 = 500.0;
pub const MAX_PERSPECTIVE: f64 = 5000.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Camera faces the ring, covers stand upright.
    #[default]
    #[strum(serialize = "front", serialize = "f")]
    Front,
    /// Top-down turntable view, tilted by `plan_tilt`.
    #[strum(serialize = "plan", serialize = "p", serialize = "turntable")]
    Plan,
}

/// Tunables read by the window manager, the physics integrator and the projection.
///
/// Angles are in degrees, velocities in degrees per second, times in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub angle_step: f64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub max_visible: usize,

    pub damping: f64,
    pub spring_strength: f64,
    pub min_velocity: f64,
    pub snap_threshold: f64,
    /// Reference rate used to scale `damping` and `spring_strength`, not the real frame rate.
    pub frame_rate: f64,
    pub max_frame_time: f64,
    /// Deadline for a glide with zero `damping`, which would otherwise never settle.
    pub max_settle_time: f64,
    pub velocity_samples: usize,

    /// Degrees per pixel of horizontal pointer travel.
    pub sensitivity: f64,
    /// Pixels of cumulative travel separating a tap from a drag.
    pub drag_threshold: f64,

    pub radius: f64,
    pub central_scale: f64,
    pub cover_scale: f64,
    pub view_mode: ViewMode,
    pub plan_tilt: f64,
    /// Camera distance in pixels from the `z = 0` plane, as for CSS `perspective`.
    pub perspective: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            angle_step: 3.0,
            min_angle: -45.0,
            max_angle: 45.0,
            max_visible: 25,
            damping: 0.4,
            spring_strength: 0.9,
            min_velocity: 0.1,
            snap_threshold: 0.05,
            frame_rate: 60.0,
            max_frame_time: 1.0 / 30.0,
            max_settle_time: 3.0,
            velocity_samples: 5,
            sensitivity: 0.15,
            drag_threshold: 8.0,
            radius: 8000.0,
            central_scale: 1.15,
            cover_scale: 0.5,
            view_mode: ViewMode::Front,
            plan_tilt: 90.0,
            perspective: 3000.0,
        }
    }
}

impl CarouselConfig {
    /// Checks the structural invariants the window manager depends on.
    pub fn validate(&self) -> Result<(), ConfigViolation> {
        if !(self.angle_step.is_finite() && self.angle_step > 0.0) {
            return Err(ConfigViolation::AngleStep);
        }
        if self.max_visible < 1 {
            return Err(ConfigViolation::MaxVisible);
        }
        if !(self.min_angle.is_finite() && self.max_angle.is_finite()) {
            return Err(ConfigViolation::NonFiniteAngle);
        }
        if self.min_angle >= self.max_angle {
            return Err(ConfigViolation::AngleRange);
        }
        Ok(())
    }

    /// Pulls slider-backed values into their display ranges. Structural fields are left
    /// alone so that [`validate`](Self::validate) still rejects them.
    pub fn clamp_display_ranges(&mut self) {
        self.radius = self.radius.clamp(MIN_RADIUS, MAX_RADIUS);
        self.cover_scale = self.cover_scale.clamp(MIN_COVER_SCALE, MAX_COVER_SCALE);
        self.central_scale = self.central_scale.clamp(MIN_CENTRAL_SCALE, MAX_CENTRAL_SCALE);
        self.plan_tilt = self.plan_tilt.clamp(MIN_PLAN_TILT, MAX_PLAN_TILT);
        self.perspective = self.perspective.clamp(MIN_PERSPECTIVE, MAX_PERSPECTIVE);
        self.damping = self.damping.clamp(0.0, 1.0);
        self.spring_strength = self.spring_strength.clamp(0.0, 1.0);
        self.velocity_samples = self.velocity_samples.max(1);
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub albums: Vec<DisplayKey>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub tier: ResolutionTier,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/album-covers"),
            tier: ResolutionTier::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no home directory to keep the carousel config in")]
    NoConfigDir,
    #[error("cannot read carousel config: {0}")]
    Source(#[from] config::ConfigError),
    #[error("cannot watch carousel config: {0}")]
    Watch(#[from] notify::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `config.toml` under the platform config directory for the carousel.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("org", "troia", "album-carousel")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Reads the config file, then `CAROUSEL_*` overrides such as
/// `CAROUSEL_CAROUSEL__RADIUS=6000`. A missing file is not an error.
pub fn load_config() -> Result<Config, ConfigError> {
    let layered = config::Config::builder()
        .add_source(config::File::from(config_file_path()?).required(false))
        .add_source(
            config::Environment::with_prefix("CAROUSEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(layered.try_deserialize()?)
}

/// Loads the user config with slider values pulled into range. Falls back to defaults
/// when the file is unreadable.
pub fn load_or_default() -> Config {
    match load_config() {
        Ok(mut loaded) => {
            loaded.carousel.clamp_display_ranges();
            loaded
        }
        Err(e) => {
            log::warn!("carousel config unusable, starting from defaults: {e}");
            Config::default()
        }
    }
}

/// Writes the commented default config unless one is already there. Returns its path.
pub fn ensure_config_file() -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    if let Some(dir) = path.parent() {
        fs_err::create_dir_all(dir)?;
    }
    if path.exists() {
        log::info!("keeping existing config at {}", path.display());
    } else {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Whether a watch event on the config directory means `config_file` needs rereading.
/// Editors often replace the file instead of writing in place, so creation and
/// removal count as well as modification.
fn is_config_change(event: &notify::Event, config_file: &Path) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );
    relevant_kind && event.paths.iter().any(|path| path == config_file)
}

/// Sends [`HostEvent::ConfigReload`] whenever the config file changes. Runs until the
/// host stops listening.
pub async fn watch_config_file(tx: Sender<HostEvent>) {
    if let Err(e) = forward_config_changes(&tx).await {
        log::error!("config reloads disabled: {e}");
    }
}

async fn forward_config_changes(tx: &Sender<HostEvent>) -> Result<(), ConfigError> {
    let config_file = config_file_path()?;
    let Some(dir) = config_file.parent() else {
        return Err(ConfigError::NoConfigDir);
    };
    fs_err::create_dir_all(dir)?;

    // notify calls back on its own thread; hop onto the runtime through a channel.
    let (event_tx, event_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if event_tx.send_blocking(res).is_err() {
                log::debug!("config event dropped after watcher shutdown");
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    log::info!("watching {} for changes", config_file.display());

    while let Ok(res) = event_rx.recv().await {
        match res {
            Ok(event) if is_config_change(&event, &config_file) => {
                log::debug!("config change: {:?}", event.kind);
                if tx.send(HostEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("config watch hiccup: {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_deserialization() {
        let cases = vec![
            ("\"front\"", ViewMode::Front),
            ("\"Front\"", ViewMode::Front),
            ("\"F\"", ViewMode::Front),
            ("\"plan\"", ViewMode::Plan),
            ("\"PLAN\"", ViewMode::Plan),
            ("\"turntable\"", ViewMode::Plan),
        ];

        for (json, expected) in cases {
            let deserialized: ViewMode = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(CarouselConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_structural_violations() {
        let base = CarouselConfig::default();

        let cfg = CarouselConfig {
            angle_step: 0.0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigViolation::AngleStep));

        let cfg = CarouselConfig {
            angle_step: f64::NAN,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigViolation::AngleStep));

        let cfg = CarouselConfig {
            max_visible: 0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigViolation::MaxVisible));

        let cfg = CarouselConfig {
            min_angle: 10.0,
            max_angle: 10.0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigViolation::AngleRange));

        let cfg = CarouselConfig {
            max_angle: f64::INFINITY,
            ..base
        };
        assert_eq!(cfg.validate(), Err(ConfigViolation::NonFiniteAngle));
    }

    #[test]
    fn test_clamp_leaves_structure_alone() {
        let mut cfg = CarouselConfig {
            radius: 50_000.0,
            perspective: 100.0,
            damping: 3.0,
            spring_strength: -1.0,
            angle_step: -2.0,
            ..CarouselConfig::default()
        };
        cfg.clamp_display_ranges();

        assert_eq!(cfg.radius, MAX_RADIUS);
        assert_eq!(cfg.perspective, MIN_PERSPECTIVE);
        assert_eq!(cfg.damping, 1.0);
        assert_eq!(cfg.spring_strength, 0.0);
        assert_eq!(cfg.angle_step, -2.0);
        assert_eq!(cfg.validate(), Err(ConfigViolation::AngleStep));
    }

    #[test]
    fn test_only_changes_to_the_config_file_trigger_reload() {
        use notify::event::{CreateKind, ModifyKind};

        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");

        let written = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(config_file.clone());
        assert!(is_config_change(&written, &config_file));

        let replaced = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(dir.path().join("config.toml.swp"))
            .add_path(config_file.clone());
        assert!(is_config_change(&replaced, &config_file));

        let neighbour = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(dir.path().join("rotation"));
        assert!(!is_config_change(&neighbour, &config_file));

        let read = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(config_file.clone());
        assert!(!is_config_change(&read, &config_file));
    }

    #[test]
    fn test_embedded_default_config_parses() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.carousel.view_mode, ViewMode::Front);
        assert_eq!(parsed.carousel.angle_step, 3.0);
        assert_eq!(parsed.assets.tier, ResolutionTier::X2);
        assert_eq!(parsed.catalog.albums.len(), 3);
    }
}
