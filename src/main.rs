use album_carousel::assets::{AssetResolver, CoverArtResolver, ResolutionTier};
use album_carousel::carousel::{Carousel, CarouselObserver, NoOpObserver, StepOutcome};
use album_carousel::catalog::{Catalog, CatalogIndex};
use album_carousel::config::{self, Config};
use album_carousel::events::HostEvent;
use album_carousel::persist::{FileRotationStore, MemoryRotationStore, RotationStore};
use album_carousel::sys::{runtime, server::SOCKET_PATH};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::time::Instant;

const FRAME_CLOCK_HZ: f64 = 60.0;

#[derive(Parser, Debug)]
#[command(name = "album-carousel", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the carousel daemon (default)
    Run,
    /// Send one control line to a running daemon, e.g. `send press 960 540`
    Send {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists
    InitConfig,
    /// Drag, release, and print the window once the glide settles
    Simulate {
        /// Horizontal drag distance in pixels
        #[arg(long, default_value_t = 100.0, allow_hyphen_values = true)]
        drag: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(),
        Commands::Send { words } => send_command(&words.join(" ")),
        Commands::InitConfig => {
            let path = config::ensure_config_file()?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Simulate { drag } => simulate(drag),
    }
}

/// Reports selections and remembers where the ring rests.
struct HostObserver<'a> {
    catalog: &'a Catalog,
    resolver: CoverArtResolver,
    tier: ResolutionTier,
    store: &'a dyn RotationStore,
    rotation: f64,
}

impl CarouselObserver for HostObserver<'_> {
    fn on_select(&mut self, index: CatalogIndex) {
        let album = self.catalog.get(index);
        let cover = self.resolver.resolve(&album.display_key, self.tier);
        println!("{} {} {}", album.id, album.display_key, cover.display());

        if let Err(e) = self.store.save(self.rotation) {
            log::warn!("Failed to save rotation: {}", e);
        }
    }

    fn on_rotation_changed(&mut self, rotation: f64) {
        self.rotation = rotation;
    }
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    Catalog::from_keys(config.catalog.albums.iter().cloned())
        .context("No albums configured. List display keys under [catalog] albums.")
}

fn open_store() -> Box<dyn RotationStore> {
    match FileRotationStore::in_state_dir() {
        Ok(store) => {
            log::debug!("rotation store at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!("Rotation will not persist: {}", e);
            Box::new(MemoryRotationStore::default())
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = config::load_or_default();
    let catalog = load_catalog(&config)?;
    let store = open_store();

    let rotation = store.load().unwrap_or(0.0);
    let mut carousel = Carousel::with_rotation(catalog.len(), config.carousel.clone(), rotation)?;
    log::info!(
        "{} albums, resting at {:.2} facing {:?}",
        catalog.len(),
        carousel.rotation(),
        carousel.center_item().map(|i| catalog.get(i).display_key.clone())
    );

    let mut observer = HostObserver {
        catalog: &catalog,
        resolver: CoverArtResolver::new(&config.assets.root),
        tier: config.assets.tier,
        store: store.as_ref(),
        rotation: carousel.rotation(),
    };

    let (tx, rx) = async_channel::bounded(64);
    runtime::start_background_services(tx, FRAME_CLOCK_HZ);

    let start = Instant::now();
    while let Ok(event) = rx.recv_blocking() {
        let at = start.elapsed();
        match event {
            HostEvent::Press(pos) => carousel.press(pos, at, &mut observer),
            HostEvent::Move(pos) => carousel.pointer_move(pos, at, &mut observer),
            HostEvent::Release(pos) => carousel.release(pos, at, &mut observer),
            HostEvent::Cancel => carousel.cancel(at, &mut observer),
            HostEvent::Reset => carousel.reset(0.0, &mut observer),
            HostEvent::Halt => carousel.halt(),
            HostEvent::Frame(dt) => {
                if carousel.is_animating()
                    && carousel.tick(dt.as_secs_f64(), &mut observer) == StepOutcome::Snapped
                {
                    if let Some(index) = carousel.center_item() {
                        log::info!("resting on {}", catalog.get(index).display_key);
                    }
                }
            }
            HostEvent::ConfigReload => {
                log::info!("Config changed, reloading...");
                let reloaded = config::load_or_default();
                if let Err(e) = carousel.reconfigure(reloaded.carousel, &mut observer) {
                    log::error!("Keeping previous carousel settings: {}", e);
                }
            }
        }
    }

    Ok(())
}

fn simulate(drag_px: f64) -> anyhow::Result<()> {
    const FRAME: f64 = 1.0 / FRAME_CLOCK_HZ;
    const DRAG_FRAMES: u32 = 10;

    let config = config::load_or_default();
    let catalog = load_catalog(&config)?;
    let mut carousel = Carousel::new(catalog.len(), config.carousel.clone())?;
    let mut observer = NoOpObserver;

    for _ in 0..DRAG_FRAMES {
        carousel.apply_drag_delta(drag_px / f64::from(DRAG_FRAMES), FRAME, &mut observer);
    }
    println!(
        "released at {:.2} deg, {:.1} deg/s",
        carousel.rotation(),
        carousel.velocity()
    );
    carousel.release_drag(&mut observer);

    let mut frames = 0u32;
    while carousel.is_animating() {
        carousel.tick(FRAME, &mut observer);
        frames += 1;
    }
    println!(
        "settled at {:.2} deg after {} frames",
        carousel.rotation(),
        frames
    );

    for item in carousel.visible_window() {
        let album = catalog.get(item.catalog_index);
        println!(
            "{:>5} {:<40} {}",
            item.catalog_index.get(),
            album.display_key.as_str(),
            item.transform
        );
    }
    Ok(())
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to album-carousel daemon at {}: {}. Is it running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
