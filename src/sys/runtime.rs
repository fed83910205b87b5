use crate::events::HostEvent;
use async_channel::Sender;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::{self, MissedTickBehavior};

/// Spawns the socket server, config watcher and frame clock on a dedicated Tokio thread.
pub fn start_background_services(tx: Sender<HostEvent>, frame_rate: f64) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::watch_config_file(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_frame_clock(tx, frame_rate).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}

/// Emits `Frame(dt)` at `frame_rate` Hz with the real elapsed time. Late ticks are
/// skipped, not bunched.
pub async fn run_frame_clock(tx: Sender<HostEvent>, frame_rate: f64) {
    let rate = if frame_rate.is_finite() && frame_rate > 0.0 {
        frame_rate
    } else {
        60.0
    };
    let mut interval = time::interval(Duration::from_secs_f64(1.0 / rate));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last = interval.tick().await;
    loop {
        let now = interval.tick().await;
        if tx.send(HostEvent::Frame(now - last)).await.is_err() {
            break;
        }
        last = now;
    }
}
