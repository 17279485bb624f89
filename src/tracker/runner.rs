use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;

use super::cycle::run_cycle;
use super::error::TrackerError;
use super::overlay::OverlayFiles;
use super::session::{TrackerConfig, TrackingSession};
use crate::abort::AbortSignal;
use crate::predict::Predict;
use crate::render;

/// Poll, emit and sleep until aborted or a fatal error occurs.
pub struct Runner<P: Predict> {
    pub client: P,
    pub config: TrackerConfig,
    pub abort_rx: Receiver<AbortSignal>,
}

impl<P: Predict> Runner<P> {
    pub fn run(self) -> Result<(), TrackerError> {
        // Dropped on every return path, which removes the overlay files.
        let files = OverlayFiles::new(self.config.paths.clone());
        log::info!("Overlay files: {}", files.paths());

        if self.config.renderer.uses_config() {
            render::write_config(files.paths(), &self.config.global_config)?;
        }

        let mut session = TrackingSession::from_config(&self.config);
        let interval = session.update_interval.as_duration();

        loop {
            let started = Instant::now();
            log::info!("Starting cycle at {}", Utc::now());

            match run_cycle(&self.client, &session) {
                Ok(outcome) => {
                    session = outcome.session;
                    files.write(&outcome.overlay, self.config.renderer.supports_color())?;
                    let drawn: Vec<&str> = outcome
                        .overlay
                        .footprints
                        .iter()
                        .map(|f| f.name.as_str())
                        .collect();
                    log::info!(
                        "{}: center ({:.3}, {:.3}), {} satellites, footprints [{}]",
                        outcome.station.callsign,
                        session.map_center_latitude,
                        session.map_center_longitude,
                        outcome.satellites.len(),
                        drawn.join(", ")
                    );

                    if self.config.render {
                        let cmd = render::command_line(
                            self.config.renderer,
                            &session,
                            files.paths(),
                            &self.config.extra,
                        );
                        if let Err(e) = render::invoke(&cmd) {
                            log::warn!("Renderer failed: {}", e);
                        }
                    }
                }
                Err(e) if e.is_fatal() => {
                    log::error!("Giving up: {}", e);
                    return Err(e);
                }
                Err(e) => log::warn!("Skipping cycle: {}", e),
            }

            if self.config.once {
                return Ok(());
            }

            let remaining = sleep_budget(interval, started.elapsed());
            log::debug!("Sleeping {}", humantime::format_duration(round_ms(remaining)));
            if let Some(signal) = self.wait(remaining) {
                log::info!("Stopping: {}", signal.reason);
                return Ok(());
            }
        }
    }

    fn wait(&self, timeout: Duration) -> Option<AbortSignal> {
        match self.abort_rx.recv_timeout(timeout) {
            Ok(signal) => Some(signal),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                None
            }
        }
    }
}

/// Time left in the cycle; zero once the cycle overran.
fn sleep_budget(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

fn round_ms(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}
