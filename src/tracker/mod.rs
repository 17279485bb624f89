mod cycle;
mod error;
mod overlay;
mod runner;
mod session;

pub use overlay::{vertex_line, OverlayPaths};
pub use runner::Runner;
pub use session::{TrackerConfig, TrackingSession, UpdateInterval};
