use thiserror::Error;

use crate::predict::PredictError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("predict error: {0}")]
    Predict(#[from] PredictError),
    #[error("server returned an empty satellite list")]
    EmptySatelliteList,
    #[error("overlay write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("renderer error: {0}")]
    Render(#[from] RenderError),
}

impl TrackerError {
    /// Whether the poll loop should give up instead of waiting for the next cycle.
    pub fn is_fatal(&self) -> bool {
        match self {
            TrackerError::Predict(e) => e.is_fatal(),
            TrackerError::Io(_) => true,
            TrackerError::EmptySatelliteList | TrackerError::Render(_) => false,
        }
    }
}
