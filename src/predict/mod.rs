mod client;
mod error;
mod parsing;
mod types;

pub use client::{Predict, PredictClient, DEFAULT_HOST, DEFAULT_SERVICE};
pub use error::PredictError;
pub use types::{GroundStation, MarkerColor, SatelliteObservation, Visibility};
