use std::fmt;
use std::fmt::Display;

use common::types::config::{Bounds, GenerationConfig};
use common::types::errors::InvalidConfiguration;
use log::debug;
use polars::df;
use polars::frame::DataFrame;
use polars::prelude::IntoLazy;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::pipeline::PlanningInput;

const HOURS_PER_DAY: u32 = 24;

/// Generates a synthetic stop network and ridership events for it. All randomness is derived from
/// `config.seed`, so the same config always produces the same input.
pub fn generate(config: &GenerationConfig) -> Result<PlanningInput, GenerationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let stop_ids: Vec<u32> = (0..config.num_stops).collect();
    let stops = generate_stops(&stop_ids, &config.bounds, &mut rng)?;
    let ridership = generate_ridership(&stop_ids, config, &mut rng)?;

    debug!(target: "generation", "Generated {} stops and {} ridership events", stops.height(), ridership.height());

    Ok(PlanningInput {
        stops: stops.lazy(),
        ridership: ridership.lazy(),
    })
}

/// columns: "stop_id", "lat", "lon"
pub fn generate_stops<R: Rng>(
    stop_ids: &[u32],
    bounds: &Bounds,
    rng: &mut R,
) -> Result<DataFrame, GenerationError> {
    let lat_range = bounds.lat.checked("bounds.lat")?;
    let lon_range = bounds.lon.checked("bounds.lon")?;

    let lat: Vec<f64> = stop_ids.iter().map(|_| rng.gen_range(lat_range.clone())).collect();
    let lon: Vec<f64> = stop_ids.iter().map(|_| rng.gen_range(lon_range.clone())).collect();

    Ok(df!(
        "stop_id" => stop_ids,
        "lat" => lat,
        "lon" => lon,
    )?)
}

/// columns: "stop_id", "hour", "passengers"
///
/// Every event references one of `stop_ids`, drawn uniformly. Without any stops there can be no
/// events, so the result is empty regardless of `num_events`.
pub fn generate_ridership<R: Rng>(
    stop_ids: &[u32],
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<DataFrame, GenerationError> {
    let hours = config.hours.checked("hours")?;
    if hours.end > HOURS_PER_DAY {
        return Err(InvalidConfiguration::HourOutOfDay { hour: hours.end }.into());
    }
    let passengers = config.passengers.checked("passengers")?;

    let num_events = if stop_ids.is_empty() { 0 } else { config.num_events as usize };

    let mut event_stops = Vec::with_capacity(num_events);
    let mut event_hours = Vec::with_capacity(num_events);
    let mut event_passengers = Vec::with_capacity(num_events);
    for _ in 0..num_events {
        if let Some(stop_id) = stop_ids.choose(rng) {
            event_stops.push(*stop_id);
            event_hours.push(rng.gen_range(hours.clone()));
            event_passengers.push(rng.gen_range(passengers.clone()));
        }
    }

    Ok(df!(
        "stop_id" => event_stops,
        "hour" => event_hours,
        "passengers" => event_passengers,
    )?)
}

#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    InvalidConfiguration(#[from] InvalidConfiguration),
    Polars(#[from] polars::error::PolarsError),
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            GenerationError::InvalidConfiguration(err) => err,
            GenerationError::Polars(err) => err,
        };
        write!(f, "{}", err)
    }
}
