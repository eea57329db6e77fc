use common::types::errors::InvalidConfiguration;
use common::util::df::{f64_values, u32_values};
use linfa::prelude::{Fit, Predict};
use linfa::DatasetBase;
use hashbrown::{HashMap, HashSet};
use linfa_clustering::KMeans;
use log::debug;
use ndarray::Array2;
use polars::frame::DataFrame;
use polars::prelude::Column;
use rand::Rng;
use std::fmt;
use std::fmt::Display;

const NUM_RUNS: usize = 10;
const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// Assigns every stop to one of `n_clusters` clusters by its coordinates.
///
/// stops columns: "stop_id", "lat", "lon"
/// result columns: "stop_id", "cluster_id" (in the order of `stops`)
///
/// The result only depends on `rng`'s seed. If there are exactly as many stops as clusters, the
/// i-th stop becomes cluster i without running k-means. The same holds if there are no more
/// distinct locations than clusters, see [`cluster_by_location`].
pub fn cluster<R: Rng + Clone>(
    stops: &DataFrame,
    n_clusters: usize,
    rng: R,
) -> Result<DataFrame, KmeansClusterError> {
    if n_clusters == 0 {
        return Err(InvalidConfiguration::NoClusters.into());
    }

    let stop_ids = u32_values(stops, "stop_id")?;
    let num_points = stop_ids.len();

    if num_points == 0 {
        debug!(target: "planning", "No stops to cluster");
        return Ok(assignment_frame(&stop_ids, &[])?);
    }
    if n_clusters > num_points {
        return Err(InvalidConfiguration::TooManyClusters { n_clusters, num_points }.into());
    }
    if n_clusters == num_points {
        let cluster_ids: Vec<u32> = (0..num_points as u32).collect();
        return Ok(assignment_frame(&stop_ids, &cluster_ids)?);
    }

    let lat = f64_values(stops, "lat")?;
    let lon = f64_values(stops, "lon")?;

    // k-means++ needs a new location for every initial centroid
    let distinct_locations = lat.iter().zip(&lon)
        .map(|(lat, lon)| location_key(*lat, *lon))
        .collect::<HashSet<_>>()
        .len();
    if distinct_locations <= n_clusters {
        debug!(target: "planning", "{distinct_locations} distinct locations for {n_clusters} clusters");
        let cluster_ids = cluster_by_location(&lat, &lon, n_clusters);
        return Ok(assignment_frame(&stop_ids, &cluster_ids)?);
    }

    let stops_array = Array2::from_shape_fn((num_points, 2), |(row, column)| {
        if column == 0 { lat[row] } else { lon[row] }
    });
    let stops_data = DatasetBase::from(stops_array.clone());

    let k_means_model = KMeans::params_with_rng(n_clusters, rng)
        .n_runs(NUM_RUNS)
        .max_n_iterations(MAX_ITERATIONS)
        .tolerance(TOLERANCE)
        .fit(&stops_data)?;
    let result = k_means_model.predict(stops_array);

    let cluster_ids: Vec<u32> = result.targets.into_iter()
        .map(|x| x as u32)
        .collect();

    Ok(assignment_frame(&stop_ids, &cluster_ids)?)
}

/// Every distinct location becomes its own cluster, numbered in order of first occurrence. Stops
/// repeating an earlier location then take the unused labels one by one, so all `n_clusters`
/// labels are used as long as there are at least `n_clusters` stops.
fn cluster_by_location(lat: &[f64], lon: &[f64], n_clusters: usize) -> Vec<u32> {
    let mut labels: HashMap<(u64, u64), u32> = HashMap::new();
    let mut cluster_ids = Vec::with_capacity(lat.len());
    let mut repeated = vec![];

    for (idx, (lat, lon)) in lat.iter().zip(lon).enumerate() {
        let next_label = labels.len() as u32;
        let label = *labels.entry(location_key(*lat, *lon)).or_insert(next_label);
        if label != next_label {
            repeated.push(idx);
        }
        cluster_ids.push(label);
    }

    let unused_labels = labels.len() as u32..n_clusters as u32;
    for (idx, label) in repeated.into_iter().zip(unused_labels) {
        cluster_ids[idx] = label;
    }

    cluster_ids
}

fn location_key(lat: f64, lon: f64) -> (u64, u64) {
    // Adding 0.0 turns -0.0 into 0.0
    ((lat + 0.0).to_bits(), (lon + 0.0).to_bits())
}

fn assignment_frame(stop_ids: &[u32], cluster_ids: &[u32]) -> polars::error::PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new("stop_id".into(), stop_ids),
        Column::new("cluster_id".into(), cluster_ids),
    ])
}

#[derive(thiserror::Error, Debug)]
pub enum KmeansClusterError {
    InvalidConfiguration(#[from] InvalidConfiguration),
    Polars(#[from] polars::error::PolarsError),
    KMeans(#[from] linfa_clustering::KMeansError),
}

impl Display for KmeansClusterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            KmeansClusterError::InvalidConfiguration(err) => err,
            KmeansClusterError::Polars(err) => err,
            KmeansClusterError::KMeans(err) => err,
        };
        write!(f, "{}", err)
    }
}
