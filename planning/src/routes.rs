use std::fmt;
use std::fmt::Display;

use common::types::errors::{InvalidConfiguration, UnknownClusterIdError};
use common::types::{ClusterId, RouteId};
use common::util::df::{f64_values, u32_values};
use geo::{point, Distance, Haversine};
use hashbrown::HashMap;
use itertools::Itertools;
use polars::error::PolarsResult;
use polars::frame::DataFrame;
use polars::prelude::{col, Column, IntoLazy, SortMultipleOptions};

/// A bundle of clusters that should be served together. Clusters are ordered by descending demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub clusters: Vec<ClusterId>,
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route {}: clusters {}", self.id, self.clusters.iter().join(" -> "))
    }
}

/// Ranks clusters by "total_passengers" (descending, ties by ascending "cluster_id") and cuts the
/// ranking into routes of `bundle_size` clusters. The last route may be shorter.
///
/// Routes are not checked for being geographically connected. Two busy clusters on opposite ends
/// of the city can end up in the same route.
pub fn bundle_routes(
    // columns: "cluster_id", "total_passengers"
    clusters: &DataFrame,
    bundle_size: usize,
) -> Result<Vec<Route>, RouteError> {
    if bundle_size == 0 {
        return Err(InvalidConfiguration::NoRouteBundleSize.into());
    }

    let ranked = clusters.clone().lazy()
        .select([col("cluster_id"), col("total_passengers")])
        .sort(
            ["total_passengers", "cluster_id"],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_maintain_order(true),
        )
        .collect()?;

    let routes = u32_values(&ranked, "cluster_id")?
        .chunks(bundle_size)
        .enumerate()
        .map(|(idx, chunk)| Route {
            id: RouteId(idx as u32),
            clusters: chunk.iter().copied().map(ClusterId).collect(),
        })
        .collect();

    Ok(routes)
}

/// One row per cluster of a route.
///
/// columns: "route_id", "position", "cluster_id"
pub fn routes_to_frame(routes: &[Route]) -> PolarsResult<DataFrame> {
    let mut route_ids = vec![];
    let mut positions = vec![];
    let mut cluster_ids = vec![];
    for route in routes {
        for (position, cluster) in route.clusters.iter().enumerate() {
            route_ids.push(route.id.0);
            positions.push(position as u32);
            cluster_ids.push(cluster.0);
        }
    }

    DataFrame::new(vec![
        Column::new("route_id".into(), &route_ids),
        Column::new("position".into(), &positions),
        Column::new("cluster_id".into(), &cluster_ids),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterCentroid {
    pub lat: f64,
    pub lon: f64,
    pub total_passengers: f64,
}

/// Looks up centroid and demand of every cluster in a cluster summary.
pub fn cluster_centroids(
    // columns: "cluster_id", "lat", "lon", "total_passengers"
    clusters: &DataFrame,
) -> PolarsResult<HashMap<ClusterId, ClusterCentroid>> {
    let cluster_ids = u32_values(clusters, "cluster_id")?;
    let lat = f64_values(clusters, "lat")?;
    let lon = f64_values(clusters, "lon")?;
    let total_passengers = f64_values(clusters, "total_passengers")?;

    Ok(cluster_ids.into_iter()
        .enumerate()
        .map(|(idx, cluster_id)| (
            ClusterId(cluster_id),
            ClusterCentroid { lat: lat[idx], lon: lon[idx], total_passengers: total_passengers[idx] },
        ))
        .collect())
}

/// columns: "route_id", "num_clusters", "total_passengers", "length_km"
///
/// The length is measured along the great circle from centroid to centroid, in route order.
pub fn summarize_routes(
    routes: &[Route],
    clusters: &DataFrame,
) -> Result<DataFrame, RouteError> {
    let centroids = cluster_centroids(clusters)?;

    let mut route_ids = vec![];
    let mut num_clusters = vec![];
    let mut total_passengers = vec![];
    let mut lengths = vec![];
    for route in routes {
        let stops = route.clusters.iter()
            .map(|cluster| centroids.get(cluster).ok_or(UnknownClusterIdError(*cluster)))
            .collect::<Result<Vec<&ClusterCentroid>, UnknownClusterIdError>>()?;

        let length_meters: f64 = stops.iter()
            .tuple_windows()
            .map(|(a, b)| Haversine::distance(point!(x: a.lon, y: a.lat), point!(x: b.lon, y: b.lat)))
            .sum();

        route_ids.push(route.id.0);
        num_clusters.push(stops.len() as u32);
        total_passengers.push(stops.iter().map(|c| c.total_passengers).sum::<f64>());
        lengths.push(length_meters / 1_000.0);
    }

    Ok(DataFrame::new(vec![
        Column::new("route_id".into(), &route_ids),
        Column::new("num_clusters".into(), &num_clusters),
        Column::new("total_passengers".into(), &total_passengers),
        Column::new("length_km".into(), &lengths),
    ])?)
}

#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    InvalidConfiguration(#[from] InvalidConfiguration),
    Polars(#[from] polars::error::PolarsError),
    UnknownCluster(#[from] UnknownClusterIdError),
}

impl Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            RouteError::InvalidConfiguration(err) => err,
            RouteError::Polars(err) => err,
            RouteError::UnknownCluster(err) => err,
        };
        write!(f, "{}", err)
    }
}
