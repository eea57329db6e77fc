use std::fmt;
use std::fmt::Display;

use common::types::config::PlanningConfig;
use common::types::errors::InvalidConfiguration;
use common::util::logging::run_with_spinner;
use log::{info, warn};
use polars::frame::DataFrame;
use polars::prelude::{col, IntoLazy, JoinArgs, JoinType, LazyFrame};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clustering::k_means::KmeansClusterError;
use crate::clustering::{cluster, summarize_clusters};
use crate::demand::aggregate_demand;
use crate::routes::{bundle_routes, Route, RouteError};

#[derive(Clone)]
pub struct PlanningInput {
    // columns: "stop_id", "lat", "lon"
    pub stops: LazyFrame,
    // columns: "stop_id", "hour", "passengers"
    pub ridership: LazyFrame,
}

pub struct PlanningOutput {
    // columns: "stop_id", "lat", "lon", "avg_passengers", "cluster_id"
    pub stops: DataFrame,
    // columns: "cluster_id", "lat", "lon", "total_passengers", "avg_passengers", "num_stops"
    pub clusters: DataFrame,
    pub routes: Vec<Route>,
}

/// Runs all planning stages on `input`: demand per stop, clustering, cluster summaries and route
/// bundling. Each stage is fully materialized before the next one starts.
pub fn plan(input: PlanningInput, config: &PlanningConfig) -> Result<PlanningOutput, PlanningError> {
    config.validate()?;

    let stops_with_demand = run_with_spinner("planning", "Aggregating demand per stop", || {
        aggregate_demand(&input.stops, &input.ridership, config.demand_join).collect()
    })?;

    let num_stops = input.stops.clone().collect()?.height();
    if stops_with_demand.height() < num_stops {
        warn!(
            target: "planning",
            "{} of {} stops have no ridership and are left out",
            num_stops - stops_with_demand.height(), num_stops,
        );
    }

    let assignments = run_with_spinner("planning", "Clustering stops", || {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        cluster(&stops_with_demand, config.n_clusters as usize, rng)
    })?;

    let stops_with_demand = stops_with_demand.lazy();
    let assignments = assignments.lazy();

    let clusters = run_with_spinner("planning", "Summarizing clusters", || {
        summarize_clusters(&stops_with_demand, &assignments).collect()
    })?;

    let stops = stops_with_demand
        .join(
            assignments,
            [col("stop_id")],
            [col("stop_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let routes = run_with_spinner("planning", "Bundling clusters into routes", || {
        bundle_routes(&clusters, config.route_bundle_size as usize)
    })?;

    info!(
        target: "planning",
        "Grouped {} stops into {} clusters and {} routes",
        stops.height(), clusters.height(), routes.len(),
    );

    Ok(PlanningOutput { stops, clusters, routes })
}

#[derive(thiserror::Error, Debug)]
pub enum PlanningError {
    InvalidConfiguration(#[from] InvalidConfiguration),
    Polars(#[from] polars::error::PolarsError),
    Clustering(#[from] KmeansClusterError),
    Routes(#[from] RouteError),
}

impl PlanningError {
    /// The configuration problem behind this error, no matter which stage detected it
    pub fn invalid_configuration(&self) -> Option<&InvalidConfiguration> {
        match self {
            PlanningError::InvalidConfiguration(err)
            | PlanningError::Clustering(KmeansClusterError::InvalidConfiguration(err))
            | PlanningError::Routes(RouteError::InvalidConfiguration(err)) => Some(err),
            _ => None,
        }
    }
}

impl Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            PlanningError::InvalidConfiguration(err) => err,
            PlanningError::Polars(err) => err,
            PlanningError::Clustering(err) => err,
            PlanningError::Routes(err) => err,
        };
        write!(f, "{}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generate;
    use crate::tests::{case_1, case_2};
    use common::types::config::{DemandJoin, GenerationConfig};
    use common::types::{ClusterId, RouteId};
    use common::util::df::{f64_values, u32_values};
    use itertools::Itertools;

    fn config(n_clusters: u32, route_bundle_size: u32) -> PlanningConfig {
        PlanningConfig { n_clusters, route_bundle_size, ..PlanningConfig::default() }
    }

    fn cluster_of(output: &PlanningOutput, stop_id: u32) -> u32 {
        let stop_ids = u32_values(&output.stops, "stop_id").unwrap();
        let cluster_ids = u32_values(&output.stops, "cluster_id").unwrap();
        cluster_ids[stop_ids.iter().position(|s| *s == stop_id).unwrap()]
    }

    #[test]
    fn test_two_close_stops_and_one_far_away() {
        let input = case_1::generate_planning_input().unwrap();
        let output = plan(input, &config(2, 1)).unwrap();

        let busy = cluster_of(&output, 1);
        assert_eq!(busy, cluster_of(&output, 2));
        let lonely = cluster_of(&output, 3);
        assert_ne!(busy, lonely);

        let cluster_ids = u32_values(&output.clusters, "cluster_id").unwrap();
        let num_stops = u32_values(&output.clusters, "num_stops").unwrap();
        let totals = f64_values(&output.clusters, "total_passengers").unwrap();
        let busy_idx = cluster_ids.iter().position(|c| *c == busy).unwrap();
        assert_eq!(num_stops[busy_idx], 2);
        assert_eq!(totals[busy_idx], 110.0);

        assert_eq!(output.routes, vec![
            Route { id: RouteId(0), clusters: vec![ClusterId(busy)] },
            Route { id: RouteId(1), clusters: vec![ClusterId(lonely)] },
        ]);
    }

    #[test]
    fn test_cluster_count_matches_configuration() {
        let input = case_2::generate_planning_input().unwrap();
        let output = plan(input, &config(4, 3)).unwrap();

        assert_eq!(output.clusters.height(), 4);
        assert_eq!(u32_values(&output.clusters, "cluster_id").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(u32_values(&output.clusters, "num_stops").unwrap(), vec![3, 3, 3, 3]);
        // The stop without ridership is not part of any cluster
        assert_eq!(output.stops.height(), 12);

        // The busiest group (stops 9 to 11) leads the first route
        let busiest = ClusterId(cluster_of(&output, 9));
        assert_eq!(output.routes.len(), 2);
        assert_eq!(output.routes[0].clusters.len(), 3);
        assert_eq!(output.routes[0].clusters[0], busiest);
    }

    #[test]
    fn test_zero_fill_keeps_stops_without_ridership() {
        let input = case_2::generate_planning_input().unwrap();
        let config = PlanningConfig { demand_join: DemandJoin::ZeroFill, ..config(4, 4) };
        let output = plan(input, &config).unwrap();

        assert_eq!(output.stops.height(), 13);
        // Stop 12 lies right next to the busiest group
        assert_eq!(cluster_of(&output, 12), cluster_of(&output, 9));
        let num_stops = u32_values(&output.clusters, "num_stops").unwrap();
        assert_eq!(num_stops.iter().sum::<u32>(), 13);
    }

    #[test]
    fn test_one_cluster_per_stop() {
        let input = case_2::generate_planning_input().unwrap();
        let output = plan(input, &config(12, 5)).unwrap();

        assert_eq!(output.clusters.height(), 12);
        assert!(u32_values(&output.clusters, "num_stops").unwrap().iter().all(|n| *n == 1));
        assert_eq!(output.routes.iter().map(|r| r.clusters.len()).collect_vec(), vec![5, 5, 2]);
    }

    #[test]
    fn test_more_clusters_than_stops() {
        let input = case_1::generate_planning_input().unwrap();
        let err = plan(input, &config(4, 1)).err().unwrap();

        assert_eq!(
            err.invalid_configuration(),
            Some(&InvalidConfiguration::TooManyClusters { n_clusters: 4, num_points: 3 })
        );
    }

    #[test]
    fn test_stops_sharing_a_location() {
        let input = PlanningInput {
            stops: polars::df![
                "stop_id" => [0u32, 1, 2, 3],
                "lat" => [0f64, 0.0, 0.0, 5.0],
                "lon" => [0f64, 0.0, 0.0, 5.0],
            ].unwrap().lazy(),
            ridership: polars::df![
                "stop_id" => [0u32, 1, 2, 3],
                "hour" => [7u32, 8, 9, 10],
                "passengers" => [10u32, 20, 30, 40],
            ].unwrap().lazy(),
        };
        let output = plan(input, &config(3, 1)).unwrap();

        assert_eq!(u32_values(&output.clusters, "cluster_id").unwrap(), vec![0, 1, 2]);
        assert_eq!(u32_values(&output.clusters, "num_stops").unwrap(), vec![2, 1, 1]);
        assert_eq!(output.routes.len(), 3);
    }

    #[test]
    fn test_invalid_configuration_fails_fast() {
        let input = case_1::generate_planning_input().unwrap();
        let err = plan(input.clone(), &config(0, 1)).err().unwrap();
        assert_eq!(err.invalid_configuration(), Some(&InvalidConfiguration::NoClusters));

        let err = plan(input, &config(2, 0)).err().unwrap();
        assert_eq!(err.invalid_configuration(), Some(&InvalidConfiguration::NoRouteBundleSize));
    }

    #[test]
    fn test_empty_input() {
        let generation = GenerationConfig { num_stops: 0, ..GenerationConfig::default() };
        let input = generate(&generation).unwrap();
        let output = plan(input, &config(3, 2)).unwrap();

        assert_eq!(output.stops.height(), 0);
        assert_eq!(output.clusters.height(), 0);
        assert!(output.routes.is_empty());
    }

    #[test]
    fn test_generated_city() {
        let generation = GenerationConfig { num_stops: 120, num_events: 600, ..GenerationConfig::default() };
        let input = generate(&generation).unwrap();
        let planning = config(10, 3);

        let first = plan(input.clone(), &planning).unwrap();
        let second = plan(input, &planning).unwrap();

        assert!(first.stops.equals(&second.stops));
        assert_eq!(first.routes, second.routes);

        let num_stops = u32_values(&first.clusters, "num_stops").unwrap();
        assert_eq!(num_stops.iter().sum::<u32>() as usize, first.stops.height());

        let mut routed: Vec<u32> = first.routes.iter()
            .flat_map(|r| r.clusters.iter().map(|c| c.0))
            .collect();
        routed.sort();
        assert_eq!(routed, u32_values(&first.clusters, "cluster_id").unwrap());
    }
}
