use polars::prelude::*;

/// Aggregates stops per cluster.
///
/// stops_with_demand columns: "stop_id", "lat", "lon", "avg_passengers"
/// assignments columns: "stop_id", "cluster_id"
/// result columns: "cluster_id", "lat", "lon", "total_passengers", "avg_passengers", "num_stops",
/// one row per cluster with at least one stop, ordered by "cluster_id"
///
/// "lat" and "lon" of the result are the centroid of the cluster's stops.
pub fn summarize_clusters(
    stops_with_demand: &LazyFrame,
    assignments: &LazyFrame,
) -> LazyFrame {
    stops_with_demand.clone()
        .join(
            assignments.clone(),
            [col("stop_id")],
            [col("stop_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by([col("cluster_id")])
        .agg([
            col("lat").mean(),
            col("lon").mean(),
            col("avg_passengers").sum().alias("total_passengers"),
            col("avg_passengers").mean(),
            col("stop_id").count().alias("num_stops"),
        ])
        .sort(["cluster_id"], SortMultipleOptions::default())
}
