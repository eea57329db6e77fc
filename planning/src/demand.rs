use common::types::config::DemandJoin;
use polars::prelude::*;

/// Attaches the average number of passengers per event to every stop.
///
/// stops columns: "stop_id", "lat", "lon"
/// ridership columns: "stop_id", "passengers" (others are ignored)
/// result columns: "stop_id", "lat", "lon", "avg_passengers", ordered by "stop_id"
///
/// With [`DemandJoin::Inner`] stops without any events are dropped, so the result might contain
/// fewer stops than the input.
pub fn aggregate_demand(
    stops: &LazyFrame,
    ridership: &LazyFrame,
    join: DemandJoin,
) -> LazyFrame {
    let demand_per_stop = ridership.clone()
        .group_by([col("stop_id")])
        .agg([
            col("passengers").cast(DataType::Float64).mean().alias("avg_passengers"),
        ]);

    let stops_with_demand = match join {
        DemandJoin::Inner => stops.clone()
            .join(
                demand_per_stop,
                [col("stop_id")],
                [col("stop_id")],
                JoinArgs::new(JoinType::Inner),
            ),
        DemandJoin::ZeroFill => stops.clone()
            .join(
                demand_per_stop,
                [col("stop_id")],
                [col("stop_id")],
                JoinArgs::new(JoinType::Left),
            )
            .with_column(col("avg_passengers").fill_null(lit(0.0))),
    };

    stops_with_demand
        .select([col("stop_id"), col("lat"), col("lon"), col("avg_passengers")])
        .sort(["stop_id"], SortMultipleOptions::default())
}
