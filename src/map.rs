use common::types::errors::UnknownClusterIdError;
use common::types::ClusterId;
use common::util::df::{f64_values, prepare_file, u32_values};
use geo::{point, LineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use planning::pipeline::PlanningOutput;
use planning::routes::cluster_centroids;
use serde_json::json;
use std::path::PathBuf;
use crate::export::ExportError;

const PALETTE: [&str; 8] = ["red", "blue", "green", "orange", "purple", "pink", "gray", "brown"];

/// Display color of a cluster. Colors repeat once the palette is exhausted.
pub(super) fn cluster_color(cluster: ClusterId) -> &'static str {
    PALETTE[cluster.0 as usize % PALETTE.len()]
}

/// Writes stops, cluster centroids and routes as a GeoJSON `FeatureCollection`
pub(super) fn write_map(path: PathBuf, output: &PlanningOutput) -> Result<(), ExportError> {
    let map = build_map(output)?;

    let file = prepare_file(path)?;
    serde_json::to_writer(file, &map)?;

    Ok(())
}

fn build_map(output: &PlanningOutput) -> Result<FeatureCollection, ExportError> {
    let mut features = vec![];

    let stop_ids = u32_values(&output.stops, "stop_id")?;
    let stop_clusters = u32_values(&output.stops, "cluster_id")?;
    let stop_lat = f64_values(&output.stops, "lat")?;
    let stop_lon = f64_values(&output.stops, "lon")?;
    let stop_demand = f64_values(&output.stops, "avg_passengers")?;
    for (idx, stop_id) in stop_ids.iter().enumerate() {
        let cluster = ClusterId(stop_clusters[idx]);
        let location = point!(x: stop_lon[idx], y: stop_lat[idx]);
        features.push(feature(Geometry::from(&location), json!({
            "kind": "stop",
            "stop_id": stop_id,
            "cluster_id": cluster.0,
            "avg_passengers": stop_demand[idx],
            "marker-color": cluster_color(cluster),
        })));
    }

    let centroids = cluster_centroids(&output.clusters)?;
    let mut cluster_ids: Vec<&ClusterId> = centroids.keys().collect();
    cluster_ids.sort();
    for cluster in cluster_ids {
        let centroid = &centroids[cluster];
        let location = point!(x: centroid.lon, y: centroid.lat);
        let popup = format!("Cluster {}, Demand: {} passengers", cluster, centroid.total_passengers.round());
        features.push(feature(Geometry::from(&location), json!({
            "kind": "cluster",
            "cluster_id": cluster.0,
            "popup": popup,
            "marker-symbol": "bus",
        })));
    }

    for route in &output.routes {
        let line = route.clusters.iter()
            .map(|cluster| {
                let centroid = centroids.get(cluster).ok_or(UnknownClusterIdError(*cluster))?;
                Ok((centroid.lon, centroid.lat))
            })
            .collect::<Result<LineString, UnknownClusterIdError>>()?;
        let clusters: Vec<u32> = route.clusters.iter().map(|c| c.0).collect();
        features.push(feature(Geometry::from(&line), json!({
            "kind": "route",
            "route_id": route.id.0,
            "clusters": clusters,
        })));
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn feature(geometry: Geometry, properties: JsonValue) -> Feature {
    let properties: Option<JsonObject> = match properties {
        JsonValue::Object(properties) => Some(properties),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties,
        foreign_members: None,
    }
}
