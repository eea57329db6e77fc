use common::types::config::{ExportConfig, TableFormat};
use common::types::errors::UnknownClusterIdError;
use common::types::ClusterId;
use common::util::df::{write_df_to_file, FileType};
use log::{debug, info};
use planning::pipeline::PlanningOutput;
use planning::routes::{routes_to_frame, summarize_routes, RouteError};
use polars::error::PolarsError;
use polars::frame::DataFrame;
use polars::prelude::Column;
use std::fmt;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use crate::map::{cluster_color, write_map};

/// Writes all planning results to `config.directory`
pub(super) fn export(config: &ExportConfig, output: &PlanningOutput) -> Result<(), ExportError> {
    let directory = Path::new(&config.directory);

    let tables: [(&str, DataFrame); 4] = [
        ("stops_with_clusters", stops_with_colors(&output.stops)?),
        ("clusters_summary", output.clusters.clone()),
        ("routes", routes_to_frame(&output.routes)?),
        ("routes_summary", summarize_routes(&output.routes, &output.clusters)?),
    ];
    for (name, table) in tables {
        let format = file_type(config.format);
        let path = directory.join(format!("{name}.{}", format.extension()));
        debug!(target: "export", "Writing {} rows to {path:?}", table.height());
        write_df_to_file(path, format, table)?;
    }

    if config.map {
        let path: PathBuf = directory.join("map.geojson");
        write_map(path.clone(), output)?;
        debug!(target: "export", "Map written to {path:?}");
    }

    info!(target: "export", "Results written to '{}'", directory.display());

    Ok(())
}

fn file_type(format: TableFormat) -> FileType {
    match format {
        TableFormat::Csv => FileType::CSV,
        TableFormat::Parquet => FileType::PARQUET,
    }
}

/// Adds the display color of every stop's cluster as column "color"
fn stops_with_colors(stops: &DataFrame) -> Result<DataFrame, PolarsError> {
    let colors: Vec<&str> = stops.column("cluster_id")?
        .as_materialized_series()
        .u32()?
        .iter()
        .map(|cluster| cluster.map_or("", |c| cluster_color(ClusterId(c))))
        .collect();

    let mut stops = stops.clone();
    stops.with_column(Column::new("color".into(), colors))?;
    Ok(stops)
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    Polars(#[from] PolarsError),
    Routes(#[from] RouteError),
    UnknownCluster(#[from] UnknownClusterIdError),
    IO(#[from] std::io::Error),
    Json(#[from] serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            ExportError::Polars(err) => err,
            ExportError::Routes(err) => err,
            ExportError::UnknownCluster(err) => err,
            ExportError::IO(err) => err,
            ExportError::Json(err) => err,
        };
        write!(f, "{}", err)
    }
}
