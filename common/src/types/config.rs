use serde::{Deserialize, Serialize};
use crate::types::errors::InvalidConfiguration;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1")]
    Version1 {
        #[serde(default)]
        generation: GenerationConfig,
        #[serde(default)]
        planning: PlanningConfig,
        #[serde(default)]
        export: ExportConfig,
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::Version1 {
            generation: GenerationConfig::default(),
            planning: PlanningConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Shape of the synthetic stops and ridership. Every upper bound is exclusive.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: u64,
    pub num_stops: u32,
    pub num_events: u32,
    pub bounds: Bounds,
    pub hours: Span<u32>,
    pub passengers: Span<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_stops: 300,
            num_events: 1_000,
            bounds: Bounds::default(),
            hours: Span { start: 5, end: 23 },
            passengers: Span { start: 1, end: 60 },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Bounds {
    pub lat: Span<f64>,
    pub lon: Span<f64>,
}

impl Default for Bounds {
    // Central Nairobi
    fn default() -> Self {
        Self {
            lat: Span { start: -1.30, end: -1.20 },
            lon: Span { start: 36.75, end: 36.90 },
        }
    }
}

/// Half-open range `[start, end)`
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Span<T> {
    pub start: T,
    pub end: T,
}

impl<T: PartialOrd + Copy> Span<T> {
    pub fn checked(&self, name: &'static str) -> Result<std::ops::Range<T>, InvalidConfiguration> {
        if self.start < self.end {
            Ok(self.start..self.end)
        } else {
            Err(InvalidConfiguration::EmptyRange { name })
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PlanningConfig {
    pub n_clusters: u32,
    pub route_bundle_size: u32,
    pub demand_join: DemandJoin,
    /// Seed for the k-means initialization, independent of the generation seed
    pub seed: u64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            n_clusters: 25,
            route_bundle_size: 5,
            demand_join: DemandJoin::default(),
            seed: 42,
        }
    }
}

impl PlanningConfig {
    /// Checks everything that can be checked without looking at the data.
    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        if self.n_clusters == 0 {
            return Err(InvalidConfiguration::NoClusters);
        }
        if self.route_bundle_size == 0 {
            return Err(InvalidConfiguration::NoRouteBundleSize);
        }
        Ok(())
    }
}

/// How stops without any ridership events are treated when computing demand.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DemandJoin {
    /// Drop stops without events. They take no part in clustering.
    #[default]
    Inner,
    /// Keep stops without events with an average demand of zero.
    ZeroFill,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: String,
    pub format: TableFormat,
    /// Also write a GeoJSON map of stops, cluster centroids and routes
    pub map: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: String::from("output"),
            format: TableFormat::default(),
            map: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    #[default]
    Csv,
    Parquet,
}
