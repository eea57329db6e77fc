use common::types::config::Config;
use log::info;
use std::fmt;
use std::fmt::Display;
use std::path::Path;
use crate::bootstrap_config::BootstrapConfig;

pub(super) fn load_config(bootstrap_config: &BootstrapConfig) -> Result<Config, ConfigError> {
    let config = match &bootstrap_config.config_file {
        Some(config_file) => {
            let path: &Path = Path::new(config_file);

            // The version tag is only resolved when parsing from a string
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yml::from_str(&content)?;

            info!(target: "main", "Config read successfully from '{path:?}'");
            config
        }
        None => {
            info!(target: "main", "No config file given, using defaults");
            Config::default()
        }
    };

    Ok(apply_overrides(config, bootstrap_config))
}

/// Command line arguments take precedence over the config file
fn apply_overrides(config: Config, bootstrap_config: &BootstrapConfig) -> Config {
    let Config::Version1 { mut generation, mut planning, mut export } = config;

    if let Some(n_clusters) = bootstrap_config.n_clusters {
        planning.n_clusters = n_clusters;
    }
    if let Some(route_bundle_size) = bootstrap_config.route_bundle_size {
        planning.route_bundle_size = route_bundle_size;
    }
    if let Some(seed) = bootstrap_config.seed {
        generation.seed = seed;
        planning.seed = seed;
    }
    if let Some(directory) = &bootstrap_config.output_directory {
        export.directory = directory.clone();
    }

    Config::Version1 { generation, planning, export }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    IO(#[from] std::io::Error),
    Yaml(#[from] serde_yml::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let err: &dyn Display = match self {
            ConfigError::IO(err) => err,
            ConfigError::Yaml(err) => err,
        };
        write!(f, "{}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap_config::LogLevel;
    use common::types::config::{DemandJoin, TableFormat};
    use std::io::Write;

    fn bootstrap(config_file: Option<String>) -> BootstrapConfig {
        BootstrapConfig {
            config_file,
            log_level: LogLevel::Off,
            n_clusters: None,
            route_bundle_size: None,
            seed: None,
            output_directory: None,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let Config::Version1 { planning, .. } = load_config(&bootstrap(None)).unwrap();
        assert_eq!(planning.n_clusters, 25);
        assert_eq!(planning.route_bundle_size, 5);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version: \"1\"\nplanning:\n  n_clusters: 8\n  route_bundle_size: 2").unwrap();

        let mut bootstrap_config = bootstrap(Some(file.path().to_string_lossy().into_owned()));
        bootstrap_config.route_bundle_size = Some(4);
        bootstrap_config.seed = Some(7);

        let Config::Version1 { generation, planning, .. } = load_config(&bootstrap_config).unwrap();
        assert_eq!(planning.n_clusters, 8);
        assert_eq!(planning.route_bundle_size, 4);
        assert_eq!(planning.seed, 7);
        assert_eq!(generation.seed, 7);
    }

    #[test]
    fn test_file_sections_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version: \"1\"\ngeneration:\n  num_stops: 12\nplanning:\n  n_clusters: 3\n  demand_join: zero_fill\nexport:\n  format: parquet\n  map: false").unwrap();

        let Config::Version1 { generation, planning, export } =
            load_config(&bootstrap(Some(file.path().to_string_lossy().into_owned()))).unwrap();
        assert_eq!(generation.num_stops, 12);
        assert_eq!(planning.n_clusters, 3);
        assert_eq!(planning.demand_join, DemandJoin::ZeroFill);
        assert_eq!(export.format, TableFormat::Parquet);
        assert!(!export.map);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.yaml");
        let Config::Version1 { generation, planning, export } =
            load_config(&bootstrap(Some(path.into()))).unwrap();
        assert_eq!(generation.num_stops, 300);
        assert_eq!(generation.num_events, 1000);
        assert_eq!(planning.n_clusters, 25);
        assert_eq!(planning.route_bundle_size, 5);
        assert_eq!(planning.demand_join, DemandJoin::Inner);
        assert_eq!(export.directory, "output");
        assert_eq!(export.format, TableFormat::Csv);
    }

    #[test]
    fn test_missing_file() {
        let config = load_config(&bootstrap(Some("/nonexistent/stopcluster.yaml".into())));
        assert!(matches!(config, Err(ConfigError::IO(_))));
    }
}
