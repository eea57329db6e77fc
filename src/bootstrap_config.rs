use log::LevelFilter;
use clap::Parser;

#[derive(Parser, Clone)]
#[command(version, about)]
pub struct BootstrapConfig {
    /// YAML config file. Without one, built-in defaults are used
    #[clap(short('c'), long("config"), env("STOPCLUSTER_CONFIG"))]
    pub config_file: Option<String>,
    #[clap(short('l'), long("log-level"), env("STOPCLUSTER_LOG_LEVEL"), default_value_t, value_enum)]
    pub log_level: LogLevel,
    /// Overrides `planning.n_clusters`
    #[clap(short('k'), long("clusters"), env("STOPCLUSTER_CLUSTERS"))]
    pub n_clusters: Option<u32>,
    /// Overrides `planning.route_bundle_size`
    #[clap(short('r'), long("route-size"), env("STOPCLUSTER_ROUTE_SIZE"))]
    pub route_bundle_size: Option<u32>,
    /// Overrides both the generation and the clustering seed
    #[clap(short('s'), long("seed"), env("STOPCLUSTER_SEED"))]
    pub seed: Option<u64>,
    /// Overrides `export.directory`
    #[clap(short('o'), long("output"), env("STOPCLUSTER_OUTPUT"))]
    pub output_directory: Option<String>,
}

impl BootstrapConfig {
    pub fn read() -> Self {
        BootstrapConfig::parse()
    }
}


#[derive(clap::ValueEnum, Clone, Default)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}
