use std::fmt;
use std::fmt::Formatter;
use crate::types::ClusterId;

#[derive(thiserror::Error, Debug)]
pub struct UnknownClusterIdError(pub ClusterId);

impl fmt::Display for UnknownClusterIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown Cluster ID {}", self.0)
    }
}

/// Configuration values that make a planning run impossible. These are detected before the
/// affected stage starts and are never worth retrying with the same input.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidConfiguration {
    NoClusters,
    TooManyClusters { n_clusters: usize, num_points: usize },
    NoRouteBundleSize,
    EmptyRange { name: &'static str },
    HourOutOfDay { hour: u32 },
}

impl fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidConfiguration::NoClusters => {
                write!(f, "n_clusters must be at least 1")
            }
            InvalidConfiguration::TooManyClusters { n_clusters, num_points } => {
                write!(f, "Cannot form {n_clusters} clusters from {num_points} stops")
            }
            InvalidConfiguration::NoRouteBundleSize => {
                write!(f, "route_bundle_size must be at least 1")
            }
            InvalidConfiguration::EmptyRange { name } => {
                write!(f, "The range '{name}' is empty")
            }
            InvalidConfiguration::HourOutOfDay { hour } => {
                write!(f, "Hour {hour} is outside of a day (0-24)")
            }
        }
    }
}
