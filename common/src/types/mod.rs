use std::fmt;
use std::fmt::{Display, Formatter};

pub mod config;
pub mod errors;

// A cluster label as produced by k-means
// Labels are continuous: with k clusters, all ids are from 0,...,k-1
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ClusterId(pub u32);

impl Display for ClusterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Routes are numbered in the order they were bundled, i.e. by descending demand
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RouteId(pub u32);

impl Display for RouteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
