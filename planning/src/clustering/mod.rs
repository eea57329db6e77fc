pub mod k_means;
pub mod summary;
pub use k_means::cluster as cluster;
pub use summary::summarize_clusters as summarize_clusters;
