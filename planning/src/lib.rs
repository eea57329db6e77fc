pub mod clustering;
pub mod demand;
pub mod generation;
pub mod pipeline;
pub mod routes;
