pub mod aggregator;
pub mod config;
pub mod io;
pub mod normalizer;
pub mod pipeline;
pub mod scaler;
pub mod scoring;
pub mod types;
pub mod utils;
