pub mod analysis;
pub mod config;
pub mod dataset;
pub mod output;
