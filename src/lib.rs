pub mod alerts;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod tracker;
pub mod utils;
