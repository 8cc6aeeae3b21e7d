pub mod analyzer;
pub mod api;
pub mod config;
pub mod export;
pub mod listing;
pub mod model;
pub mod normalizer;
pub mod query;
pub mod storage;
pub mod utils;
