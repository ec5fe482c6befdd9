pub mod analysis;
pub mod cache;
pub mod common;
pub mod config;
pub mod data_loader;
pub mod errors;
pub mod export;
pub mod graph;
pub mod history;
pub mod mutator;
pub mod table;
pub mod transformations;
pub mod workspace;
