pub mod builder;
pub mod cache;
pub mod canonical;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod fetch;
pub mod geometry;
pub mod grid;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod utils;
