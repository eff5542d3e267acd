pub mod config;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod error;
pub mod grid;
pub mod logging;
pub mod render;
pub mod types;
pub mod world;
