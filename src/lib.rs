pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod trace;
pub mod waypoint;
