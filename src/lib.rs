pub mod app;
pub mod auth;
pub mod config;
pub mod correlation;
pub mod db;
pub mod error;
pub mod exercises;
pub mod extract;
pub mod ownership;
pub mod pagination;
pub mod state;
pub mod stats;
pub mod workouts;
