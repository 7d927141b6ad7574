//! Library entrypoint for pricewatch.
//!
//! Integration tests under `tests/` build the monitor with fake quote and
//! notification backends and drive it through the same services and routes.

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub monitor: services::monitor::Monitor,
}
