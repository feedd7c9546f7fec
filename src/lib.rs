pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod lookup;
pub mod map;
pub mod models;
pub mod ui;
