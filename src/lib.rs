pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod plan;
pub mod state;
