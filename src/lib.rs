// Library exports for Neon Genesis
// This allows integration tests and the binary to share the app modules

pub mod auth;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod views;
