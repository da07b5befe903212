//! Library exports for routeguard, shared between the binary and tests.

pub mod config;
pub mod guard;
pub mod models;
pub mod providers;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod utils;
