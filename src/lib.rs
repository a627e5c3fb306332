//! E-library API gateway: bearer-token identity relay in front of the
//! auth, catalog and reader services.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod path_pattern;
pub mod services;
pub mod state;
