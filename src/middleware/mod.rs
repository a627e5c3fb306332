pub mod auth;
pub mod http;
pub mod path_guard;
