pub mod client;
pub mod routes;

pub use client::{ProxyError, UpstreamClient};
pub use routes::{Route, RouteTable};
