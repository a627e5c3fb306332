pub mod auth_request;
pub mod auth_response;
