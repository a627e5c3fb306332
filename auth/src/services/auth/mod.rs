pub mod account_service;
pub mod password;
pub mod token_issuer;

pub use account_service::AccountService;
pub use token_issuer::TokenIssuer;
