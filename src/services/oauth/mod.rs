pub mod client;
pub mod token_service;

pub use client::OAuthClient;
pub use token_service::TokenService;
