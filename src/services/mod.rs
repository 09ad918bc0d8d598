pub mod cache;
pub mod credentials;
pub mod drive;
pub mod oauth;
pub mod protected;
pub mod raw_gateway;
