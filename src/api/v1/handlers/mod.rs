pub mod health;
pub mod raw;
pub mod site_config;
pub mod tokens;
