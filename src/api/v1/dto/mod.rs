pub mod site_config;
pub mod tokens;
