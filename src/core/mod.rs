pub mod config;
pub mod error;
pub mod logging;
pub mod rating;
pub mod registration;
pub mod types;
pub mod validation;
pub mod vip;
