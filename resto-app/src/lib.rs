pub mod application;
pub mod domain;
pub mod infrastructure;

mod app_context;
mod config;

pub use app_context::AppContext;
pub use config::{Config, ConfigError, GoogleConfig};
