//! Configuration loading and application bootstrap for codellm.

pub mod bootstrap;
pub mod config;

pub use bootstrap::{AppBuilder, Services};
pub use config::Config;
