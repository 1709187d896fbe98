#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, MovieArgs, UpdateArgs};
pub use toml_config::{AppConfig, LogFormat};
