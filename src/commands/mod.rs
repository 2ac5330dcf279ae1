use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::types::Config;

pub mod calendar;
pub mod config;
pub mod generate;
pub mod goals;
pub mod program;
pub mod session;
pub mod status;
pub mod sync;

pub fn config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("stride").join("config"))
        .context("Could not determine config directory")
}

pub fn load_config() -> Result<Config> {
    Config::load(&config_path()?)
}

pub fn client(cfg: &Config) -> ApiClient {
    ApiClient::new(cfg.api_url(), cfg.api_token(), cfg.user_id())
}
