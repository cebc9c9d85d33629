//! Command-line configuration for the standalone server.
//!
//! Every option can also come from the environment, using the variable names
//! the notebook server itself understands where one exists.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::FileStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory given and the home directory could not be determined")]
    NoConfigDir,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "snips",
    version,
    about = "Serves the notebook snippet and tag store over HTTP"
)]
pub struct Args {
    /// Directory holding `snippets/snippets.json` and `snippets/tags.json`
    /// [default: ~/.jupyter]
    #[arg(long, env = "JUPYTER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "SNIPS_BIND", default_value = "127.0.0.1:8888")]
    pub bind: SocketAddr,

    /// Host base URL; routes are served under `<base-url>/jupyterlab-snips`
    #[arg(long, env = "JUPYTER_BASE_URL", default_value = "/")]
    pub base_url: String,

    /// Token requests must present; no check when unset
    #[arg(long, env = "JUPYTER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Serialize load-modify-save sequences per document
    #[arg(long)]
    pub serialize_writes: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Resolved settings for [`crate::server::run`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub config_dir: PathBuf,
    pub bind: SocketAddr,
    pub base_url: String,
    pub token: Option<String>,
    pub serialize_writes: bool,
}

impl Args {
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let config_dir = match self.config_dir {
            Some(dir) => dir,
            None => FileStore::default_config_dir().ok_or(ConfigError::NoConfigDir)?,
        };

        Ok(ServerConfig {
            config_dir,
            bind: self.bind,
            base_url: self.base_url,
            token: self.token.filter(|t| !t.is_empty()),
            serialize_writes: self.serialize_writes,
        })
    }
}
