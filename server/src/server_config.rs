use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use common::config::Validate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "server_config.yaml";
pub const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    /// 0 lets the OS pick a free port.
    pub port: u16,
    /// Directory served under `/ui` when set.
    pub static_files_path: Option<PathBuf>,
    /// Reject a move from the player who moved last.
    pub enforce_turn_order: bool,
    pub log_prefix: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_files_path: None,
            enforce_turn_order: false,
            log_prefix: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .listen_address
            .parse()
            .map_err(|e| format!("Invalid listen address '{}': {}", self.listen_address, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.socket_addr()?;
        if let Some(path) = &self.static_files_path
            && path.as_os_str().is_empty()
        {
            return Err("static_files_path must not be empty".to_string());
        }
        Ok(())
    }
}
