use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use log::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the `<title>.txt` page files
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            template_dir: PathBuf::from("web/template"),
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
        }
    }

    /// Defaults, overridden by `TINYWIKI_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(dir) = lookup("TINYWIKI_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("TINYWIKI_TEMPLATE_DIR") {
            config.template_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("TINYWIKI_HOST") {
            match host.parse() {
                Ok(addr) => config.host = addr,
                Err(_) => warn!("Ignoring invalid TINYWIKI_HOST '{}', using {}", host, config.host),
            }
        }
        if let Some(port) = lookup("TINYWIKI_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Ignoring invalid TINYWIKI_PORT '{}', using {}", port, config.port),
            }
        }

        config
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
