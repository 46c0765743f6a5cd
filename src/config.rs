//! Configuration for `telar.toml`.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! mount = "/static/components/"   # URL prefix declared assets are served at
//! extensions = [".css", ".js"]    # Extensions the router will serve
//!
//! [serve]
//! interface = "127.0.0.1"         # Network interface (127.0.0.1 = localhost only)
//! port = 7536                     # HTTP port number
//! autorefresh = true              # Re-check roots on every request (development)
//! ```

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration structure representing telar.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Asset mounting and extension settings.
    pub assets: AssetsConfig,

    /// Development server settings.
    pub serve: ServeConfig,
}

/// `[assets]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// URL prefix declared assets are addressed under.
    /// Normalized to carry a leading and trailing slash.
    pub mount: String,

    /// File extensions the router is allowed to serve.
    pub extensions: Vec<String>,

    /// File extension of component source files.
    pub component_ext: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            mount: "/static/components/".to_string(),
            extensions: vec![".css".to_string(), ".js".to_string()],
            component_ext: ".html".to_string(),
        }
    }
}

/// `[serve]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Re-check registered roots on every request instead of serving a
    /// snapshot computed at startup. Development convenience; disable in
    /// production.
    pub autorefresh: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 7536,
            autorefresh: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: Self = toml::from_str(&raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Load from a file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Normalize and validate loaded values.
    fn normalize(&mut self) -> Result<(), ConfigError> {
        let mount = &mut self.assets.mount;
        if mount.is_empty() {
            return Err(ConfigError::Validation(
                "assets.mount must not be empty".to_string(),
            ));
        }
        if !mount.starts_with('/') {
            mount.insert(0, '/');
        }
        if !mount.ends_with('/') {
            mount.push('/');
        }

        for ext in &mut self.assets.extensions {
            if !ext.starts_with('.') {
                ext.insert(0, '.');
            }
        }

        if !self.assets.component_ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "assets.component_ext must start with a dot, got `{}`",
                self.assets.component_ext
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.normalize().unwrap();
        config
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.assets.mount, "/static/components/");
        assert_eq!(config.assets.extensions, [".css", ".js"]);
        assert_eq!(config.assets.component_ext, ".html");
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 7536);
        assert!(config.serve.autorefresh);
    }

    #[test]
    fn test_partial_override() {
        let config = parse("[serve]\nport = 8080\nautorefresh = false");
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.autorefresh);
        // untouched sections keep defaults
        assert_eq!(config.assets.mount, "/static/components/");
    }

    #[test]
    fn test_mount_normalization() {
        let config = parse("[assets]\nmount = \"assets\"");
        assert_eq!(config.assets.mount, "/assets/");
    }

    #[test]
    fn test_extension_normalization() {
        let config = parse("[assets]\nextensions = [\"css\", \".mjs\"]");
        assert_eq!(config.assets.extensions, [".css", ".mjs"]);
    }

    #[test]
    fn test_empty_mount_rejected() {
        let mut config: Config = toml::from_str("[assets]\nmount = \"\"").unwrap();
        assert!(config.normalize().is_err());
    }
}
