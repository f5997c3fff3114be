// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node configuration.
//!
//! Layered, last one wins:
//!
//! 1. built-in defaults;
//! 2. YAML file named by `ROSLINK_CONFIG_FILE` (optional);
//! 3. environment variables.
//!
//! ## Environment
//! - `ROS_MASTER_URI`: master endpoint (default: `http://localhost:11311`)
//! - `ROS_HOSTNAME`: advertised host name (takes precedence over `ROS_IP`)
//! - `ROS_IP`: advertised address
//! - `ROSLINK_NODE_NAME`: caller id used in topic requests
//! - `ROSLINK_MAX_NEGOTIATION_FAILURES`: unhealthy polls tolerated per publisher
//! - `ROSLINK_DISPATCH_TIMEOUT_MS`: dispatcher wait per spin
//! - `ROSLINK_MARKER_PACKAGES`: comma-separated marker packages for module discovery
//!
//! # Example YAML
//!
//! ```yaml
//! node_name: /listener
//! master_uri: http://robot:11311
//! negotiation:
//!   max_failures: 5
//!   dispatch_timeout_ms: 50
//! registry:
//!   marker_packages: [roslink]
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ENV_CONFIG_FILE: &str = "ROSLINK_CONFIG_FILE";
pub const ENV_MASTER_URI: &str = "ROS_MASTER_URI";
pub const ENV_HOSTNAME: &str = "ROS_HOSTNAME";
pub const ENV_IP: &str = "ROS_IP";
pub const ENV_NODE_NAME: &str = "ROSLINK_NODE_NAME";
pub const ENV_MAX_NEGOTIATION_FAILURES: &str = "ROSLINK_MAX_NEGOTIATION_FAILURES";
pub const ENV_DISPATCH_TIMEOUT_MS: &str = "ROSLINK_DISPATCH_TIMEOUT_MS";
pub const ENV_MARKER_PACKAGES: &str = "ROSLINK_MARKER_PACKAGES";

pub const DEFAULT_MASTER_URI: &str = "http://localhost:11311";
pub const DEFAULT_NODE_NAME: &str = "/roslink";
pub const DEFAULT_MAX_FAILURES: u32 = 3;
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 100;

/// Negotiation tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Unhealthy polls tolerated before a publisher is abandoned (>= 1).
    pub max_failures: u32,
    /// Upper bound of one dispatcher wait.
    pub dispatch_timeout_ms: u64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            max_failures: DEFAULT_MAX_FAILURES,
            dispatch_timeout_ms: DEFAULT_DISPATCH_TIMEOUT_MS,
        }
    }
}

impl NegotiationConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}

/// Module discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub marker_packages: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            marker_packages: vec!["roslink".to_string()],
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub node_name: String,
    pub master_uri: String,
    /// Advertised host (`ROS_HOSTNAME` or `ROS_IP`).
    pub hostname: Option<String>,
    pub negotiation: NegotiationConfig,
    pub registry: RegistryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: DEFAULT_NODE_NAME.to_string(),
            master_uri: DEFAULT_MASTER_URI.to_string(),
            hostname: None,
            negotiation: NegotiationConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Parse and validate a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: NodeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::debug!("[config] loading {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Defaults, then `ROSLINK_CONFIG_FILE`, then environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_empty(&lookup, ENV_CONFIG_FILE) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment values on `self`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = non_empty(&lookup, ENV_MASTER_URI) {
            self.master_uri = uri;
        }
        if let Some(host) =
            non_empty(&lookup, ENV_HOSTNAME).or_else(|| non_empty(&lookup, ENV_IP))
        {
            self.hostname = Some(host);
        }
        if let Some(name) = non_empty(&lookup, ENV_NODE_NAME) {
            self.node_name = name;
        }
        if let Some(raw) = non_empty(&lookup, ENV_MAX_NEGOTIATION_FAILURES) {
            self.negotiation.max_failures = parse(ENV_MAX_NEGOTIATION_FAILURES, &raw)?;
        }
        if let Some(raw) = non_empty(&lookup, ENV_DISPATCH_TIMEOUT_MS) {
            self.negotiation.dispatch_timeout_ms = parse(ENV_DISPATCH_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = non_empty(&lookup, ENV_MARKER_PACKAGES) {
            self.registry.marker_packages = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_name.is_empty() {
            return Err(Error::Config("node_name must not be empty".into()));
        }
        if self.negotiation.max_failures == 0 {
            return Err(Error::Config("negotiation.max_failures must be >= 1".into()));
        }
        if self.registry.marker_packages.is_empty() {
            return Err(Error::Config(
                "registry.marker_packages must name at least one package".into(),
            ));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|s| !s.trim().is_empty())
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{}: invalid value {:?}", key, raw)))
}
