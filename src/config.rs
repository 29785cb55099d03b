use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the Salus iT600 gateway.
    pub gateway_host: String,
    /// Gateway EUID, printed on the bottom of the unit.
    pub gateway_euid: String,
    pub server_host: String,
    pub server_port: u16,
    /// JSON array of devices seeding the simulated gateway. Empty gateway when unset.
    pub devices_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).with_context(|| format!("missing required env var: {key}"))
        };

        Ok(Self {
            gateway_host: required("SALUS_GATEWAY_HOST")?,
            gateway_euid: required("SALUS_GATEWAY_EUID")?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            server_port: get("SERVER_PORT")
                .unwrap_or_else(|| "8000".to_owned())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            devices_file: get("SALUS_DEVICES_FILE").map(PathBuf::from),
        })
    }
}
