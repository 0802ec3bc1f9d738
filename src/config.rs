// config.rs

use std::{fs, net, path::Path, path::PathBuf};

use anyhow::bail;
use log::*;
use serde::{Deserialize, Serialize};

const DEFAULT_API_PORT: u16 = 8080;
const DEFAULT_FLUSH_DELAY: u64 = 5;
const DEFAULT_STORE_FILE: &str = "tempdash.store";

const PORT_ENV: &str = "DASH_PORT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub bind: net::Ipv4Addr,
    pub port: u16,
    pub store_file: PathBuf,
    /// Seconds between store flushes.
    pub flush_delay: u64,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            bind: net::Ipv4Addr::new(0, 0, 0, 0),
            port: option_env!("API_PORT")
                .unwrap_or("-")
                .parse()
                .unwrap_or(DEFAULT_API_PORT),
            store_file: option_env!("STORE_FILE")
                .unwrap_or(DEFAULT_STORE_FILE)
                .into(),
            flush_delay: DEFAULT_FLUSH_DELAY,
        }
    }
}

impl DashConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        info!("Reading config from {path:?}...");
        let s = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => bail!("Cannot read {path:?}: {e:?}"),
        };
        let c = match serde_json::from_str::<DashConfig>(&s) {
            Ok(c) => c,
            Err(e) => bail!("Cannot parse config {path:?}: {e}"),
        };
        c.validate()?;
        info!("Successfully parsed config.");
        Ok(c)
    }

    /// Defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut c = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Ok(port) = std::env::var(PORT_ENV) {
            c.port = match port.parse() {
                Ok(p) => p,
                Err(e) => bail!("{PORT_ENV}={port:?}: {e}"),
            };
        }
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.flush_delay == 0 {
            bail!("flush_delay must be at least 1 second");
        }
        if self.store_file.as_os_str().is_empty() {
            bail!("store_file must not be empty");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> net::SocketAddr {
        net::SocketAddr::from((self.bind, self.port))
    }
}


// EOF
