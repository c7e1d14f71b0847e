use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::store::DEFAULT_BUSY_TIMEOUT;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Upper bound on how long a transaction waits for the database write
    /// lock. When it expires the operation fails with a store error.
    pub busy_timeout: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("setlist.db")
    }

    /// Rejects settings the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.busy_timeout.is_zero() {
            return Err(Error::Config(
                "busy timeout must be greater than zero".to_string(),
            ));
        }
        self.socket_addr().map_err(|e| {
            Error::Config(format!("invalid bind address {}:{}: {e}", self.host, self.port))
        })?;
        Ok(())
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}
