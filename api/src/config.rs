use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
}

/// Startup configuration, read once from the environment.
///
/// Keys are the upper-cased field names (`JWT_SECRET`, `SERVER_PORT`, ...).
/// Only `JWT_SECRET` is required.
#[derive(Clone, Deserialize)]
pub struct Config {
    pub jwt_secret: String,
    #[serde(default = "default_server_address")]
    pub server_address: IpAddr,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Request body cap; must leave room for a full thumbnail plus form fields.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_server_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
fn default_server_port() -> u16 {
    3000
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}
fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if e.not_found() {
                debug!("No .env file found");
            } else {
                return Err(e.into());
            }
        }

        envy::from_env().map_err(ConfigError::from)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_address, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config: Config = envy::from_iter(vars(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.max_body_bytes > crate::media::THUMBNAIL_LIMIT);
    }

    #[test]
    fn overrides_are_read() {
        let config: Config = envy::from_iter(vars(&[
            ("JWT_SECRET", "s3cret"),
            ("SERVER_ADDRESS", "127.0.0.1"),
            ("SERVER_PORT", "3333"),
            ("UPLOAD_DIR", "/var/blog/uploads"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3333");
        assert_eq!(config.upload_dir, PathBuf::from("/var/blog/uploads"));
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn secret_is_required() {
        assert!(envy::from_iter::<_, Config>(vars(&[("SERVER_PORT", "3000")])).is_err());
    }
}
