use crate::constants::{DEFAULT_LISTEN_ADDRESS, DEFAULT_METRICS_PATH, ENDPOINT_ENV};
use crate::error::ConfigError;
use crate::gaiad::ClientOptions;

use clap::Parser;
use log::{info, warn};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

// argument parser format
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Address to listen on as `host:port`, `:port` binds all interfaces
    #[arg(long, default_value_t = String::from(DEFAULT_LISTEN_ADDRESS))]
    pub listen_address: String,

    /// Path to expose metrics on
    #[arg(long, default_value_t = String::from(DEFAULT_METRICS_PATH))]
    pub metrics_path: String,

    /// Path to an environment file
    #[arg(long)]
    pub config_file_path: Option<String>,

    /// Skip TLS certificate verification of the gaiad endpoint
    #[arg(long)]
    pub insecure_skip_verify: bool,

    /// Overall timeout for each upstream request, in seconds
    #[arg(long)]
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    pub gaiad_endpoint: String,
    pub client: ClientOptions,
}

impl Config {
    // load the env file, then resolve against the process environment
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        load_env_file(args.config_file_path.as_deref());
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    pub fn resolve<F>(args: &Args, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !args.metrics_path.starts_with('/') {
            return Err(ConfigError::MetricsPath(args.metrics_path.clone()));
        }

        let gaiad_endpoint = lookup(ENDPOINT_ENV).unwrap_or_default();
        if gaiad_endpoint.is_empty() {
            warn!("{} is not set, every scrape will fail", ENDPOINT_ENV);
        }

        Ok(Self {
            listen_address: parse_listen_address(&args.listen_address)?,
            metrics_path: args.metrics_path.clone(),
            gaiad_endpoint,
            client: ClientOptions {
                insecure_skip_verify: args.insecure_skip_verify,
                timeout: args.upstream_timeout_secs.map(Duration::from_secs),
            },
        })
    }
}

fn load_env_file(path: Option<&str>) {
    match path {
        Some(path) => {
            info!("Loading {} env file.", path);
            if let Err(e) = dotenvy::from_filename(path) {
                warn!("Error loading {} env file: {}", path, e);
            }
        }
        None => {
            if dotenvy::dotenv().is_err() {
                info!("Error loading .env file, assume env variables are set.");
            }
        }
    }
}

// accepts `host:port` (host names are resolved) and the bare `:port` form
pub fn parse_listen_address(address: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = |reason: String| ConfigError::ListenAddress {
        address: address.to_string(),
        reason,
    };

    if let Some(port) = address.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|e| invalid(format!("{e}")))?;
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }
    address
        .to_socket_addrs()
        .map_err(|e| invalid(format!("{e}")))?
        .next()
        .ok_or_else(|| invalid("no address resolved".to_string()))
}
