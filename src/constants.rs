// prometheus metrics namespace
pub static METRICS_PREFIX: &str = "gaiad";

// upstream daemon api paths
pub static STATUS_API: &str = "/status";
pub static NETWORK_API: &str = "/net_info";

// environment variables
pub static ENDPOINT_ENV: &str = "GAIAD_ENDPOINT";

// cli defaults
pub static DEFAULT_LISTEN_ADDRESS: &str = ":9101";
pub static DEFAULT_METRICS_PATH: &str = "/metrics";
