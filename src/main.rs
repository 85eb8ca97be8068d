mod collector;
mod constants;
mod error;
mod gaiad;
mod http;
mod metrics;
mod models;
mod utils;

use clap::Parser;
use log::{error, info};
use std::process;
use std::sync::Arc;

use crate::collector::GaiadCollector;
use crate::gaiad::GaiadClient;
use crate::http::State;
use crate::utils::{Args, Config};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let client = match GaiadClient::new(&config.gaiad_endpoint, &config.client) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", crate::error::ConfigError::from(e));
            process::exit(1);
        }
    };
    info!("Using connection endpoint: {}", client.endpoint());
    if config.client.insecure_skip_verify {
        info!("TLS certificate verification of the endpoint is disabled");
    }

    let collector = GaiadCollector::new(client);
    for descriptor in collector.describe() {
        info!(
            "Exporting {} ({:?}) labelled by {}",
            descriptor.fq_name(),
            descriptor.kind,
            descriptor.label_names.join(", ")
        );
    }

    let state = State {
        collector: Arc::new(collector),
        metrics_path: Arc::from(config.metrics_path.as_str()),
    };

    let (addr, server) = match warp::serve(http::routes(state)).try_bind_ephemeral(config.listen_address) {
        Ok(bound) => bound,
        Err(e) => {
            error!("Unable to listen on {}: {}", config.listen_address, e);
            process::exit(1);
        }
    };

    info!("Serving metrics at http://{}{}", addr, config.metrics_path);
    server.await;
}
