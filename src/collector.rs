use crate::error::ScrapeError;
use crate::gaiad::GaiadClient;
use crate::metrics::{
    Labels, MetricDescriptor, MetricSample, DESCRIPTORS, LATEST_BLOCK_HEIGHT,
    LATEST_BLOCK_TIME_DIFF, NUMBER_OF_PEERS,
};

use chrono::{DateTime, Utc};
use log::debug;

/// Turns one pass over the gaiad status API into metric samples.
///
/// Holds nothing between scrapes, so one instance can serve overlapping
/// requests.
#[derive(Debug, Clone)]
pub struct GaiadCollector {
    client: GaiadClient,
}

impl GaiadCollector {
    pub fn new(client: GaiadClient) -> Self {
        Self { client }
    }

    pub fn describe(&self) -> &'static [&'static MetricDescriptor] {
        &DESCRIPTORS
    }

    pub async fn collect(&self) -> Result<Vec<MetricSample>, ScrapeError> {
        self.collect_at(Utc::now()).await
    }

    // `now` is the reference point for the block time difference
    pub async fn collect_at(&self, now: DateTime<Utc>) -> Result<Vec<MetricSample>, ScrapeError> {
        let status = self.client.fetch_status().await?;
        let labels = Labels {
            node_id: status.node_id.clone(),
            chain_id: status.chain_id.clone(),
        };

        let mut samples = Vec::with_capacity(DESCRIPTORS.len());
        samples.push(MetricSample::new(
            &LATEST_BLOCK_HEIGHT,
            status.latest_block_height,
            &labels,
        ));
        samples.push(MetricSample::new(
            &LATEST_BLOCK_TIME_DIFF,
            status.block_time_diff(now),
            &labels,
        ));

        // peers are labelled with the identity from /status
        let net_info = self.client.fetch_net_info().await?;
        samples.push(MetricSample::new(&NUMBER_OF_PEERS, net_info.peer_count, &labels));

        for sample in &samples {
            debug!(
                "Collected {} ({:?}) = {} for {} on {}",
                sample.name(),
                sample.kind(),
                sample.value,
                labels.node_id,
                labels.chain_id
            );
        }
        Ok(samples)
    }
}
