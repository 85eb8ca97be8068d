use crate::constants::METRICS_PREFIX;

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

// prometheus metrics label format
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Labels {
    pub node_id: String,
    pub chain_id: String,
}

impl Labels {
    // values in LABEL_NAMES order
    pub fn values(&self) -> [&str; 2] {
        [&self.node_id, &self.chain_id]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// Static description of one metric family. `name` is relative to
/// [`METRICS_PREFIX`].
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub label_names: &'static [&'static str],
}

impl MetricDescriptor {
    pub fn opts(&self) -> Opts {
        Opts::new(self.name, self.help).namespace(METRICS_PREFIX)
    }

    pub fn fq_name(&self) -> String {
        format!("{}_{}", METRICS_PREFIX, self.name)
    }
}

pub static LABEL_NAMES: [&str; 2] = ["node_id", "chain_id"];

pub static LATEST_BLOCK_HEIGHT: MetricDescriptor = MetricDescriptor {
    name: "latest_block_height",
    help: "Current block number.",
    kind: MetricKind::Counter,
    label_names: &LABEL_NAMES,
};

pub static LATEST_BLOCK_TIME_DIFF: MetricDescriptor = MetricDescriptor {
    name: "latest_block_time_diff",
    help: "Difference between current time and the latest block time.",
    kind: MetricKind::Gauge,
    label_names: &LABEL_NAMES,
};

pub static NUMBER_OF_PEERS: MetricDescriptor = MetricDescriptor {
    name: "number_of_peers",
    help: "Number of peers.",
    kind: MetricKind::Gauge,
    label_names: &LABEL_NAMES,
};

pub static DESCRIPTORS: [&MetricDescriptor; 3] =
    [&LATEST_BLOCK_HEIGHT, &LATEST_BLOCK_TIME_DIFF, &NUMBER_OF_PEERS];

// one labelled value produced during a scrape
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub descriptor: &'static MetricDescriptor,
    pub value: f64,
    pub labels: Labels,
}

impl MetricSample {
    pub fn new(descriptor: &'static MetricDescriptor, value: f64, labels: &Labels) -> Self {
        Self {
            descriptor,
            value,
            labels: labels.clone(),
        }
    }

    pub fn name(&self) -> String {
        self.descriptor.fq_name()
    }

    pub fn kind(&self) -> MetricKind {
        self.descriptor.kind
    }
}

/// Samples of one completed scrape, encoded through a registry that lives
/// only as long as the scrape.
#[derive(Debug)]
pub struct Snapshot {
    samples: Vec<MetricSample>,
}

impl Snapshot {
    pub fn new(samples: Vec<MetricSample>) -> Self {
        Self { samples }
    }

    pub fn registry(&self) -> Result<Registry, prometheus::Error> {
        let registry = Registry::new();
        for descriptor in DESCRIPTORS {
            let mut family = self
                .samples
                .iter()
                .filter(|s| std::ptr::eq(s.descriptor, descriptor))
                .peekable();
            if family.peek().is_none() {
                continue;
            }

            match descriptor.kind {
                MetricKind::Counter => {
                    let counters = CounterVec::new(descriptor.opts(), descriptor.label_names)?;
                    for sample in family {
                        // counters only move forward
                        if sample.value < 0.0 {
                            return Err(prometheus::Error::Msg(format!(
                                "negative value {} for counter {}",
                                sample.value,
                                sample.name()
                            )));
                        }
                        counters
                            .with_label_values(&sample.labels.values())
                            .inc_by(sample.value);
                    }
                    registry.register(Box::new(counters))?;
                }
                MetricKind::Gauge => {
                    let gauges = GaugeVec::new(descriptor.opts(), descriptor.label_names)?;
                    for sample in family {
                        gauges
                            .with_label_values(&sample.labels.values())
                            .set(sample.value);
                    }
                    registry.register(Box::new(gauges))?;
                }
            }
        }
        Ok(registry)
    }

    // prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry()?.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
