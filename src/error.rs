use std::fmt;

use thiserror::Error;

// coarse failure classes used in logs and the scrape failure body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Schema,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Schema => "schema",
        };
        f.write_str(s)
    }
}

/// Failure of a single scrape. Any of these aborts the whole scrape.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unable to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected document from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {field} {value:?}: {reason}")]
    Field {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Transport { .. } => ErrorKind::Transport,
            ScrapeError::Status { .. } | ScrapeError::Body { .. } => ErrorKind::Protocol,
            ScrapeError::Decode { .. } | ScrapeError::Field { .. } => ErrorKind::Schema,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid listen address {address:?}: {reason}")]
    ListenAddress { address: String, reason: String },

    #[error("metrics path {0:?} must start with '/'")]
    MetricsPath(String),

    #[error("unable to build upstream http client: {0}")]
    Client(#[from] reqwest::Error),
}
