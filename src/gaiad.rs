use crate::constants::{NETWORK_API, STATUS_API};
use crate::error::ScrapeError;
use crate::models::{
    NetInfoResult, RpcResponse, StatusResult, UpstreamNetworkInfo, UpstreamStatus,
};

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

// transport settings for the upstream daemon
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub insecure_skip_verify: bool,
    pub timeout: Option<Duration>,
}

// gaiad rpc actions
#[derive(Debug, Clone)]
pub struct GaiadClient {
    endpoint: String,
    client: Client,
}

impl GaiadClient {
    // instantiate a new gaiad rpc client
    pub fn new(endpoint: &str, options: &ClientOptions) -> Result<Self, reqwest::Error> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(options.insecure_skip_verify);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn query<T: DeserializeOwned>(&self, path: &str) -> Result<T, ScrapeError> {
        let url = self.url(path);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ScrapeError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status { url, status });
        }

        let body = resp.bytes().await.map_err(|source| ScrapeError::Body {
            url: url.clone(),
            source,
        })?;

        let doc: RpcResponse<T> =
            serde_json::from_slice(&body).map_err(|source| ScrapeError::Decode { url, source })?;
        Ok(doc.result)
    }

    // get node identity and latest block from /status
    pub async fn fetch_status(&self) -> Result<UpstreamStatus, ScrapeError> {
        let status: StatusResult = self.query(STATUS_API).await?;
        let latest_block_height =
            parse_count("latest_block_height", &status.sync_info.latest_block_height)?;
        let latest_block_time =
            parse_block_time(&status.sync_info.latest_block_time)?;

        debug!(
            "Fetched status of {} on {}: height {}",
            status.node_info.id, status.node_info.network, latest_block_height
        );
        Ok(UpstreamStatus {
            node_id: status.node_info.id,
            chain_id: status.node_info.network,
            latest_block_height,
            latest_block_time,
        })
    }

    // get peer count from /net_info
    pub async fn fetch_net_info(&self) -> Result<UpstreamNetworkInfo, ScrapeError> {
        let net_info: NetInfoResult = self.query(NETWORK_API).await?;
        let peer_count = parse_count("n_peers", &net_info.n_peers)?;

        debug!("Fetched net info: {} peers", peer_count);
        Ok(UpstreamNetworkInfo { peer_count })
    }
}

// integer counts are string encoded; exposed as f64
fn parse_count(field: &'static str, value: &str) -> Result<f64, ScrapeError> {
    let invalid = |reason: String| ScrapeError::Field {
        field,
        value: value.to_string(),
        reason,
    };
    let count = value.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !count.is_finite() || count < 0.0 {
        return Err(invalid("not a non-negative count".to_string()));
    }
    Ok(count)
}

fn parse_block_time(value: &str) -> Result<DateTime<Utc>, ScrapeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ScrapeError::Field {
            field: "latest_block_time",
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use mockito::{Mock, Server, ServerGuard};

    pub(crate) const STATUS_FIXTURE: &str = r#"{"result":{"node_info":{"id":"abc123","network":"testnet-1"},"sync_info":{"latest_block_height":"500","latest_block_time":"2024-01-01T00:00:00Z"}}}"#;
    pub(crate) const NET_INFO_FIXTURE: &str = r#"{"result":{"n_peers":"3"}}"#;

    pub(crate) async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    fn client_for(server: &ServerGuard) -> GaiadClient {
        GaiadClient::new(&server.url(), &ClientOptions::default()).unwrap()
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = GaiadClient::new("http://localhost:26657/", &ClientOptions::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:26657");
        assert_eq!(client.url(STATUS_API), "http://localhost:26657/status");
    }

    #[test]
    fn block_time_accepts_fractional_seconds_and_offsets() {
        let t = parse_block_time("2024-01-01T02:00:00.5+02:00").unwrap();
        assert_eq!(t, "2024-01-01T00:00:00.5Z".parse::<DateTime<Utc>>().unwrap());
        assert!(parse_block_time("yesterday").is_err());
    }

    #[tokio::test]
    async fn fetch_status_extracts_identity_and_height() {
        let mut server = Server::new_async().await;
        let _m = mock_json(&mut server, "/status", STATUS_FIXTURE).await;

        let status = client_for(&server).fetch_status().await.unwrap();
        assert_eq!(status.node_id, "abc123");
        assert_eq!(status.chain_id, "testnet-1");
        assert_eq!(status.latest_block_height, 500.0);
        assert_eq!(
            status.latest_block_time,
            "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[tokio::test]
    async fn fetch_net_info_extracts_peer_count() {
        let mut server = Server::new_async().await;
        let _m = mock_json(&mut server, "/net_info", r#"{"result":{"n_peers":"7"}}"#).await;

        let net_info = client_for(&server).fetch_net_info().await.unwrap();
        assert_eq!(net_info.peer_count, 7.0);
    }

    #[tokio::test]
    async fn non_numeric_height_is_a_field_error() {
        let mut server = Server::new_async().await;
        let body = STATUS_FIXTURE.replace(r#""500""#, r#""five hundred""#);
        let _m = mock_json(&mut server, "/status", &body).await;

        let err = client_for(&server).fetch_status().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Field { field: "latest_block_height", .. }));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn counts_must_be_finite_and_non_negative() {
        assert_eq!(parse_count("n_peers", "7").unwrap(), 7.0);
        assert!(parse_count("n_peers", "-1").is_err());
        assert!(parse_count("latest_block_height", "NaN").is_err());
        assert!(parse_count("latest_block_height", "inf").is_err());
    }

    #[tokio::test]
    async fn missing_key_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _m = mock_json(&mut server, "/status", r#"{"result":{"node_info":{"id":"abc123"}}}"#).await;

        let err = client_for(&server).fetch_status().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Decode { .. }));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[tokio::test]
    async fn non_success_status_is_a_protocol_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/net_info")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let err = client_for(&server).fetch_net_info().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { .. }));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn empty_endpoint_is_a_transport_error() {
        let client = GaiadClient::new("", &ClientOptions::default()).unwrap();
        let err = client.fetch_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
