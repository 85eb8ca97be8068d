use chrono::{DateTime, Utc};
use serde::Deserialize;

// every gaiad rpc document wraps its payload in `result`
#[derive(Deserialize, Debug, Clone)]
pub struct RpcResponse<T> {
    pub result: T,
}

// GET {base}/status
#[derive(Deserialize, Debug, Clone)]
pub struct StatusResult {
    pub node_info: NodeInfo,
    pub sync_info: SyncInfo,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NodeInfo {
    pub id: String,
    pub network: String,
}

// heights and times arrive as strings
#[derive(Deserialize, Debug, Clone)]
pub struct SyncInfo {
    pub latest_block_height: String,
    pub latest_block_time: String,
}

// GET {base}/net_info
#[derive(Deserialize, Debug, Clone)]
pub struct NetInfoResult {
    pub n_peers: String,
}

/// Node identity and sync position extracted from one `/status` document.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamStatus {
    pub node_id: String,
    pub chain_id: String,
    pub latest_block_height: f64,
    pub latest_block_time: DateTime<Utc>,
}

impl UpstreamStatus {
    /// Seconds elapsed between the latest block and `now`.
    ///
    /// Negative when the upstream clock runs ahead of ours; no correction is applied.
    pub fn block_time_diff(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(self.latest_block_time);
        match elapsed.num_nanoseconds() {
            Some(nanos) => nanos as f64 / 1e9,
            None => elapsed.num_milliseconds() as f64 / 1e3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamNetworkInfo {
    pub peer_count: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_document_deserializes() {
        let body = r#"{"jsonrpc":"2.0","id":-1,"result":{
            "node_info":{"id":"abc123","network":"testnet-1","moniker":"val"},
            "sync_info":{"latest_block_height":"500","latest_block_time":"2024-01-01T00:00:00Z","catching_up":false}
        }}"#;
        let doc: RpcResponse<StatusResult> = serde_json::from_str(body).unwrap();
        assert_eq!(doc.result.node_info.id, "abc123");
        assert_eq!(doc.result.node_info.network, "testnet-1");
        assert_eq!(doc.result.sync_info.latest_block_height, "500");
    }

    #[test]
    fn numeric_height_is_a_shape_error() {
        let body = r#"{"result":{"node_info":{"id":"a","network":"b"},
            "sync_info":{"latest_block_height":500,"latest_block_time":"2024-01-01T00:00:00Z"}}}"#;
        assert!(serde_json::from_str::<RpcResponse<StatusResult>>(body).is_err());
    }

    #[test]
    fn missing_peer_count_is_a_shape_error() {
        assert!(serde_json::from_str::<RpcResponse<NetInfoResult>>(r#"{"result":{}}"#).is_err());
    }

    #[test]
    fn block_time_diff_in_seconds() {
        let status = UpstreamStatus {
            node_id: "abc123".into(),
            chain_id: "testnet-1".into(),
            latest_block_height: 500.0,
            latest_block_time: "2024-01-01T00:00:00Z".parse().unwrap(),
        };
        let now: DateTime<Utc> = "2024-01-01T00:01:40.250Z".parse().unwrap();
        assert!((status.block_time_diff(now) - 100.25).abs() < 1e-9);

        // upstream clock ahead of ours
        let early: DateTime<Utc> = "2023-12-31T23:59:58Z".parse().unwrap();
        assert!((status.block_time_diff(early) + 2.0).abs() < 1e-9);
    }
}
