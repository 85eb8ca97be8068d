use prometheus::{Encoder, TextEncoder};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::collector::GaiadCollector;
use crate::metrics::Snapshot;

#[derive(Clone)]
pub struct State {
    pub collector: Arc<GaiadCollector>,
    pub metrics_path: Arc<str>,
}

// GET {metrics_path}; everything else is a 404
pub fn routes(state: State) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let metrics_path = state.metrics_path.clone();
    let on_metrics_path = warp::path::full()
        .and_then(move |path: FullPath| {
            let metrics_path = metrics_path.clone();
            async move {
                if path.as_str() == &*metrics_path {
                    Ok(())
                } else {
                    Err(warp::reject::not_found())
                }
            }
        })
        .untuple_one();

    warp::get()
        .and(on_metrics_path)
        .and(warp::any().map(move || state.clone()))
        .and_then(handle_metrics)
}

// one scrape per request
pub async fn handle_metrics(state: State) -> Result<Response, Infallible> {
    let samples = match state.collector.collect().await {
        Ok(samples) => samples,
        Err(e) => {
            log::error!("Scrape failed ({} error): {}", e.kind(), e);
            return Ok(warp::reply::with_status(
                format!("scrape failed: {e}\n"),
                StatusCode::SERVICE_UNAVAILABLE,
            )
            .into_response());
        }
    };

    let encoded = match Snapshot::new(samples).encode() {
        Ok(encoded) => encoded,
        Err(e) => {
            log::error!("Unable to encode metrics: {}", e);
            return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };

    let content_type = TextEncoder::new().format_type().to_string();
    Ok(warp::reply::with_header(encoded, "content-type", content_type).into_response())
}
