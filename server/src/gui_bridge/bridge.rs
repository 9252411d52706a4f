use crate::gui_bridge::model::BridgeModel;
use anyhow::Context;
use log::info;
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use warp::Filter;

/// HTTP routes exposing the dataset, the viewer configuration and the
/// offline summary.
pub fn routes(
    model: Arc<BridgeModel>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let model_filter = warp::any().map(move || model.clone());

    let dataset_route = warp::path("aggregated_data.json")
        .and(warp::path::end())
        .and(warp::get())
        .and(model_filter.clone())
        .map(|model: Arc<BridgeModel>| warp::reply::json(&model.store.records()));

    let config_route = warp::path("config")
        .and(warp::path::end())
        .and(warp::get())
        .and(model_filter.clone())
        .map(|model: Arc<BridgeModel>| warp::reply::json(&model.session));

    let summary_route = warp::path("summary")
        .and(warp::path::end())
        .and(warp::get())
        .and(model_filter)
        .map(|model: Arc<BridgeModel>| warp::reply::json(&model.summary));

    dataset_route.or(config_route).or(summary_route)
}

/// Background HTTP server. The listener is bound before the serving thread
/// starts, so an unusable address is reported to the caller.
pub struct DatasetBridge {
    address: SocketAddr,
}

impl DatasetBridge {
    pub fn spawn(model: Arc<BridgeModel>, address: SocketAddr) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building runtime for the HTTP bridge")?;

        let (bound, server) = {
            let _guard = runtime.enter();
            warp::serve(routes(model))
                .try_bind_ephemeral(address)
                .with_context(|| format!("binding HTTP bridge to {address}"))?
        };

        thread::spawn(move || runtime.block_on(server));

        Ok(Self { address: bound })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn publish_status(&self, message: &str) {
        info!("[bridge {}] {}", self.address, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use ridercore::{SessionConfig, StationRecord};

    fn model() -> Arc<BridgeModel> {
        let runner = Runner::new(WorkflowConfig::from_args(None, 6, 1));
        let store = runner.load_store().unwrap();
        let summary = runner.execute(&store);
        Arc::new(BridgeModel::new(store, SessionConfig::default(), summary))
    }

    #[tokio::test]
    async fn dataset_route_serves_raw_records() {
        let model = model();
        let response = warp::test::request()
            .method("GET")
            .path("/aggregated_data.json")
            .reply(&routes(model.clone()))
            .await;

        assert_eq!(response.status(), 200);
        let records: Vec<StationRecord> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(records.len(), model.store.len());
    }

    #[tokio::test]
    async fn config_route_serves_session_config() {
        let response = warp::test::request()
            .path("/config")
            .reply(&routes(model()))
            .await;

        assert_eq!(response.status(), 200);
        let config: SessionConfig = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[tokio::test]
    async fn summary_route_reports_counts() {
        let model = model();
        let response = warp::test::request()
            .path("/summary")
            .reply(&routes(model.clone()))
            .await;

        let summary: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(summary["record_count"], model.summary.record_count);
    }

    #[test]
    fn spawn_reports_the_bound_address() {
        let any_port = SocketAddr::from(([127, 0, 0, 1], 0));
        let bridge = DatasetBridge::spawn(model(), any_port).unwrap();
        assert_ne!(bridge.address().port(), 0);
    }

    #[test]
    fn spawn_fails_when_the_address_is_taken() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = taken.local_addr().unwrap();

        let err = DatasetBridge::spawn(model(), address).err().unwrap();
        assert!(err.to_string().contains("binding HTTP bridge"));
    }

    #[tokio::test]
    async fn unknown_route_is_rejected() {
        let response = warp::test::request()
            .path("/ingest")
            .reply(&routes(model()))
            .await;
        assert_eq!(response.status(), 404);
    }
}
