use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ExplorerConfig;
use crate::error::ApiError;
use crate::record::{Neighborhood, NeighborhoodWire, Record};

pub const RECORDS_PATH: &str = "/clip-pairs";
pub const NEIGHBORHOOD_PATH: &str = "/neighborhood";

/// Body of the neighborhood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodQuery {
    pub selected_idx: usize,
    pub k: usize,
}

/// Source of the corpus and of per-record neighborhoods.
///
/// Futures are not required to be `Send`; the explorer drives them on a
/// single-threaded runtime next to its `Rc` view state.
pub trait Backend {
    fn fetch_records(&self) -> LocalBoxFuture<'_, Result<Vec<Record>, ApiError>>;

    fn fetch_neighborhood(
        &self,
        selected_idx: usize,
        k: usize,
    ) -> LocalBoxFuture<'_, Result<Neighborhood, ApiError>>;
}

/// JSON-over-HTTP backend.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ExplorerConfig,
}

impl HttpBackend {
    pub fn new(config: &ExplorerConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;
        decode(path, resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        debug!(%url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        decode(path, resp).await
    }
}

async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        warn!(endpoint = path, %status, "backend returned an error status");
        return Err(ApiError::Status {
            endpoint: path.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
        endpoint: path.to_string(),
        message: e.to_string(),
    })
}

impl Backend for HttpBackend {
    fn fetch_records(&self) -> LocalBoxFuture<'_, Result<Vec<Record>, ApiError>> {
        Box::pin(async move {
            let records: Vec<Record> = self.get_json(RECORDS_PATH).await?;
            debug!(count = records.len(), "corpus loaded");
            Ok(records)
        })
    }

    fn fetch_neighborhood(
        &self,
        selected_idx: usize,
        k: usize,
    ) -> LocalBoxFuture<'_, Result<Neighborhood, ApiError>> {
        Box::pin(async move {
            let query = NeighborhoodQuery { selected_idx, k };
            let wire: NeighborhoodWire = self.post_json(NEIGHBORHOOD_PATH, &query).await?;
            let neighborhood = Neighborhood::try_from(wire)?;
            debug!(
                selected_idx,
                points = neighborhood.len(),
                "neighborhood loaded"
            );
            Ok(neighborhood)
        })
    }
}
