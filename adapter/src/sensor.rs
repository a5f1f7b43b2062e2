use async_trait::async_trait;
use kernel::{
    model::{
        id::SlotId,
        sensor::{FreeSlotCheck, OccupancySnapshot},
    },
    repository::sensor::SensorRepository,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{config::SensorConfig, error::AppResult};

/// ESP32 側の Web サーバーに問い合わせる
pub struct SensorClient {
    client: Client,
    base_url: String,
}

impl SensorClient {
    pub fn new(config: &SensorConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let bytes = self
            .client
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl SensorRepository for SensorClient {
    async fn sensor_status(&self) -> AppResult<OccupancySnapshot> {
        self.get_json("getSensorStatus").await
    }

    async fn free_slot_check(&self) -> AppResult<Option<SlotId>> {
        let check: FreeSlotCheck = self.get_json("freeSlotCheck").await?;
        Ok(check.event())
    }

    async fn open_gate(&self) -> AppResult<()> {
        let body = self
            .client
            .get(self.url("openGate"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        tracing::info!(response = %body, "Gate open requested");
        Ok(())
    }
}
