mod protocol;

use anyhow::Context;
use infrastructure::HttpClientConfig;
use reqwest_middleware::ClientWithMiddleware;

use crate::core::id::RoomId;
use crate::core::reading::{SensorReading, TimeFrame};
use crate::port::SensorGateway;

use protocol::{OmiReadRequest, SensorRecord};

/// Sensor backend speaking the O-MI read protocol over HTTP.
#[derive(Debug, Clone)]
pub struct OmiClient {
    client: ClientWithMiddleware,
    base_url: String,
    building: String,
}

impl OmiClient {
    pub fn new(url: &str, building: &str, token: Option<String>) -> anyhow::Result<Self> {
        let client = HttpClientConfig::new(token).new_tracing_client()?;

        Ok(Self {
            client,
            base_url: url.to_owned(),
            building: building.to_owned(),
        })
    }
}

impl SensorGateway for OmiClient {
    #[tracing::instrument(skip(self, rooms))]
    async fn read_rooms(
        &self,
        rooms: &[RoomId],
        time_frame: TimeFrame,
    ) -> anyhow::Result<Vec<SensorReading>> {
        let request = OmiReadRequest::for_rooms(&self.building, rooms, time_frame);

        tracing::debug!("Reading {} rooms from {}", rooms.len(), self.base_url);

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .context("Error sending sensor read request")?;

        let records = response
            .error_for_status()
            .context("Sensor read request was rejected")?
            .json::<Vec<SensorRecord>>()
            .await
            .context("Error decoding sensor response")?;

        protocol::into_readings(records)
    }
}
