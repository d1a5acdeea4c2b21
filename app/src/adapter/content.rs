use anyhow::Context;
use infrastructure::HttpClientConfig;
use reqwest_middleware::ClientWithMiddleware;

use crate::core::id::FloorId;
use crate::port::FloorplanSource;

/// Fetches floorplan SVGs from the static content server. Floors map to
/// asset file names via the configured floor list.
#[derive(Debug, Clone)]
pub struct HttpFloorplanSource {
    client: ClientWithMiddleware,
    base_url: String,
    building: String,
    assets: Vec<String>,
}

impl HttpFloorplanSource {
    pub fn new(url: &str, building: &str, assets: Vec<String>) -> anyhow::Result<Self> {
        let client = HttpClientConfig::new(None).new_tracing_client()?;

        Ok(Self {
            client,
            base_url: url.to_owned(),
            building: building.to_owned(),
            assets,
        })
    }

    fn asset_url(&self, floor: FloorId) -> anyhow::Result<String> {
        let asset = self
            .assets
            .get(floor.index())
            .with_context(|| format!("No floorplan asset configured for {}", floor))?;

        Ok(format!(
            "{}/assets/buildings/{}/{}",
            self.base_url, self.building, asset
        ))
    }
}

impl FloorplanSource for HttpFloorplanSource {
    #[tracing::instrument(skip(self))]
    async fn floorplan_svg(&self, floor: FloorId) -> anyhow::Result<String> {
        let url = self.asset_url(floor)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Error fetching floorplan from {}", url))?;

        response
            .error_for_status()
            .with_context(|| format!("Floorplan request to {} was rejected", url))?
            .text()
            .await
            .context("Error reading floorplan body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_urls_follow_the_content_layout() {
        let source = HttpFloorplanSource::new(
            "http://content.example",
            "K1",
            vec!["floor-1.svg".to_owned(), "floor-2.svg".to_owned()],
        )
        .unwrap();

        assert_eq!(
            source.asset_url(FloorId(1)).unwrap(),
            "http://content.example/assets/buildings/K1/floor-2.svg"
        );
    }

    #[test]
    fn an_unconfigured_floor_is_an_error() {
        let source = HttpFloorplanSource::new("http://content.example", "K1", vec![]).unwrap();

        assert!(source.asset_url(FloorId(0)).is_err());
    }
}
