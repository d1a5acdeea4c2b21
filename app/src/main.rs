use settings::Settings;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::adapter::{HttpFloorplanSource, OmiClient};
use crate::core::id::FloorId;
use crate::dashboard::{DashboardEvent, DashboardRunner, DashboardState};

mod adapter;
mod core;
mod dashboard;
mod floorplan;
pub mod port;
mod settings;
mod view;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings.monitoring.init().expect("Error initializing monitoring");

    let floors = &settings.building.floors;
    let initial_floor = floors
        .get(settings.defaults.floor)
        .map(|_| FloorId(settings.defaults.floor))
        .expect("Default floor is not in the configured floor list");

    let plans = HttpFloorplanSource::new(
        &settings.content.base_url,
        &settings.building.id,
        floors.iter().map(|floor| floor.asset.clone()).collect(),
    )
    .expect("Error initializing floorplan source");

    let sensors = OmiClient::new(
        &settings.backend.base_url,
        &settings.building.id,
        settings.backend.bearer_token.clone(),
    )
    .expect("Error initializing sensor backend client");

    let initial = DashboardState::new(
        floors.len(),
        initial_floor,
        settings.defaults.sensor,
        settings.defaults.time_frame,
    );

    let dashboard_runner = DashboardRunner::new(initial, plans, sensors);

    tracing::info!(
        "Serving building {} with floors: {}",
        settings.building.id,
        floors.iter().map(|floor| floor.label.as_str()).collect::<Vec<_>>().join(", ")
    );

    let event_log_exec = {
        let mut events = dashboard_runner.subscribe();

        async move {
            loop {
                match events.recv().await {
                    Ok(DashboardEvent::FloorplanLoaded(floor)) => {
                        tracing::info!("Floorplan for {} is on display", floor)
                    }
                    Ok(DashboardEvent::StateChanged) => {}
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        }
    };

    let http_server_exec = {
        let http_dashboard_client = dashboard_runner.client();

        async move {
            settings
                .http_server
                .run_server(move || vec![adapter::api::routes(http_dashboard_client.clone())])
                .await
                .expect("HTTP server execution failed");
        }
    };

    let cancel = CancellationToken::new();

    tracing::info!("Starting main loop");

    tokio::select!(
        _ = dashboard_runner.run(cancel) => {},
        _ = http_server_exec => {},
        _ = event_log_exec => {},
    );
}
