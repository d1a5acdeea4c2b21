mod action;
mod state;
mod update;

pub use action::{Action, DashboardEvent, Effect};
pub use state::{DashboardState, RequestToken, RoomInfo};
pub use update::update;

use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::floorplan::FloorplanLoader;
use crate::port::{FloorplanSource, SensorGateway};

enum EngineRequest {
    Dispatch(Action),
    Query(oneshot::Sender<DashboardState>),
}

/// Completion of an effect, fed back into the update loop.
type Completion = Pin<Box<dyn Future<Output = Option<Action>>>>;

/// Owns the dashboard state and drives the update loop: actions in over
/// the client channel, effects out through the ports, completions back
/// in as actions.
pub struct DashboardRunner<F, G> {
    state: DashboardState,
    request_tx: mpsc::Sender<EngineRequest>,
    request_rx: mpsc::Receiver<EngineRequest>,
    event_tx: broadcast::Sender<DashboardEvent>,
    loader: FloorplanLoader<F>,
    gateway: G,
}

#[derive(Clone)]
pub struct DashboardClient {
    request_tx: mpsc::Sender<EngineRequest>,
    event_tx: broadcast::Sender<DashboardEvent>,
}

impl<F, G> DashboardRunner<F, G>
where
    F: FloorplanSource + Clone + 'static,
    G: SensorGateway + Clone + 'static,
{
    pub fn new(initial: DashboardState, plans: F, gateway: G) -> Self {
        let (request_tx, request_rx) = mpsc::channel(64);

        Self {
            state: initial,
            request_tx,
            request_rx,
            event_tx: broadcast::channel(128).0,
            loader: FloorplanLoader::new(plans),
            gateway,
        }
    }

    pub fn client(&self) -> DashboardClient {
        DashboardClient {
            request_tx: self.request_tx.clone(),
            event_tx: self.event_tx.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.event_tx.subscribe()
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let mut inflight: FuturesUnordered<Completion> = FuturesUnordered::new();

        // populate the initial floor
        self.apply(Action::SelectFloor { delta: 0 }, &mut inflight);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dashboard engine stopped");
                    break;
                }
                Some(request) = self.request_rx.recv() => match request {
                    EngineRequest::Dispatch(action) => self.apply(action, &mut inflight),
                    EngineRequest::Query(reply) => {
                        let _ = reply.send(self.state.clone());
                    }
                },
                Some(completion) = inflight.next(), if !inflight.is_empty() => {
                    if let Some(action) = completion {
                        self.apply(action, &mut inflight);
                    }
                }
            }
        }
    }

    fn apply(&mut self, action: Action, inflight: &mut FuturesUnordered<Completion>) {
        tracing::debug!("Applying {}", action.kind());

        let (next, effects) = update(self.state.clone(), action);
        self.state = next;

        for effect in effects {
            self.perform(effect, inflight);
        }

        let _ = self.event_tx.send(DashboardEvent::StateChanged);
    }

    fn perform(&self, effect: Effect, inflight: &mut FuturesUnordered<Completion>) {
        match effect {
            Effect::Broadcast(event) => {
                let _ = self.event_tx.send(event);
            }
            Effect::LoadFloorplan(floor) => {
                tracing::info!("Loading floorplan for {}", floor);
                let loader = self.loader.clone();
                inflight.push(Box::pin(async move {
                    match loader.load(floor).await {
                        Ok(plan) => Some(Action::FloorplanReady { floor, plan }),
                        Err(e) => {
                            tracing::warn!("{:?}", e);
                            None
                        }
                    }
                }));
            }
            Effect::BindSensors {
                token,
                rooms,
                time_frame,
            } => {
                tracing::info!("Binding sensors for {} rooms ({})", rooms.len(), time_frame);
                let gateway = self.gateway.clone();
                inflight.push(Box::pin(async move {
                    match gateway.read_rooms(&rooms, time_frame).await {
                        Ok(readings) => Some(Action::SensorsBound { token, readings }),
                        Err(e) => {
                            tracing::warn!("Sensor binding failed: {:?}", e);
                            Some(Action::BindFailed { token })
                        }
                    }
                }));
            }
        }
    }
}

impl DashboardClient {
    pub async fn dispatch(&self, action: Action) -> anyhow::Result<()> {
        self.request_tx
            .send(EngineRequest::Dispatch(action))
            .await
            .map_err(|_| anyhow::anyhow!("Dashboard engine is not running"))
    }

    pub async fn state(&self) -> anyhow::Result<DashboardState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request_tx
            .send(EngineRequest::Query(reply_tx))
            .await
            .map_err(|_| anyhow::anyhow!("Dashboard engine is not running"))?;
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("Dashboard engine dropped the state query"))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::{FloorId, RoomId};
    use crate::core::reading::{SensorReading, SensorType, SensorValue, TimeFrame};
    use crate::core::time::DateTime;
    use crate::core::timeseries::DataPoint;

    const PLAN: &str = r##"<svg viewBox="0 0 400 300">
        <g>
            <rect data-room-id="101" x="10" y="10" width="100" height="50"/>
            <rect data-room-id="102" x="150" y="10" width="80" height="50"/>
        </g>
    </svg>"##;

    #[derive(Clone)]
    struct StaticPlans;

    impl FloorplanSource for StaticPlans {
        async fn floorplan_svg(&self, _: FloorId) -> anyhow::Result<String> {
            Ok(PLAN.to_owned())
        }
    }

    #[derive(Clone)]
    struct StaticReadings;

    impl SensorGateway for StaticReadings {
        async fn read_rooms(
            &self,
            rooms: &[RoomId],
            _: TimeFrame,
        ) -> anyhow::Result<Vec<SensorReading>> {
            Ok(rooms
                .iter()
                .map(|room| {
                    let mut reading = SensorReading::new(room.clone(), SensorType::Temperature);
                    reading.points = vec![DataPoint::new(
                        SensorValue::new(SensorType::Temperature, 22.0),
                        DateTime::from_iso("2016-05-23T10:00:00Z").unwrap(),
                    )];
                    reading
                })
                .collect())
        }
    }

    fn runner() -> DashboardRunner<StaticPlans, StaticReadings> {
        let initial = DashboardState::new(3, FloorId(0), SensorType::Temperature, TimeFrame::Latest);
        DashboardRunner::new(initial, StaticPlans, StaticReadings)
    }

    async fn settled_state(
        client: &DashboardClient,
        events: &mut broadcast::Receiver<DashboardEvent>,
    ) -> DashboardState {
        loop {
            let state = client.state().await.unwrap();
            if !state.loading && state.plan.is_some() {
                return state;
            }
            match events.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("engine went away"),
            }
        }
    }

    #[tokio::test]
    async fn startup_loads_the_plan_and_binds_its_rooms() {
        let runner = runner();
        let client = runner.client();
        let mut events = runner.subscribe();
        let cancel = CancellationToken::new();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let engine = tokio::task::spawn_local(runner.run(cancel.clone()));

                let state = tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    settled_state(&client, &mut events),
                )
                .await
                .unwrap();

                assert_eq!(state.floor, FloorId(0));
                assert!(state.readings.contains_key(&RoomId::new("101")));
                assert!(state.readings.contains_key(&RoomId::new("102")));

                cancel.cancel();
                engine.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn dispatched_actions_change_the_state() {
        let runner = runner();
        let client = runner.client();
        let mut events = runner.subscribe();
        let cancel = CancellationToken::new();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let engine = tokio::task::spawn_local(runner.run(cancel.clone()));

                tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    settled_state(&client, &mut events),
                )
                .await
                .unwrap();

                client.dispatch(Action::SelectSensor(SensorType::Co2)).await.unwrap();

                let state = tokio::time::timeout(std::time::Duration::from_secs(5), async {
                    loop {
                        let state = client.state().await.unwrap();
                        if state.sensor == SensorType::Co2 {
                            return state;
                        }
                        let _ = events.recv().await;
                    }
                })
                .await
                .unwrap();

                assert_eq!(state.sensor, SensorType::Co2);

                cancel.cancel();
                engine.await.unwrap();
            })
            .await;
    }
}
