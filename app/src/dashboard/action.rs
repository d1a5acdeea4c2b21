use std::sync::Arc;

use crate::core::id::{FloorId, RoomId};
use crate::core::reading::{SensorReading, SensorType, TimeFrame};
use crate::dashboard::state::RequestToken;
use crate::floorplan::{Floorplan, Point, Size};

/// Everything that can happen to the dashboard, user input and internal
/// completions alike. Actions are the only way state changes.
#[derive(Debug, Clone)]
pub enum Action {
    SelectFloor { delta: isize },
    SelectSensor(SensorType),
    SelectTimeFrame(TimeFrame),
    ApplySettings { sensor: SensorType, time_frame: TimeFrame },
    HighlightRoom(RoomId),
    ClearHighlight,
    Search(String),
    OpenPanorama(RoomId),
    ClosePanorama,
    ToggleFullscreen,
    PointerDown { at: Point },
    PointerMove { at: Point },
    PointerUp,
    Wheel { delta: f64, focus: Point },
    ResizeViewport { size: Size },
    ResetPosition,

    // completions fed back by the runner
    FloorplanReady { floor: FloorId, plan: Arc<Floorplan> },
    SensorsBound { token: RequestToken, readings: Vec<SensorReading> },
    BindFailed { token: RequestToken },
}

impl Action {
    /// Short name for logging. The full action may carry a whole plan.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SelectFloor { .. } => "select-floor",
            Action::SelectSensor(_) => "select-sensor",
            Action::SelectTimeFrame(_) => "select-time-frame",
            Action::ApplySettings { .. } => "apply-settings",
            Action::HighlightRoom(_) => "highlight-room",
            Action::ClearHighlight => "clear-highlight",
            Action::Search(_) => "search",
            Action::OpenPanorama(_) => "open-panorama",
            Action::ClosePanorama => "close-panorama",
            Action::ToggleFullscreen => "toggle-fullscreen",
            Action::PointerDown { .. } => "pointer-down",
            Action::PointerMove { .. } => "pointer-move",
            Action::PointerUp => "pointer-up",
            Action::Wheel { .. } => "wheel",
            Action::ResizeViewport { .. } => "resize-viewport",
            Action::ResetPosition => "reset-position",
            Action::FloorplanReady { .. } => "floorplan-ready",
            Action::SensorsBound { .. } => "sensors-bound",
            Action::BindFailed { .. } => "bind-failed",
        }
    }
}

/// Work the runner performs on behalf of an update. Effects are the only
/// I/O the dashboard does.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadFloorplan(FloorId),
    BindSensors {
        token: RequestToken,
        rooms: Vec<RoomId>,
        time_frame: TimeFrame,
    },
    Broadcast(DashboardEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    FloorplanLoaded(FloorId),
    StateChanged,
}
