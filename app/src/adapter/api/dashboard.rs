use std::collections::BTreeMap;

use actix_web::{
    HttpResponse,
    http::header,
    web::{self, Json, Query},
};
use serde::{Deserialize, Serialize};

use crate::core::color::Rgb;
use crate::core::id::{FloorId, RoomId};
use crate::core::reading::{SensorType, TimeFrame};
use crate::core::time::DateTime;
use crate::dashboard::{Action, DashboardClient, DashboardState};
use crate::floorplan::{RoomPaint, Size, point};
use crate::t;
use crate::view::Transform;

use super::{ApiError, ApiResponse, csv_response};

pub fn routes(client: DashboardClient) -> actix_web::Scope {
    web::scope("/dashboard")
        .route("/state", web::get().to(get_state))
        .route("/actions", web::post().to(post_action))
        .route("/floorplan.svg", web::get().to(get_floorplan))
        .route("/rooms.csv", web::get().to(get_rooms_csv))
        .route("/search", web::get().to(search))
        .app_data(web::Data::new(client))
}

async fn get_state(client: web::Data<DashboardClient>) -> ApiResponse {
    let state = client.state().await.map_err(ApiError::EngineError)?;

    Ok(HttpResponse::Ok().json(StateDto::from_state(&state)))
}

async fn post_action(client: web::Data<DashboardClient>, dto: Json<ActionDto>) -> ApiResponse {
    let action = dto.into_inner().into_action()?;

    client.dispatch(action).await.map_err(ApiError::EngineError)?;

    Ok(HttpResponse::NoContent().finish())
}

async fn get_floorplan(client: web::Data<DashboardClient>) -> ApiResponse {
    let state = client.state().await.map_err(ApiError::EngineError)?;
    let plan = state.plan.as_ref().ok_or(ApiError::NoFloorplan)?;

    let paint = RoomPaint {
        fills: state.colors(),
        highlight: state.highlight.clone(),
        camera: Some(state.viewport.transform_at(t!(now))),
    };

    Ok(HttpResponse::Ok()
        .append_header(header::ContentType(mime::IMAGE_SVG))
        .body(plan.render(&paint)))
}

async fn get_rooms_csv(client: web::Data<DashboardClient>) -> ApiResponse {
    let state = client.state().await.map_err(ApiError::EngineError)?;

    csv_response(&csv_rows(&state))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(client: web::Data<DashboardClient>, query: Query<SearchQuery>) -> ApiResponse {
    let state = client.state().await.map_err(ApiError::EngineError)?;

    Ok(HttpResponse::Ok().json(state.matching_rooms(&query.q)))
}

/// View of the dashboard state as the frontend consumes it. The viewport
/// transform is sampled at request time so animations progress between
/// polls.
#[derive(Debug, Serialize)]
struct StateDto {
    floor: FloorId,
    floor_count: usize,
    sensor: SensorType,
    time_frame: TimeFrame,
    loading: bool,
    fullscreen: bool,
    highlight: Option<RoomId>,
    panorama: Option<String>,
    transform: Transform,
    colors: BTreeMap<RoomId, Rgb>,
}

impl StateDto {
    fn from_state(state: &DashboardState) -> Self {
        Self {
            floor: state.floor,
            floor_count: state.floor_count,
            sensor: state.sensor,
            time_frame: state.time_frame,
            loading: state.loading,
            fullscreen: state.fullscreen,
            highlight: state.highlight.clone(),
            panorama: state.panorama_url(),
            transform: state.viewport.transform_at(t!(now)),
            colors: state.colors().into_iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Row {
    room: RoomId,
    sensor: SensorType,
    value: f64,
    timestamp: DateTime,
}

fn csv_rows(state: &DashboardState) -> Vec<Row> {
    let mut rows: Vec<Row> = state
        .readings
        .iter()
        .flat_map(|(room, readings)| {
            readings.iter().filter_map(|reading| {
                reading.latest().map(|dp| Row {
                    room: room.clone(),
                    sensor: reading.sensor,
                    value: dp.value.as_f64(),
                    timestamp: dp.timestamp,
                })
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.room
            .cmp(&b.room)
            .then_with(|| a.sensor.to_string().cmp(&b.sensor.to_string()))
    });
    rows
}

/// Incoming action, one JSON object per dispatch. Sensor and time frame
/// arrive as strings and are validated here, at the boundary.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum ActionDto {
    SelectFloor {
        delta: isize,
    },
    SelectSensor {
        sensor: String,
    },
    SelectTimeFrame {
        #[serde(default)]
        time_frame: String,
    },
    ApplySettings {
        sensor: String,
        #[serde(default)]
        time_frame: String,
    },
    HighlightRoom {
        room: String,
    },
    ClearHighlight,
    Search {
        query: String,
    },
    OpenPanorama {
        room: String,
    },
    ClosePanorama,
    ToggleFullscreen,
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    Wheel {
        delta: f64,
        x: f64,
        y: f64,
    },
    ResizeViewport {
        width: f64,
        height: f64,
    },
    ResetPosition,
}

impl ActionDto {
    fn into_action(self) -> Result<Action, ApiError> {
        let action = match self {
            ActionDto::SelectFloor { delta } => Action::SelectFloor { delta },
            ActionDto::SelectSensor { sensor } => Action::SelectSensor(parse_sensor(&sensor)?),
            ActionDto::SelectTimeFrame { time_frame } => {
                Action::SelectTimeFrame(parse_time_frame(&time_frame)?)
            }
            ActionDto::ApplySettings { sensor, time_frame } => Action::ApplySettings {
                sensor: parse_sensor(&sensor)?,
                time_frame: parse_time_frame(&time_frame)?,
            },
            ActionDto::HighlightRoom { room } => Action::HighlightRoom(RoomId::new(room)),
            ActionDto::ClearHighlight => Action::ClearHighlight,
            ActionDto::Search { query } => Action::Search(query),
            ActionDto::OpenPanorama { room } => Action::OpenPanorama(RoomId::new(room)),
            ActionDto::ClosePanorama => Action::ClosePanorama,
            ActionDto::ToggleFullscreen => Action::ToggleFullscreen,
            ActionDto::PointerDown { x, y } => Action::PointerDown { at: point(x, y) },
            ActionDto::PointerMove { x, y } => Action::PointerMove { at: point(x, y) },
            ActionDto::PointerUp => Action::PointerUp,
            ActionDto::Wheel { delta, x, y } => Action::Wheel {
                delta,
                focus: point(x, y),
            },
            ActionDto::ResizeViewport { width, height } => Action::ResizeViewport {
                size: Size::new(width, height),
            },
            ActionDto::ResetPosition => Action::ResetPosition,
        };

        Ok(action)
    }
}

fn parse_sensor(input: &str) -> Result<SensorType, ApiError> {
    input
        .parse()
        .map_err(|e: crate::core::reading::UnknownSensorType| ApiError::BadRequest(e.to_string()))
}

/// A blank time frame means "Latest", anything else must parse.
fn parse_time_frame(input: &str) -> Result<TimeFrame, ApiError> {
    if input.trim().is_empty() {
        return Ok(TimeFrame::Latest);
    }

    input
        .parse()
        .map_err(|e: crate::core::reading::UnknownTimeFrame| ApiError::BadRequest(e.to_string()))
}
