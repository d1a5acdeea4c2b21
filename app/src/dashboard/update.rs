use std::collections::HashMap;
use std::sync::Arc;

use crate::core::id::{FloorId, RoomId};
use crate::core::reading::{SensorReading, TimeFrame};
use crate::core::time::DateTime;
use crate::dashboard::action::{Action, DashboardEvent, Effect};
use crate::dashboard::state::{DashboardState, RequestToken, RoomInfo};
use crate::floorplan::Floorplan;
use crate::t;
use crate::view::Viewport;

/// The only place dashboard state changes. Takes the current state and
/// one action, returns the next state and the work it requires.
pub fn update(state: DashboardState, action: Action) -> (DashboardState, Vec<Effect>) {
    let now = t!(now);
    let mut state = state;
    state.viewport = state.viewport.settled(now);

    match action {
        Action::SelectFloor { delta } => select_floor(state, delta),
        Action::SelectSensor(sensor) => {
            // readings hold every type, so a type change is recolor only
            state.sensor = sensor;
            (state, vec![])
        }
        Action::SelectTimeFrame(time_frame) => select_time_frame(state, time_frame),
        Action::ApplySettings { sensor, time_frame } => {
            if time_frame != state.time_frame {
                state.sensor = sensor;
                select_time_frame(state, time_frame)
            } else {
                state.sensor = sensor;
                (state, vec![])
            }
        }
        Action::HighlightRoom(room) => highlight_room(state, room, now),
        Action::ClearHighlight => {
            state.highlight = None;
            state.pending_highlight = None;
            (state, vec![])
        }
        Action::Search(query) => match state.find_room(&query) {
            Some(room) => highlight_room(state, room, now),
            None => (state, vec![]),
        },
        Action::OpenPanorama(room) => {
            state.panorama = Some(room);
            (state, vec![])
        }
        Action::ClosePanorama => {
            state.panorama = None;
            (state, vec![])
        }
        Action::ToggleFullscreen => {
            state.fullscreen = !state.fullscreen;
            (state, vec![])
        }
        Action::PointerDown { at } => {
            state.viewport = state.viewport.pointer_down(now, at);
            (state, vec![])
        }
        Action::PointerMove { at } => {
            state.viewport = state.viewport.pointer_move(at);
            (state, vec![])
        }
        Action::PointerUp => {
            state.viewport = state.viewport.pointer_up();
            (state, vec![])
        }
        Action::Wheel { delta, focus } => {
            state.viewport = state.viewport.wheel(now, delta, focus);
            (state, vec![])
        }
        Action::ResizeViewport { size } => {
            state.view_size = Some(size);
            (state, vec![])
        }
        Action::ResetPosition => {
            state.viewport = state.viewport.reset(now);
            (state, vec![])
        }
        Action::FloorplanReady { floor, plan } => floorplan_ready(state, floor, plan, now),
        Action::SensorsBound { token, readings } => sensors_bound(state, token, readings),
        Action::BindFailed { token } => {
            // the failed cycle leaves every room without data; a stale
            // failure must not blank a newer cycle
            if token == state.token {
                state.loading = false;
                state.readings.clear();
            }
            (state, vec![])
        }
    }
}

fn select_floor(mut state: DashboardState, delta: isize) -> (DashboardState, Vec<Effect>) {
    let Some(target) = state.floor.offset_within(delta, state.floor_count) else {
        return (state, vec![]);
    };

    state.floor = target;
    state.highlight = None;
    state.pending_highlight = None;
    state.loading = true;
    (state, vec![Effect::LoadFloorplan(target)])
}

fn select_time_frame(mut state: DashboardState, time_frame: TimeFrame) -> (DashboardState, Vec<Effect>) {
    if time_frame == state.time_frame {
        return (state, vec![]);
    }

    state.time_frame = time_frame;
    let effects = bind_effects(&mut state);
    (state, effects)
}

/// Mints a fresh token and requests a sensor read for the rooms of the
/// current plan. Without a plan (or rooms) there is nothing to bind.
fn bind_effects(state: &mut DashboardState) -> Vec<Effect> {
    let rooms = match &state.plan {
        Some(plan) => plan.room_ids(),
        None => return vec![],
    };
    if rooms.is_empty() {
        return vec![];
    }

    state.token = state.token.next();
    state.loading = true;
    vec![Effect::BindSensors {
        token: state.token,
        rooms,
        time_frame: state.time_frame,
    }]
}

fn highlight_room(mut state: DashboardState, room: RoomId, now: DateTime) -> (DashboardState, Vec<Effect>) {
    match state.rooms.get(&room).map(|info| info.floor) {
        Some(floor) if floor == state.floor => {
            state.pending_highlight = None;
            state.highlight = Some(room.clone());
            state.viewport = centered(&state, &room, now);
            (state, vec![])
        }
        Some(floor) => {
            // the room lives on another floor: switch and highlight once
            // its plan has arrived
            state.floor = floor;
            state.highlight = None;
            state.pending_highlight = Some(room);
            state.loading = true;
            (state, vec![Effect::LoadFloorplan(floor)])
        }
        None => {
            state.highlight = None;
            state.pending_highlight = None;
            (state, vec![])
        }
    }
}

fn centered(state: &DashboardState, room: &RoomId, now: DateTime) -> Viewport {
    let center = state
        .plan
        .as_ref()
        .and_then(|plan| plan.room_bounds(room))
        .map(|bounds| bounds.center());

    match (center, state.effective_view_size()) {
        (Some(center), Some(size)) => state.viewport.center_on(now, center, size),
        _ => state.viewport,
    }
}

fn floorplan_ready(
    mut state: DashboardState,
    floor: FloorId,
    plan: Arc<Floorplan>,
    now: DateTime,
) -> (DashboardState, Vec<Effect>) {
    if floor != state.floor {
        // the user has moved on while this plan was loading
        return (state, vec![]);
    }

    for room in plan.room_ids() {
        state
            .rooms
            .entry(room)
            .and_modify(|info| info.floor = floor)
            .or_insert(RoomInfo { floor, name: None });
    }

    state.plan = Some(plan);
    state.viewport = Viewport::default();
    state.loading = false;

    let mut effects = bind_effects(&mut state);
    effects.push(Effect::Broadcast(DashboardEvent::FloorplanLoaded(floor)));

    if let Some(room) = state.pending_highlight.take() {
        if state.plan.as_ref().is_some_and(|plan| plan.contains_room(&room)) {
            state.highlight = Some(room.clone());
            state.viewport = centered(&state, &room, now);
        }
    }

    (state, effects)
}

fn sensors_bound(
    mut state: DashboardState,
    token: RequestToken,
    readings: Vec<SensorReading>,
) -> (DashboardState, Vec<Effect>) {
    if token != state.token {
        return (state, vec![]);
    }

    state.loading = false;

    let mut by_room: HashMap<RoomId, Vec<SensorReading>> = HashMap::new();
    for reading in readings {
        if let Some(name) = &reading.room_name {
            state
                .rooms
                .entry(reading.room.clone())
                .and_modify(|info| info.name = Some(name.clone()))
                .or_insert(RoomInfo {
                    floor: state.floor,
                    name: Some(name.clone()),
                });
        }
        by_room.entry(reading.room.clone()).or_default().push(reading);
    }
    state.readings = by_room;

    (state, vec![])
}
