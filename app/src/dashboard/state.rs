use std::collections::HashMap;
use std::sync::Arc;

use crate::core::color::{self, Rgb};
use crate::core::id::{FloorId, RoomId};
use crate::core::reading::{SensorReading, SensorType, TimeFrame};
use crate::floorplan::{Floorplan, Size};
use crate::view::Viewport;

/// Identifies one round of sensor binding. Only the response carrying the
/// newest token may replace the readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn initial() -> Self {
        Self(0)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Where a room was seen and what the backend calls it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInfo {
    pub floor: FloorId,
    pub name: Option<String>,
}

impl RoomInfo {
    fn matches_name(&self, query: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&query.to_lowercase()))
    }
}

/// The whole dashboard view as one value. Updates produce a new state,
/// never mutate a shared one.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub floor: FloorId,
    pub floor_count: usize,
    pub sensor: SensorType,
    pub time_frame: TimeFrame,
    pub plan: Option<Arc<Floorplan>>,
    pub readings: HashMap<RoomId, Vec<SensorReading>>,
    pub rooms: HashMap<RoomId, RoomInfo>,
    pub viewport: Viewport,
    pub view_size: Option<Size>,
    pub highlight: Option<RoomId>,
    pub pending_highlight: Option<RoomId>,
    pub panorama: Option<RoomId>,
    pub fullscreen: bool,
    pub token: RequestToken,
    pub loading: bool,
}

impl DashboardState {
    pub fn new(floor_count: usize, floor: FloorId, sensor: SensorType, time_frame: TimeFrame) -> Self {
        Self {
            floor,
            floor_count,
            sensor,
            time_frame,
            plan: None,
            readings: HashMap::new(),
            rooms: HashMap::new(),
            viewport: Viewport::default(),
            view_size: None,
            highlight: None,
            pending_highlight: None,
            panorama: None,
            fullscreen: false,
            token: RequestToken::initial(),
            loading: false,
        }
    }

    /// Fill color per room for the currently selected sensor type, from
    /// the newest reading of that type. Rooms without one are absent and
    /// render with the no-data fill.
    pub fn colors(&self) -> HashMap<RoomId, Rgb> {
        self.readings
            .iter()
            .filter_map(|(room, readings)| {
                readings
                    .iter()
                    .filter(|reading| reading.sensor == self.sensor)
                    .filter_map(|reading| reading.latest())
                    .max_by_key(|dp| dp.timestamp)
                    .map(|dp| (room.clone(), color::color_of(&dp.value)))
            })
            .collect()
    }

    /// Rooms whose id or display name contains the query, scanning every
    /// floor seen so far, in id order.
    pub fn matching_rooms(&self, query: &str) -> Vec<RoomId> {
        let query = query.trim();
        if query.is_empty() {
            return vec![];
        }

        let mut matches: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(id, info)| id.matches_query(query) || info.matches_name(query))
            .map(|(id, _)| id.clone())
            .collect();
        matches.sort();
        matches
    }

    /// First room matching the query, if any.
    pub fn find_room(&self, query: &str) -> Option<RoomId> {
        self.matching_rooms(query).into_iter().next()
    }

    pub fn panorama_url(&self) -> Option<String> {
        self.panorama
            .as_ref()
            .map(|room| format!("panorama/Room_{}.xml", room))
    }

    /// Size used for camera math: the reported viewport if the frontend
    /// told us, otherwise the plan's own viewBox.
    pub fn effective_view_size(&self) -> Option<Size> {
        self.view_size
            .or_else(|| self.plan.as_ref().and_then(|plan| plan.view_box()).map(|r| r.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reading::SensorValue;
    use crate::core::time::DateTime;
    use crate::core::timeseries::DataPoint;

    fn reading(room: &str, sensor: SensorType, value: f64, at: &str) -> SensorReading {
        let mut reading = SensorReading::new(RoomId::new(room), sensor);
        reading.points = vec![DataPoint::new(
            SensorValue::new(sensor, value),
            DateTime::from_iso(at).unwrap(),
        )];
        reading
    }

    fn state_with_readings() -> DashboardState {
        let mut state = DashboardState::new(
            3,
            FloorId(1),
            SensorType::Temperature,
            TimeFrame::Latest,
        );
        state.readings.insert(
            RoomId::new("101"),
            vec![
                reading("101", SensorType::Temperature, 25.0, "2016-05-23T10:00:00Z"),
                reading("101", SensorType::Co2, 350.0, "2016-05-23T10:00:00Z"),
            ],
        );
        state.readings.insert(
            RoomId::new("102"),
            vec![reading("102", SensorType::Co2, 5000.0, "2016-05-23T10:00:00Z")],
        );
        state
    }

    #[test]
    fn colors_follow_the_selected_sensor() {
        let mut state = state_with_readings();

        let colors = state.colors();
        assert_eq!(colors.get(&RoomId::new("101")), Some(&Rgb::new(0, 255, 0)));
        assert_eq!(colors.get(&RoomId::new("102")), None);

        state.sensor = SensorType::Co2;
        let colors = state.colors();
        assert_eq!(colors.get(&RoomId::new("101")), Some(&Rgb::new(0, 0, 255)));
        assert_eq!(colors.get(&RoomId::new("102")), Some(&Rgb::new(255, 0, 0)));
    }

    #[test]
    fn colors_use_the_newest_reading_of_the_type() {
        let mut state = state_with_readings();
        state
            .readings
            .get_mut(&RoomId::new("101"))
            .unwrap()
            .push(reading("101", SensorType::Temperature, 35.0, "2016-05-23T12:00:00Z"));

        let colors = state.colors();
        assert_eq!(colors.get(&RoomId::new("101")), Some(&Rgb::new(255, 0, 0)));
    }

    #[test]
    fn rooms_are_found_by_id_or_name() {
        let mut state = state_with_readings();
        state.rooms.insert(
            RoomId::new("238d"),
            RoomInfo {
                floor: FloorId(2),
                name: Some("Sauna".to_owned()),
            },
        );
        state.rooms.insert(
            RoomId::new("101"),
            RoomInfo {
                floor: FloorId(1),
                name: None,
            },
        );

        assert_eq!(state.find_room("238"), Some(RoomId::new("238d")));
        assert_eq!(state.find_room("sauna"), Some(RoomId::new("238d")));
        assert_eq!(state.find_room("10"), Some(RoomId::new("101")));
        assert_eq!(state.find_room("elevator"), None);
        assert_eq!(state.find_room("   "), None);
    }

    #[test]
    fn all_matches_are_listed_in_id_order() {
        let mut state = state_with_readings();
        for (id, name) in [("2145", Some("Sauna")), ("238d", None), ("215a", None)] {
            state.rooms.insert(
                RoomId::new(id),
                RoomInfo {
                    floor: FloorId(2),
                    name: name.map(str::to_owned),
                },
            );
        }

        assert_eq!(
            state.matching_rooms("21"),
            vec![RoomId::new("2145"), RoomId::new("215a")]
        );
        assert_eq!(state.matching_rooms(""), Vec::<RoomId>::new());
    }

    #[test]
    fn panorama_url_is_derived_from_the_room() {
        let mut state = state_with_readings();
        assert_eq!(state.panorama_url(), None);

        state.panorama = Some(RoomId::new("238d"));
        assert_eq!(state.panorama_url().as_deref(), Some("panorama/Room_238d.xml"));
    }

    #[test]
    fn request_tokens_increase() {
        let first = RequestToken::initial();
        let second = first.next();

        assert_ne!(first, second);
        assert_eq!(second.next(), first.next().next());
    }
}
