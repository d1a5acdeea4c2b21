use serde::{Deserialize, Serialize};

use crate::core::id::RoomId;
use crate::core::reading::{SensorReading, SensorType, SensorValue, TimeFrame};
use crate::core::time::DateTime;
use crate::core::timeseries::DataPoint;
use crate::t;

/// Read request for every sensor of the given rooms. The request never
/// names sensor types, the backend answers with all of them.
#[derive(Debug, Clone, Serialize)]
pub struct OmiReadRequest {
    #[serde(rename = "Object")]
    object: BuildingNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    newest: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    begin: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct BuildingNode {
    id: KeyValue,
    #[serde(rename = "Object")]
    rooms: Vec<RoomNode>,
}

#[derive(Debug, Clone, Serialize)]
struct RoomNode {
    id: KeyValue,
}

#[derive(Debug, Clone, Serialize)]
struct KeyValue {
    #[serde(rename = "keyValue")]
    key_value: String,
}

impl KeyValue {
    fn new(value: impl Into<String>) -> Self {
        Self {
            key_value: value.into(),
        }
    }
}

impl OmiReadRequest {
    pub fn for_rooms(building: &str, rooms: &[RoomId], time_frame: TimeFrame) -> Self {
        let (newest, begin) = match time_frame.window() {
            None => (Some(1), None),
            Some(window) => (None, Some((t!(now) - window).to_iso_string())),
        };

        Self {
            object: BuildingNode {
                id: KeyValue::new(building),
                rooms: rooms
                    .iter()
                    .map(|room| RoomNode {
                        id: KeyValue::new(room.as_str()),
                    })
                    .collect(),
            },
            newest,
            begin,
        }
    }
}

/// One record of the backend's answer: a sensor of a room with its
/// value history, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRecord {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(rename = "type")]
    pub sensor_type: String,
    #[serde(default)]
    pub values: Vec<RecordValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordValue {
    pub value: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Validates the raw records into typed readings. An unknown sensor type
/// fails the whole read; unusable values only lose their data point.
pub fn into_readings(records: Vec<SensorRecord>) -> anyhow::Result<Vec<SensorReading>> {
    let mut readings = Vec::with_capacity(records.len());

    for record in records {
        let sensor: SensorType = record.sensor_type.parse()?;
        let room = RoomId::new(&record.room_id);

        let mut reading = SensorReading::new(room.clone(), sensor);
        if let Some(name) = record.room {
            reading = reading.with_name(name);
        }

        for entry in record.values {
            let Some(raw) = numeric(&entry.value) else {
                tracing::warn!(
                    "Skipping non-numeric {} value {} of room {}",
                    sensor,
                    entry.value,
                    room
                );
                continue;
            };

            let timestamp = match entry.timestamp.as_deref() {
                Some(iso) => match DateTime::from_iso(iso) {
                    Ok(timestamp) => timestamp,
                    Err(_) => {
                        tracing::warn!(
                            "Skipping {} value of room {} with bad timestamp {}",
                            sensor,
                            room,
                            iso
                        );
                        continue;
                    }
                },
                None => t!(now),
            };

            reading
                .points
                .push(DataPoint::new(SensorValue::new(sensor, raw), timestamp));
        }

        readings.push(reading);
    }

    Ok(readings)
}

fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
