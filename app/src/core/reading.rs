use std::fmt::Display;
use std::str::FromStr;

use derive_more::derive::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::core::id::RoomId;
use crate::core::time::Duration;
use crate::core::timeseries::DataPoint;
use crate::core::unit::{DegreeCelsius, Lux, Percent, PersonCount, Ppm};

/// Sensor kinds the dashboard can display. The wire name is the lowercase
/// variant name, matching the `type` field of the sensor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Co2,
    Light,
    Occupancy,
    Humidity,
    Pir,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unknown sensor type '{input}'")]
pub struct UnknownSensorType {
    pub input: String,
}

impl Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SensorType::Temperature => "temperature",
            SensorType::Co2 => "co2",
            SensorType::Light => "light",
            SensorType::Occupancy => "occupancy",
            SensorType::Humidity => "humidity",
            SensorType::Pir => "pir",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SensorType {
    type Err = UnknownSensorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" => Ok(SensorType::Temperature),
            "co2" => Ok(SensorType::Co2),
            "light" => Ok(SensorType::Light),
            "occupancy" => Ok(SensorType::Occupancy),
            "humidity" => Ok(SensorType::Humidity),
            "pir" => Ok(SensorType::Pir),
            _ => Err(UnknownSensorType { input: s.to_owned() }),
        }
    }
}

/// Time window of sensor history shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Latest,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unknown time frame '{input}'")]
pub struct UnknownTimeFrame {
    pub input: String,
}

impl TimeFrame {
    /// History window to request, or `None` for only the newest value.
    pub fn window(&self) -> Option<Duration> {
        match self {
            TimeFrame::Latest => None,
            TimeFrame::Day => Some(Duration::days(1)),
            TimeFrame::Week => Some(Duration::days(7)),
            TimeFrame::Month => Some(Duration::days(30)),
            TimeFrame::Year => Some(Duration::days(365)),
        }
    }
}

impl Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimeFrame::Latest => "latest",
            TimeFrame::Day => "day",
            TimeFrame::Week => "week",
            TimeFrame::Month => "month",
            TimeFrame::Year => "year",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TimeFrame {
    type Err = UnknownTimeFrame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(TimeFrame::Latest),
            "day" => Ok(TimeFrame::Day),
            "week" => Ok(TimeFrame::Week),
            "month" => Ok(TimeFrame::Month),
            "year" => Ok(TimeFrame::Year),
            _ => Err(UnknownTimeFrame { input: s.to_owned() }),
        }
    }
}

/// A measured value carrying its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SensorValue {
    Temperature(DegreeCelsius),
    Co2(Ppm),
    Light(Lux),
    Occupancy(PersonCount),
    Humidity(Percent),
    Pir(bool),
}

impl SensorValue {
    pub fn new(sensor: SensorType, raw: f64) -> Self {
        match sensor {
            SensorType::Temperature => SensorValue::Temperature(raw.into()),
            SensorType::Co2 => SensorValue::Co2(raw.into()),
            SensorType::Light => SensorValue::Light(raw.into()),
            SensorType::Occupancy => SensorValue::Occupancy(raw.into()),
            SensorType::Humidity => SensorValue::Humidity(raw.into()),
            SensorType::Pir => SensorValue::Pir(raw > 0.5),
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        match self {
            SensorValue::Temperature(_) => SensorType::Temperature,
            SensorValue::Co2(_) => SensorType::Co2,
            SensorValue::Light(_) => SensorType::Light,
            SensorValue::Occupancy(_) => SensorType::Occupancy,
            SensorValue::Humidity(_) => SensorType::Humidity,
            SensorValue::Pir(_) => SensorType::Pir,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            SensorValue::Temperature(v) => v.into(),
            SensorValue::Co2(v) => v.into(),
            SensorValue::Light(v) => v.into(),
            SensorValue::Occupancy(v) => v.into(),
            SensorValue::Humidity(v) => v.into(),
            SensorValue::Pir(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl Display for SensorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorValue::Temperature(v) => write!(f, "{}", v),
            SensorValue::Co2(v) => write!(f, "{}", v),
            SensorValue::Light(v) => write!(f, "{}", v),
            SensorValue::Occupancy(v) => write!(f, "{}", v),
            SensorValue::Humidity(v) => write!(f, "{}", v),
            SensorValue::Pir(v) => write!(f, "{}", if *v { "motion" } else { "clear" }),
        }
    }
}

/// History of one sensor in one room, as bound from the backend. The
/// backend may also carry a human-readable room name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub room: RoomId,
    pub room_name: Option<String>,
    pub sensor: SensorType,
    pub points: Vec<DataPoint<SensorValue>>,
}

impl SensorReading {
    pub fn new(room: RoomId, sensor: SensorType) -> Self {
        Self {
            room,
            room_name: None,
            sensor,
            points: vec![],
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.room_name = Some(name.into());
        self
    }

    pub fn latest(&self) -> Option<&DataPoint<SensorValue>> {
        self.points.iter().max_by_key(|dp| dp.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::DateTime;

    #[test]
    fn sensor_type_roundtrip() {
        for name in ["temperature", "co2", "light", "occupancy", "humidity", "pir"] {
            let parsed: SensorType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
    }

    #[test]
    fn sensor_type_unknown_is_an_error() {
        let err = "noise".parse::<SensorType>().unwrap_err();
        assert_eq!(err.input, "noise");
    }

    #[test]
    fn sensor_type_parse_ignores_case_and_whitespace() {
        assert_eq!(" Temperature ".parse::<SensorType>().unwrap(), SensorType::Temperature);
        assert_eq!("CO2".parse::<SensorType>().unwrap(), SensorType::Co2);
    }

    #[test]
    fn time_frame_windows() {
        assert_eq!(TimeFrame::Latest.window(), None);
        assert_eq!(TimeFrame::Day.window(), Some(Duration::days(1)));
        assert_eq!(TimeFrame::Week.window(), Some(Duration::days(7)));
        assert_eq!(TimeFrame::Year.window(), Some(Duration::days(365)));
    }

    #[test]
    fn time_frame_unknown_is_an_error() {
        assert!("fortnight".parse::<TimeFrame>().is_err());
    }

    #[test]
    fn sensor_value_keeps_its_type() {
        let value = SensorValue::new(SensorType::Co2, 415.0);

        assert_eq!(value.sensor_type(), SensorType::Co2);
        assert_eq!(value.as_f64(), 415.0);
    }

    #[test]
    fn pir_value_is_thresholded() {
        assert_eq!(SensorValue::new(SensorType::Pir, 1.0), SensorValue::Pir(true));
        assert_eq!(SensorValue::new(SensorType::Pir, 0.0), SensorValue::Pir(false));
        assert_eq!(SensorValue::new(SensorType::Pir, 1.0).as_f64(), 1.0);
    }

    #[test]
    fn latest_picks_newest_point() {
        let mut reading = SensorReading::new(RoomId::new("215a"), SensorType::Temperature);
        reading.points = vec![
            DataPoint::new(
                SensorValue::new(SensorType::Temperature, 21.0),
                DateTime::from_iso("2016-05-23T10:00:00Z").unwrap(),
            ),
            DataPoint::new(
                SensorValue::new(SensorType::Temperature, 23.5),
                DateTime::from_iso("2016-05-23T12:00:00Z").unwrap(),
            ),
            DataPoint::new(
                SensorValue::new(SensorType::Temperature, 22.0),
                DateTime::from_iso("2016-05-23T11:00:00Z").unwrap(),
            ),
        ];

        let latest = reading.latest().unwrap();
        assert_eq!(latest.value.as_f64(), 23.5);
    }

    #[test]
    fn latest_of_empty_reading_is_none() {
        let reading = SensorReading::new(RoomId::new("215a"), SensorType::Humidity);
        assert!(reading.latest().is_none());
    }
}
