use std::fmt::Display;

use crate::core::reading::{SensorType, SensorValue};

/// Fill used for rooms that have no reading to show.
pub const NO_DATA_FILL: Rgb = Rgb { r: 255, g: 255, b: 255 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl serde::Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Expected value span of a sensor type. Readings outside the span clamp
/// to the endpoint colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn of(sensor: SensorType) -> Self {
        let (min, max) = match sensor {
            SensorType::Temperature => (15.0, 35.0),
            SensorType::Co2 => (350.0, 5000.0),
            SensorType::Light => (30.0, 10000.0),
            SensorType::Occupancy => (0.0, 30.0),
            SensorType::Humidity => (30.0, 70.0),
            SensorType::Pir => (0.0, 1.0),
        };
        Self { min, max }
    }

    fn normalized(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Position of a reading on the color ramp. High readings map to the low
/// (red) end of the ramp, low readings to the high (blue) end.
pub fn percentage(sensor: SensorType, value: f64) -> f64 {
    1.0 - ValueRange::of(sensor).normalized(value)
}

const RAMP_ANCHORS: [(f64, u8, u8, u8); 5] = [
    (0.0, 255, 0, 0),
    (0.25, 255, 255, 0),
    (0.5, 0, 255, 0),
    (0.75, 0, 255, 255),
    (1.0, 0, 0, 255),
];

/// Piecewise-linear hue ramp over red, yellow, green, cyan and blue.
pub fn ramp(percentage: f64) -> Rgb {
    let p = percentage.clamp(0.0, 1.0);

    for window in RAMP_ANCHORS.windows(2) {
        let (p1, r1, g1, b1) = window[0];
        let (p2, r2, g2, b2) = window[1];

        if p >= p1 && p <= p2 {
            let ratio = (p - p1) / (p2 - p1);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * ratio).round() as u8;
            return Rgb::new(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2));
        }
    }

    // p is clamped, so the scan always hits a segment
    let (_, r, g, b) = RAMP_ANCHORS[RAMP_ANCHORS.len() - 1];
    Rgb::new(r, g, b)
}

pub fn color_for(sensor: SensorType, value: f64) -> Rgb {
    ramp(percentage(sensor, value))
}

pub fn color_of(value: &SensorValue) -> Rgb {
    color_for(value.sensor_type(), value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_room_is_blue() {
        assert_eq!(color_for(SensorType::Temperature, 15.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn hot_room_is_red() {
        assert_eq!(color_for(SensorType::Temperature, 35.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn mid_range_room_is_green() {
        assert_eq!(color_for(SensorType::Temperature, 25.0), Rgb::new(0, 255, 0));
    }

    #[test]
    fn readings_outside_the_range_clamp() {
        assert_eq!(color_for(SensorType::Temperature, -40.0), Rgb::new(0, 0, 255));
        assert_eq!(color_for(SensorType::Temperature, 120.0), Rgb::new(255, 0, 0));
        assert_eq!(color_for(SensorType::Co2, 10_000.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn ramp_hits_every_anchor() {
        assert_eq!(ramp(0.0), Rgb::new(255, 0, 0));
        assert_eq!(ramp(0.25), Rgb::new(255, 255, 0));
        assert_eq!(ramp(0.5), Rgb::new(0, 255, 0));
        assert_eq!(ramp(0.75), Rgb::new(0, 255, 255));
        assert_eq!(ramp(1.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn ramp_interpolates_within_a_band() {
        // halfway between red and yellow only green moves
        assert_eq!(ramp(0.125), Rgb::new(255, 128, 0));
        // halfway between green and cyan only blue moves
        assert_eq!(ramp(0.625), Rgb::new(0, 255, 128));
    }

    #[test]
    fn percentage_is_inverted_normalization() {
        assert_eq!(percentage(SensorType::Temperature, 15.0), 1.0);
        assert_eq!(percentage(SensorType::Temperature, 35.0), 0.0);
        assert_eq!(percentage(SensorType::Temperature, 25.0), 0.5);
        assert_eq!(percentage(SensorType::Humidity, 50.0), 0.5);
    }

    #[test]
    fn typed_value_maps_through_its_own_range() {
        let co2 = SensorValue::new(SensorType::Co2, 350.0);
        assert_eq!(color_of(&co2), Rgb::new(0, 0, 255));

        let motion = SensorValue::new(SensorType::Pir, 1.0);
        assert_eq!(color_of(&motion), Rgb::new(255, 0, 0));
    }

    #[test]
    fn rgb_formats_as_hex() {
        assert_eq!(Rgb::new(255, 204, 0).to_string(), "#ffcc00");
        assert_eq!(NO_DATA_FILL.to_string(), "#ffffff");
    }
}
