#![allow(async_fn_in_trait)]

use anyhow::Result;

use crate::core::id::{FloorId, RoomId};
use crate::core::reading::{SensorReading, TimeFrame};

/// Source of the raw SVG markup for a floor's plan.
pub trait FloorplanSource {
    async fn floorplan_svg(&self, floor: FloorId) -> Result<String>;
}

/// Reads sensor values for a set of rooms from the building backend.
///
/// A transport or parse failure fails the whole read. Readings for rooms
/// the backend does not know are simply absent from the result.
pub trait SensorGateway {
    async fn read_rooms(
        &self,
        rooms: &[RoomId],
        time_frame: TimeFrame,
    ) -> Result<Vec<SensorReading>>;
}
