mod document;
mod geometry;
mod render;

use std::collections::HashMap;
use std::sync::Arc;

use moka::future::Cache;

use document::SvgDocument;

use crate::core::id::{FloorId, RoomId};
use crate::port::FloorplanSource;

pub use geometry::{Point, Rect, Size, point};
pub use render::RoomPaint;

/// A parsed and display-normalized plan of one floor, with the bounding
/// boxes of its annotated rooms precomputed.
#[derive(Debug, Clone)]
pub struct Floorplan {
    pub floor: FloorId,
    document: SvgDocument,
    rooms: HashMap<RoomId, Option<Rect>>,
}

impl Floorplan {
    pub fn from_svg(floor: FloorId, svg: &str) -> anyhow::Result<Self> {
        let mut document =
            SvgDocument::parse(svg).map_err(|e| anyhow::anyhow!("Invalid SVG for {}: {}", floor, e))?;
        document.normalize_for_display();
        let rooms = document.room_bounds();

        Ok(Self {
            floor,
            document,
            rooms,
        })
    }

    /// Annotated room ids on this floor, in stable order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains_room(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    /// Local-coordinate bounding box of a room's geometry, if the shape
    /// could be measured.
    pub fn room_bounds(&self, room: &RoomId) -> Option<Rect> {
        self.rooms.get(room).copied().flatten()
    }

    pub fn view_box(&self) -> Option<Rect> {
        self.document.view_box()
    }

    pub fn render(&self, paint: &RoomPaint) -> String {
        render::render(&self.document, paint)
    }
}

/// Loads floorplans on demand and keeps them around. Concurrent loads of
/// the same floor are coalesced, failures are not remembered.
#[derive(Clone)]
pub struct FloorplanLoader<S> {
    source: S,
    cache: Cache<FloorId, Arc<Floorplan>>,
}

impl<S: FloorplanSource> FloorplanLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: Cache::builder()
                .time_to_live(std::time::Duration::from_secs(60 * 60))
                .build(),
        }
    }

    pub async fn load(&self, floor: FloorId) -> anyhow::Result<Arc<Floorplan>> {
        self.cache
            .try_get_with(floor, async {
                tracing::debug!("No cached plan for {}, fetching", floor);
                let svg = self.source.floorplan_svg(floor).await?;
                Floorplan::from_svg(floor, &svg).map(Arc::new)
            })
            .await
            .map_err(|e| anyhow::anyhow!("Loading floorplan for {} failed: {}", floor, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const PLAN: &str = r##"<svg viewBox="0 0 400 300">
        <g>
            <rect data-room-id="101" x="10" y="10" width="100" height="50"/>
            <rect data-room-id="102" x="150" y="10" width="80" height="50"/>
        </g>
    </svg>"##;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl FloorplanSource for &CountingSource {
        async fn floorplan_svg(&self, _: FloorId) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("asset missing");
            }
            Ok(PLAN.to_owned())
        }
    }

    #[test]
    fn plan_exposes_its_rooms() {
        let plan = Floorplan::from_svg(FloorId(1), PLAN).unwrap();

        assert_eq!(plan.room_ids(), vec![RoomId::new("101"), RoomId::new("102")]);
        assert!(plan.contains_room(&RoomId::new("101")));
        assert!(!plan.contains_room(&RoomId::new("999")));

        let bounds = plan.room_bounds(&RoomId::new("101")).unwrap();
        assert_eq!(bounds.origin, point(10.0, 10.0));
    }

    #[tokio::test]
    async fn loader_fetches_each_floor_once() {
        let source = CountingSource::new(false);
        let loader = FloorplanLoader::new(&source);

        let first = loader.load(FloorId(0)).await.unwrap();
        let second = loader.load(FloorId(0)).await.unwrap();
        loader.load(FloorId(1)).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.floor, second.floor);
    }

    #[tokio::test]
    async fn loader_retries_after_a_failure() {
        let source = CountingSource::new(true);
        let loader = FloorplanLoader::new(&source);

        assert!(loader.load(FloorId(0)).await.is_err());
        assert!(loader.load(FloorId(0)).await.is_err());

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
