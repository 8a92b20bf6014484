//! In-memory road data for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use model::{geometry, Bounds, Coordinate, Point, RoadRef};
use overpass::{lookup::nearest_road, RoadLookup};

#[derive(Debug, Default)]
pub struct FakeLookup {
    roads: Vec<RoadRef>,
    delay: Option<Duration>,
    near_calls: AtomicUsize,
    between_calls: AtomicUsize,
}

impl FakeLookup {
    pub fn with_roads(roads: Vec<RoadRef>) -> Self {
        Self {
            roads,
            ..Default::default()
        }
    }

    /// Every nearest-road lookup takes `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn near_calls(&self) -> usize {
        self.near_calls.load(Ordering::SeqCst)
    }

    pub fn between_calls(&self) -> usize {
        self.between_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoadLookup for FakeLookup {
    async fn resolve_near(&self, at: &Coordinate, radius_m: f64) -> Option<RoadRef> {
        self.near_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let in_range = self
            .roads
            .iter()
            .filter(|road| road.distance_m(at).is_some_and(|d| d <= radius_m))
            .cloned()
            .collect();
        nearest_road(in_range, at)
    }

    async fn resolve_between(&self, from: &Point, to: &Point) -> Vec<Coordinate> {
        self.between_calls.fetch_add(1, Ordering::SeqCst);
        match (from.road(), to.road()) {
            (Some(a), Some(b)) => geometry::road_path(from.coordinate(), a, to.coordinate(), b),
            _ => vec![],
        }
    }

    async fn roads_within(&self, bounds: &Bounds) -> Vec<RoadRef> {
        self.roads
            .iter()
            .filter(|road| road.geometry.iter().any(|vertex| bounds.contains(vertex)))
            .cloned()
            .collect()
    }
}
