use async_trait::async_trait;
use model::{geometry, Bounds, Coordinate, Point, RoadRef};

use crate::{client::OverpassClient, query::Query, ApiError};

/// Road geometry lookups. Implementations never fail: problems are logged and
/// reported as "no road" or empty geometry.
#[async_trait]
pub trait RoadLookup: Send + Sync {
    /// The road closest to `at` within `radius_m` meters.
    async fn resolve_near(&self, at: &Coordinate, radius_m: f64) -> Option<RoadRef>;

    /// Road aligned path between two points that both carry a road.
    async fn resolve_between(&self, from: &Point, to: &Point) -> Vec<Coordinate>;

    /// All roads in the visible area.
    async fn roads_within(&self, bounds: &Bounds) -> Vec<RoadRef>;
}

/// Picks the road with the smallest distance to `at`. On ties the road the
/// service listed first wins.
pub fn nearest_road(roads: Vec<RoadRef>, at: &Coordinate) -> Option<RoadRef> {
    roads
        .into_iter()
        .filter_map(|road| road.distance_m(at).map(|distance| (distance, road)))
        .fold(None, |best: Option<(f64, RoadRef)>, (distance, road)| match best {
            Some((best_distance, _)) if best_distance <= distance => best,
            _ => Some((distance, road)),
        })
        .map(|(_, road)| road)
}

impl OverpassClient {
    async fn roads(&self, query: Result<Query, ApiError>) -> Result<Vec<RoadRef>, ApiError> {
        Ok(self.get(&query?).await?.into_roads())
    }
}

#[async_trait]
impl RoadLookup for OverpassClient {
    async fn resolve_near(&self, at: &Coordinate, radius_m: f64) -> Option<RoadRef> {
        match self.roads(Query::highways_around(at, radius_m)).await {
            Ok(roads) => {
                let road = nearest_road(roads, at);
                if road.is_none() {
                    log::info!("No road within {}m of {}.", radius_m, at);
                }
                road
            }
            Err(why) => {
                log::error!("Could not look up roads near {}: {}", at, why);
                None
            }
        }
    }

    async fn resolve_between(&self, from: &Point, to: &Point) -> Vec<Coordinate> {
        let (Some(from_road), Some(to_road)) = (from.road(), to.road()) else {
            return vec![];
        };

        let mut ids = vec![from_road.id, to_road.id];
        ids.dedup();
        let roads = match self.roads(Query::ways_by_id(&ids)).await {
            Ok(roads) => roads,
            Err(why) => {
                log::error!(
                    "Could not fetch roads {} and {}: {}",
                    from_road.id,
                    to_road.id,
                    why
                );
                return vec![];
            }
        };

        let find = |reference: &RoadRef| roads.iter().find(|road| road.id == reference.id);
        match (find(from_road), find(to_road)) {
            (Some(first), Some(second)) => {
                let path =
                    geometry::road_path(from.coordinate(), first, to.coordinate(), second);
                if path.is_empty() {
                    log::info!(
                        "Roads {} and {} do not meet, keeping the straight line.",
                        first.id,
                        second.id
                    );
                }
                path
            }
            _ => {
                log::warn!(
                    "Road data service did not return roads {} and {}.",
                    from_road.id,
                    to_road.id
                );
                vec![]
            }
        }
    }

    async fn roads_within(&self, bounds: &Bounds) -> Vec<RoadRef> {
        self.roads(Query::highways_in(bounds))
            .await
            .unwrap_or_else(|why| {
                log::error!("Could not load roads for {:?}: {}", bounds, why);
                vec![]
            })
    }
}
