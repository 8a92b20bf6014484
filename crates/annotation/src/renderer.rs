use model::{LineStyle, Point, Rating, RenderedRoute, RoadRef, RouteColor};
use overpass::RoadLookup;

use crate::surface::{LayerId, MapSurface};

#[derive(Debug)]
struct CurrentRoute {
    layer: LayerId,
    route: RenderedRoute,
}

/// Draws markers and the line of the latest segment. Only one route is shown
/// at a time; its layer is released before anything replaces it.
#[derive(Debug, Default)]
pub struct RouteRenderer {
    markers: Vec<LayerId>,
    current: Option<CurrentRoute>,
    road_layers: Vec<LayerId>,
}

impl RouteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_marker(&mut self, surface: &mut dyn MapSurface, point: &Point) -> LayerId {
        let layer = surface.add_marker(point.coordinate());
        self.markers.push(layer);
        layer
    }

    /// Draws the segment `a`-`b`. The straight line is on the surface before
    /// the road lookup starts and is swapped for the road aligned path if
    /// the lookup yields one.
    pub async fn draw_segment(
        &mut self,
        surface: &mut dyn MapSurface,
        lookup: &dyn RoadLookup,
        a: &Point,
        b: &Point,
        color: RouteColor,
    ) -> RenderedRoute {
        let mut route = RenderedRoute::straight(*a.coordinate(), *b.coordinate(), color);
        self.show(surface, route.clone());

        if a.road().is_some() && b.road().is_some() {
            let geometry = lookup.resolve_between(a, b).await;
            if !geometry.is_empty() {
                route = RenderedRoute {
                    geometry,
                    color,
                    road_aligned: true,
                };
                self.show(surface, route.clone());
            }
        }

        route
    }

    /// Redraws the current route in the color for `rating`. Returns `false`
    /// if there is nothing to recolor.
    pub fn recolor(&mut self, surface: &mut dyn MapSurface, rating: Rating) -> bool {
        let Some(current) = self.current.as_ref() else {
            log::warn!("No route to recolor with rating {}.", rating.value());
            return false;
        };
        let route = RenderedRoute {
            color: RouteColor::for_rating(rating),
            ..current.route.clone()
        };
        self.show(surface, route);
        true
    }

    /// Replaces the road overlay with `roads`.
    pub fn show_roads(&mut self, surface: &mut dyn MapSurface, roads: &[RoadRef]) {
        for layer in self.road_layers.drain(..) {
            surface.remove_layer(layer);
        }
        let style = LineStyle::road_overlay();
        self.road_layers = roads
            .iter()
            .map(|road| surface.add_polyline(&road.geometry, &style))
            .collect();
    }

    pub fn current(&self) -> Option<&RenderedRoute> {
        self.current.as_ref().map(|current| &current.route)
    }

    pub fn markers(&self) -> &[LayerId] {
        &self.markers
    }

    pub fn road_layers(&self) -> &[LayerId] {
        &self.road_layers
    }

    /// Removes the current route from the surface, if any.
    pub fn release(&mut self, surface: &mut dyn MapSurface) {
        if let Some(previous) = self.current.take() {
            surface.remove_layer(previous.layer);
        }
    }

    fn show(&mut self, surface: &mut dyn MapSurface, route: RenderedRoute) {
        self.release(surface);
        let layer = surface.add_polyline(&route.geometry, &route.style());
        self.current = Some(CurrentRoute { layer, route });
    }
}
