use model::{Bounds, Coordinate, RoadId};

use crate::ApiError;

/// Every way tagged `highway`, which includes footpaths and service roads.
const HIGHWAY_FILTER: &str = "[\"highway\"]";

/// An Overpass QL statement asking for ways including their geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
}

impl Query {
    fn ways(selector: String) -> Self {
        Self {
            text: format!("[out:json];\n{selector};\nout geom;"),
        }
    }

    /// Highways within `radius_m` meters of `center`.
    pub fn highways_around(center: &Coordinate, radius_m: f64) -> Result<Self, ApiError> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(ApiError::InvalidQuery(format!(
                "radius must be a positive distance, got {radius_m}"
            )));
        }
        Ok(Self::ways(format!(
            "way(around:{},{:.7},{:.7}){HIGHWAY_FILTER}",
            radius_m, center.latitude, center.longitude
        )))
    }

    /// Highways intersecting the given bounding box.
    pub fn highways_in(bounds: &Bounds) -> Result<Self, ApiError> {
        if !bounds.is_valid() {
            return Err(ApiError::InvalidQuery(format!(
                "invalid bounding box {:?}",
                bounds
            )));
        }
        Ok(Self::ways(format!(
            "way{HIGHWAY_FILTER}({:.7},{:.7},{:.7},{:.7})",
            bounds.south, bounds.west, bounds.north, bounds.east
        )))
    }

    /// The ways with the given ids.
    pub fn ways_by_id(ids: &[RoadId]) -> Result<Self, ApiError> {
        if ids.is_empty() {
            return Err(ApiError::InvalidQuery("no way ids given".to_owned()));
        }
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Ok(Self::ways(format!("way(id:{ids})")))
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn around_query() {
        let center = Coordinate::new(33.18, 131.62).unwrap();
        let query = Query::highways_around(&center, 15.0).unwrap();
        assert_eq!(
            query.text(),
            "[out:json];\nway(around:15,33.1800000,131.6200000)[\"highway\"];\nout geom;"
        );
    }

    #[test]
    fn around_query_needs_positive_radius() {
        let center = Coordinate::new(33.18, 131.62).unwrap();
        assert!(Query::highways_around(&center, 0.0).is_err());
        assert!(Query::highways_around(&center, -3.0).is_err());
        assert!(Query::highways_around(&center, f64::INFINITY).is_err());
    }

    #[test]
    fn bounding_box_query_is_south_west_north_east() {
        let bounds = Bounds::new(33.17, 131.61, 33.19, 131.63);
        let query = Query::highways_in(&bounds).unwrap();
        assert_eq!(
            query.text(),
            "[out:json];\nway[\"highway\"](33.1700000,131.6100000,33.1900000,131.6300000);\nout geom;"
        );
        assert!(Query::highways_in(&Bounds::new(33.19, 131.61, 33.17, 131.63)).is_err());
    }

    #[test]
    fn id_query() {
        let query = Query::ways_by_id(&[RoadId(12), RoadId(34)]).unwrap();
        assert_eq!(query.text(), "[out:json];\nway(id:12,34);\nout geom;");
        assert!(Query::ways_by_id(&[]).is_err());
    }
}
