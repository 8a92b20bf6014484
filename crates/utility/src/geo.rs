pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great circle distance in kilometers.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Meters covered by one degree of latitude and one degree of longitude at
/// the given latitude. Only meaningful for short distances.
pub fn meters_per_degree(lat: f64) -> (f64, f64) {
    let per_degree = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
    (per_degree, per_degree * to_radians(lat).cos())
}

/// Point of the segment `a`-`b` closest to `p`, as `(t, (lat, lon))` where
/// `t` in `[0, 1]` is how far along the segment it lies. All positions are
/// `(lat, lon)`; the projection is a local equirectangular one around `p`.
pub fn closest_point_on_segment(
    p: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
) -> (f64, (f64, f64)) {
    let (m_lat, m_lon) = meters_per_degree(p.0);
    let project = |q: (f64, f64)| ((q.1 - p.1) * m_lon, (q.0 - p.0) * m_lat);

    let (ax, ay) = project(a);
    let (bx, by) = project(b);
    let (dx, dy) = (bx - ax, by - ay);
    let length_sq = dx * dx + dy * dy;

    // degenerate segment
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (-(ax * dx + ay * dy) / length_sq).clamp(0.0, 1.0)
    };
    (t, (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1)))
}

/// Distance in meters from `p` to the segment `a`-`b`.
pub fn distance_to_segment_m(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (_, closest) = closest_point_on_segment(p, a, b);
    let (m_lat, m_lon) = meters_per_degree(p.0);
    ((closest.1 - p.1) * m_lon).hypot((closest.0 - p.0) * m_lat)
}
