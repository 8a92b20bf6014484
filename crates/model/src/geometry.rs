//! Polyline helpers used to align a segment with road geometry.

use std::cmp::Ordering;

use itertools::Itertools;
use utility::geo::{closest_point_on_segment, distance_to_segment_m};

use crate::{Coordinate, RoadRef};

/// Vertices closer than this (in degrees) are considered the same node.
const SAME_VERTEX_EPSILON: f64 = 1e-7;

fn same_vertex(a: &Coordinate, b: &Coordinate) -> bool {
    (a.latitude - b.latitude).abs() < SAME_VERTEX_EPSILON
        && (a.longitude - b.longitude).abs() < SAME_VERTEX_EPSILON
}

/// Where `coordinate` meets the polyline: the index `i` of the closest
/// segment (`polyline[i]` to `polyline[i + 1]`) and the foot of the
/// perpendicular on it. A single vertex counts as segment 0.
pub fn closest_segment(
    polyline: &[Coordinate],
    coordinate: &Coordinate,
) -> Option<(usize, Coordinate)> {
    match polyline {
        [] => None,
        [single] => Some((0, *single)),
        _ => polyline
            .iter()
            .tuple_windows()
            .map(|(a, b)| {
                let (_, (latitude, longitude)) =
                    closest_point_on_segment(coordinate.as_tuple(), a.as_tuple(), b.as_tuple());
                Coordinate {
                    latitude,
                    longitude,
                }
            })
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_m(coordinate).total_cmp(&b.distance_m(coordinate))
            }),
    }
}

pub fn distance_to_polyline_m(polyline: &[Coordinate], coordinate: &Coordinate) -> Option<f64> {
    match polyline {
        [] => None,
        [single] => Some(single.distance_m(coordinate)),
        _ => polyline
            .iter()
            .tuple_windows()
            .map(|(a, b)| {
                distance_to_segment_m(coordinate.as_tuple(), a.as_tuple(), b.as_tuple())
            })
            .min_by(|a, b| a.total_cmp(b)),
    }
}

/// Vertices from index `from` to index `to`, both inclusive. Walks backwards
/// when `from > to`. Empty if either index is out of range.
pub fn slice_between(polyline: &[Coordinate], from: usize, to: usize) -> Vec<Coordinate> {
    if from >= polyline.len() || to >= polyline.len() {
        return vec![];
    }
    if from <= to {
        polyline[from..=to].to_vec()
    } else {
        polyline[to..=from].iter().rev().copied().collect()
    }
}

/// Vertices met when walking from a point on segment `segment` to the
/// vertex `vertex`, that vertex included.
fn walk_to_vertex(polyline: &[Coordinate], segment: usize, vertex: usize) -> Vec<Coordinate> {
    if vertex > segment {
        slice_between(polyline, segment + 1, vertex)
    } else {
        slice_between(polyline, segment, vertex)
    }
}

/// First pair of indices `(i, j)` with `a[i]` and `b[j]` on the same node.
pub fn shared_vertex(a: &[Coordinate], b: &[Coordinate]) -> Option<(usize, usize)> {
    a.iter().enumerate().find_map(|(i, vertex)| {
        b.iter()
            .position(|other| same_vertex(vertex, other))
            .map(|j| (i, j))
    })
}

/// Path from `from` to `to` that follows the given roads. Both clicks are
/// projected onto their road first, so the path never runs back past a
/// click. Empty when no such path can be derived (no geometry, or two roads
/// that do not meet).
pub fn road_path(
    from: &Coordinate,
    from_road: &RoadRef,
    to: &Coordinate,
    to_road: &RoadRef,
) -> Vec<Coordinate> {
    let (Some((start, start_foot)), Some((end, end_foot))) = (
        closest_segment(&from_road.geometry, from),
        closest_segment(&to_road.geometry, to),
    ) else {
        return vec![];
    };

    let mut along = vec![start_foot];
    if from_road.id == to_road.id {
        match start.cmp(&end) {
            Ordering::Less => {
                along.extend(slice_between(&from_road.geometry, start + 1, end))
            }
            Ordering::Greater => {
                along.extend(slice_between(&from_road.geometry, start, end + 1))
            }
            Ordering::Equal => {}
        }
    } else {
        let Some((junction_from, junction_to)) =
            shared_vertex(&from_road.geometry, &to_road.geometry)
        else {
            return vec![];
        };
        along.extend(walk_to_vertex(&from_road.geometry, start, junction_from));
        // the junction already ends the first part
        let mut second = walk_to_vertex(&to_road.geometry, end, junction_to);
        second.reverse();
        along.extend(second.into_iter().skip(1));
    }
    along.push(end_foot);

    let mut path = Vec::with_capacity(along.len() + 2);
    path.push(*from);
    path.extend(along);
    path.push(*to);
    path.dedup_by(|a, b| same_vertex(a, b));
    // a merged run at the end stands for the click itself
    if let Some(last) = path.last_mut() {
        *last = *to;
    }
    path
}
