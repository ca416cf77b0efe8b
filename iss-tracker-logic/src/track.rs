use std::collections::{VecDeque, vec_deque};

use crate::location::Coordinate;

/// Longitude jump between consecutive points that we treat as wrapping around the antimeridian
/// rather than as real movement.
const WRAP_THRESHOLD: f64 = 180.0;

/// Bounded, chronologically ordered history of observed coordinates. Once `max_len` points are
/// held, pushing evicts the oldest one.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: VecDeque<Coordinate>,
    max_len: usize,
}

impl Track {
    /// `max_len` is clamped to at least one point
    pub fn new(max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            // Don't preallocate huge bounds up front
            points: VecDeque::with_capacity(max_len.min(256)),
            max_len,
        }
    }

    /// Append a point, returning the evicted oldest point if the track was full
    pub fn push(&mut self, coordinate: Coordinate) -> Option<Coordinate> {
        let evicted = if self.points.len() >= self.max_len {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(coordinate);
        evicted
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn latest(&self) -> Option<&Coordinate> {
        self.points.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Coordinate> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<Coordinate> {
        self.points.iter().copied().collect()
    }

    /// Split the track into polylines that can be drawn on a flat map, breaking wherever the
    /// track crosses the antimeridian.
    pub fn segments(&self) -> Vec<Vec<Coordinate>> {
        split_segments(self.points.iter().copied())
    }
}

pub(crate) fn split_segments(
    points: impl IntoIterator<Item = Coordinate>,
) -> Vec<Vec<Coordinate>> {
    let mut segments: Vec<Vec<Coordinate>> = Vec::new();
    let mut current: Vec<Coordinate> = Vec::new();

    for point in points {
        if let Some(prev) = current.last() {
            if (point.longitude() - prev.longitude()).abs() > WRAP_THRESHOLD {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(point);
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Coordinate;
    type IntoIter = vec_deque::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
