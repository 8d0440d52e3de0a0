use std::fmt;

use crate::consts::{DEFAULT_ANGLE_TOLERANCE, DEFAULT_DISTANCE_TOLERANCE};

/// Represents a single minutia.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Minutia {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Orientation in degrees, within `0..360`.
    pub theta: i32,
}

impl Minutia {
    #[inline]
    pub const fn new(x: i32, y: i32, theta: i32) -> Self {
        Minutia { x, y, theta }
    }
}

/// Represents a type-safe, 1-based index of a minutia in a template.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Endpoint(pub(crate) u32);

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Endpoint {
    /// Creates an endpoint from a 1-based index.
    #[inline]
    pub fn new(index: u32) -> Self {
        debug_assert!(index > 0, "endpoints are 1-based");
        Endpoint(index)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Endpoint for a 0-based position in a minutiae slice.
    #[inline]
    pub(crate) fn from_offset(offset: usize) -> Self {
        Endpoint(offset as u32 + 1)
    }

    /// 0-based position in a minutiae slice.
    #[inline]
    pub(crate) fn offset(self) -> usize {
        self.0 as usize - 1
    }
}

impl From<u32> for Endpoint {
    fn from(index: u32) -> Self {
        Endpoint::new(index)
    }
}

/// Ordered pair of distinct minutiae within one template.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct PairKey {
    pub first: Endpoint,
    pub second: Endpoint,
}

impl PairKey {
    /// Creates a key from 1-based indices.
    #[inline]
    pub fn new(first: u32, second: u32) -> Self {
        PairKey::from_endpoints(Endpoint::new(first), Endpoint::new(second))
    }

    #[inline]
    pub fn from_endpoints(first: Endpoint, second: Endpoint) -> Self {
        debug_assert!(first != second);
        PairKey { first, second }
    }

    /// Same first endpoint or same second endpoint.
    #[inline]
    pub fn shares_position(&self, other: &PairKey) -> bool {
        self.first == other.first || self.second == other.second
    }

    /// Any endpoint in common, regardless of its position in the pair.
    #[inline]
    pub fn shares_minutia(&self, other: &PairKey) -> bool {
        self.shares_position(other) || self.first == other.second || self.second == other.first
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Local structure of an ordered pair of minutiae.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PairwiseRecord {
    /// Euclidean distance between the minutiae.
    pub distance: f64,
    /// Circular difference of orientations, within `0..=180`.
    pub angle: i32,
}

/// Local structure that agrees between the probe and the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    pub key: PairKey,
    /// Accepted probe-side observations, never empty.
    pub observations: Vec<PairwiseRecord>,
}

impl MatchedPair {
    #[inline]
    pub fn new(key: PairKey, observation: PairwiseRecord) -> Self {
        MatchedPair {
            key,
            observations: vec![observation],
        }
    }

    #[inline]
    pub fn first_observation(&self) -> &PairwiseRecord {
        &self.observations[0]
    }
}

/// Which matched pairs are candidates for an edge of the consistency graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Adjacency {
    /// `(a, b)` and `(c, d)` are candidates when `a == c` or `b == d`.
    SharedPosition,
    /// Additionally tests the cross combinations `a == d` and `b == c`.
    SharedMinutia,
}

impl Default for Adjacency {
    fn default() -> Self {
        Adjacency::SharedPosition
    }
}

/// Tolerances used when comparing local structures.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MatchParameters {
    /// Maximal difference of distances, in units of the input coordinates.
    pub distance_tolerance: f64,
    /// Maximal difference of angles, in degrees.
    pub angle_tolerance: i32,
    pub adjacency: Adjacency,
}

impl Default for MatchParameters {
    fn default() -> Self {
        MatchParameters {
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            adjacency: Adjacency::default(),
        }
    }
}

impl MatchParameters {
    pub fn new(distance_tolerance: f64, angle_tolerance: i32) -> Self {
        MatchParameters {
            distance_tolerance,
            angle_tolerance,
            ..Default::default()
        }
    }

    pub fn with_adjacency(self, adjacency: Adjacency) -> Self {
        MatchParameters { adjacency, ..self }
    }

    /// Both tolerances are inclusive.
    #[inline]
    pub fn accepts(&self, a: &PairwiseRecord, b: &PairwiseRecord) -> bool {
        (a.distance - b.distance).abs() <= self.distance_tolerance
            && (a.angle - b.angle).abs() <= self.angle_tolerance
    }
}
