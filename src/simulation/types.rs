//! Core types for the traffic simulation
//!
//! Identifiers, value ranges and file names shared by the engine and its loaders.

use std::fmt;
use std::ops::RangeInclusive;

/// Identifier of a car, chosen by whoever loads the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarId(pub u32);

/// Identifier of an intersection node, chosen by whoever loads the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Identifier of a street, assigned sequentially from 0 in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreetId(pub usize);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StreetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gap every car keeps to the car in front of it on the same street
pub const MIN_DISTANCE: u32 = 10;

/// Number of distinct turn indices a car cycles through
pub const TURN_INDEX_PERIOD: u8 = 4;

pub const STREET_LENGTH_RANGE: RangeInclusive<u32> = 10..=10_000;
pub const SPEED_LIMIT_RANGE: RangeInclusive<u32> = 5..=40;
pub const LANE_COUNT_RANGE: RangeInclusive<u8> = 1..=2;
pub const GREEN_PHASE_RANGE: RangeInclusive<u32> = 3..=10;
pub const DESIRED_SPEED_RANGE: RangeInclusive<u32> = 20..=40;
pub const ACCELERATION_RANGE: RangeInclusive<u32> = 1..=10;

/// Allowed number of incoming and of outgoing streets per intersection
pub const NODE_DEGREE_RANGE: RangeInclusive<usize> = 1..=4;

/// Green phase duration that marks an intersection as a roundabout
pub const ROUNDABOUT_GREEN_PHASE: u32 = 0;

pub const CROSSINGS_FILE: &str = "crossings.sim";
pub const STREETS_FILE: &str = "streets.sim";
pub const CARS_FILE: &str = "cars.sim";
