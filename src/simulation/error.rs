//! Construction errors raised while building a simulation graph

use thiserror::Error;

use super::types::{CarId, NodeId, StreetId};

/// A rejected graph construction step. Nothing is applied when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("green phase duration {0} must be 0 (roundabout) or between 3 and 10")]
    InvalidGreenPhase(u32),
    #[error("intersection {0} already exists")]
    DuplicateIntersection(NodeId),
    #[error("intersection {0} not found")]
    UnknownIntersection(NodeId),
    #[error("street length {0} must be between 10 and 10000")]
    InvalidStreetLength(u32),
    #[error("lane count {0} must be 1 or 2")]
    InvalidLaneCount(u8),
    #[error("speed limit {0} must be between 5 and 40")]
    InvalidSpeedLimit(u32),
    #[error("desired speed {0} must be between 20 and 40")]
    InvalidDesiredSpeed(u32),
    #[error("acceleration {0} must be between 1 and 10")]
    InvalidAcceleration(u32),
    #[error("car {0} already exists")]
    DuplicateCar(CarId),
    #[error("street {0} not found")]
    UnknownStreet(StreetId),
    #[error("street {0} is full")]
    StreetFull(StreetId),
    #[error("position {position} on street {street} is off the street or too close to another car")]
    NoRoomAt { street: StreetId, position: u32 },
}
