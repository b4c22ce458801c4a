//! Standalone traffic simulation module
//!
//! This module contains the discrete-time street simulation: cars, streets,
//! intersections and the world that advances them tick by tick. It knows
//! nothing about files or the command line.

mod car;
mod error;
mod intersection;
mod road_network;
pub mod scenario;
mod street;
mod tick_state;
mod types;
mod world;

// Re-export public types for external use
pub use car::SimCar;
pub use error::SimError;
pub use intersection::{IntersectionKind, SimIntersection, TrafficLight};
pub use road_network::SimRoadNetwork;
pub use street::{PlannedMove, SimStreet};
pub use types::{
    CarId, NodeId, StreetId, ACCELERATION_RANGE, CARS_FILE, CROSSINGS_FILE,
    DESIRED_SPEED_RANGE, GREEN_PHASE_RANGE, LANE_COUNT_RANGE, MIN_DISTANCE, NODE_DEGREE_RANGE,
    ROUNDABOUT_GREEN_PHASE, SPEED_LIMIT_RANGE, STREETS_FILE, STREET_LENGTH_RANGE,
    TURN_INDEX_PERIOD,
};
pub use world::SimWorld;
