//! Reproducible demo worlds
//!
//! Builds a valid street ring with a seeded RNG, for headless demo runs,
//! benchmarks and randomized invariant checks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::SimError;
use super::types::{
    CarId, NodeId, ACCELERATION_RANGE, DESIRED_SPEED_RANGE, GREEN_PHASE_RANGE, SPEED_LIMIT_RANGE,
};
use super::world::SimWorld;

/// Shape of a generated demo world
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    /// Number of intersections on the ring, at least 2
    pub intersections: u32,
    /// Chance of queueing one more car on a street, tried until it fails or
    /// the street is full
    pub car_probability: f64,
    /// Chance that an intersection is a roundabout instead of a crossing
    pub roundabout_probability: f64,
    /// Longest street the generator creates
    pub max_street_length: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            intersections: 8,
            car_probability: 0.75,
            roundabout_probability: 0.5,
            max_street_length: 200,
        }
    }
}

/// Build a two-way ring of intersections with randomly parameterised streets
/// and cars. The same seed always yields the same world.
pub fn build_demo_world(seed: u64, config: DemoConfig) -> Result<SimWorld, SimError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = SimWorld::new();
    let node_count = config.intersections.max(2);
    let max_length = config.max_street_length.clamp(10, 10_000);

    for id in 0..node_count {
        let green_phase = if rng.random_bool(config.roundabout_probability) {
            0
        } else {
            rng.random_range(GREEN_PHASE_RANGE)
        };
        world.add_intersection(NodeId(id), green_phase)?;
    }

    let mut streets = Vec::new();
    for id in 0..node_count {
        let next = (id + 1) % node_count;
        for (from, to) in [(id, next), (next, id)] {
            let length = rng.random_range(10..=max_length);
            let lanes = rng.random_range(1..=2);
            let speed_limit = rng.random_range(SPEED_LIMIT_RANGE);
            streets.push(world.add_street(NodeId(from), NodeId(to), length, lanes, speed_limit)?);
        }
    }

    let mut next_car = 0;
    for street in streets {
        while world
            .road_network
            .street(street)
            .is_some_and(|street| street.has_space())
            && rng.random_bool(config.car_probability)
        {
            let desired_speed = rng.random_range(DESIRED_SPEED_RANGE);
            let acceleration = rng.random_range(ACCELERATION_RANGE);
            world.add_vehicle(CarId(next_car), street, desired_speed, acceleration)?;
            next_car += 1;
        }
    }

    Ok(world)
}
