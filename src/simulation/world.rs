//! Main simulation world that ties everything together
//!
//! The world owns the street graph and every car. One tick first moves the
//! cars of every street in street-id order, handing cars over intersections as
//! they reach a street's end, and only then advances the intersection clocks.

use log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;

use super::car::SimCar;
use super::error::SimError;
use super::road_network::SimRoadNetwork;
use super::tick_state::TickState;
use super::types::{CarId, NodeId, StreetId, ACCELERATION_RANGE, DESIRED_SPEED_RANGE};

/// The main simulation world
#[derive(Debug, Default)]
pub struct SimWorld {
    /// Streets and intersections
    pub road_network: SimRoadNetwork,

    /// All cars, by id
    cars: BTreeMap<CarId, SimCar>,

    /// Ticks simulated so far
    ticks: u64,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an intersection; a green phase of 0 makes a roundabout, 3 to 10 a crossing
    pub fn add_intersection(&mut self, id: NodeId, green_phase: u32) -> Result<(), SimError> {
        self.road_network.add_intersection(id, green_phase)
    }

    /// Add a one-way street and return its sequential id
    pub fn add_street(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: u32,
        lanes: u8,
        speed_limit: u32,
    ) -> Result<StreetId, SimError> {
        self.road_network.add_street(from, to, length, lanes, speed_limit)
    }

    /// Queue a car on a street: the first car goes to the street's end, every
    /// further one the minimum distance behind the car before it
    pub fn add_vehicle(
        &mut self,
        id: CarId,
        street: StreetId,
        desired_speed: u32,
        acceleration: u32,
    ) -> Result<(), SimError> {
        self.check_new_vehicle(id, street, desired_speed, acceleration)?;
        let target = self
            .road_network
            .street_mut(street)
            .ok_or(SimError::UnknownStreet(street))?;

        let mut car = SimCar::new(id, desired_speed, acceleration, street);
        if !target.place_at_back(&mut car) {
            return Err(SimError::StreetFull(street));
        }
        self.cars.insert(id, car);
        Ok(())
    }

    /// Put a car at a chosen position, at least the minimum distance away
    /// from every car already on the street
    pub fn add_vehicle_at(
        &mut self,
        id: CarId,
        street: StreetId,
        position: u32,
        desired_speed: u32,
        acceleration: u32,
    ) -> Result<(), SimError> {
        self.check_new_vehicle(id, street, desired_speed, acceleration)?;
        let target = self
            .road_network
            .street_mut(street)
            .ok_or(SimError::UnknownStreet(street))?;

        let mut car = SimCar::new(id, desired_speed, acceleration, street);
        if !target.place_at(&mut car, position) {
            return Err(SimError::NoRoomAt { street, position });
        }
        self.cars.insert(id, car);
        Ok(())
    }

    fn check_new_vehicle(
        &self,
        id: CarId,
        street: StreetId,
        desired_speed: u32,
        acceleration: u32,
    ) -> Result<(), SimError> {
        if !DESIRED_SPEED_RANGE.contains(&desired_speed) {
            return Err(SimError::InvalidDesiredSpeed(desired_speed));
        }
        if !ACCELERATION_RANGE.contains(&acceleration) {
            return Err(SimError::InvalidAcceleration(acceleration));
        }
        if self.cars.contains_key(&id) {
            return Err(SimError::DuplicateCar(id));
        }
        if self.road_network.street(street).is_none() {
            return Err(SimError::UnknownStreet(street));
        }
        Ok(())
    }

    /// Whether the loaded graph may be simulated
    pub fn is_graph_valid(&self) -> bool {
        self.road_network.is_valid()
    }

    /// Advance the simulation by one tick
    pub fn tick(&mut self) {
        let mut tick = TickState::new();

        let street_ids: Vec<StreetId> = self.road_network.street_ids().collect();
        for street_id in street_ids {
            self.update_street(street_id, &mut tick);
        }

        self.road_network.advance_clocks();
        self.ticks += 1;
    }

    /// Advance the simulation by several ticks
    pub fn simulate(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Move every car of one street, starting with the car closest to its end
    fn update_street(&mut self, street_id: StreetId, tick: &mut TickState) {
        let Some(street) = self.road_network.street(street_id) else {
            return;
        };
        let speed_limit = street.speed_limit;
        let length = street.length;
        let snapshot = street.cars_front_to_back();

        for (_, car_id) in snapshot {
            if tick.has_acted(car_id) {
                continue;
            }
            let (Some(street), Some(car)) = (
                self.road_network.street_mut(street_id),
                self.cars.get_mut(&car_id),
            ) else {
                continue;
            };
            if car.street != street_id {
                continue;
            }

            let initial_position = car.position;
            car.update_speed(speed_limit);
            let planned = street.plan_move(initial_position, car.speed);
            if planned.overtaking {
                tick.mark_acted(car_id);
            }
            if planned.stalled {
                car.stop();
            }
            car.consume_meters(planned.new_position - initial_position);
            car.position = planned.new_position;
            street.relocate(initial_position, planned.new_position);

            trace!(
                "Car {} on street {}: {} -> {} (speed {}{})",
                car_id,
                street_id,
                initial_position,
                planned.new_position,
                car.speed,
                if planned.overtaking { ", overtaking" } else { "" }
            );

            if car.position == length && car.meters_left() > 0 && !tick.has_acted(car_id) {
                cross_intersection(&mut self.road_network, street_id, car, tick);
            }

            if car.street == street_id && car.position == initial_position {
                car.stop();
            }
        }
    }

    pub fn car(&self, id: CarId) -> Option<&SimCar> {
        self.cars.get(&id)
    }

    /// All cars in id order
    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.cars.values()
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn contains_car(&self, id: CarId) -> bool {
        self.cars.contains_key(&id)
    }

    pub fn vehicle_street(&self, id: CarId) -> Option<StreetId> {
        self.car(id).map(|car| car.street)
    }

    pub fn vehicle_position(&self, id: CarId) -> Option<u32> {
        self.car(id).map(|car| car.position)
    }

    pub fn vehicle_speed(&self, id: CarId) -> Option<u32> {
        self.car(id).map(|car| car.speed)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Summary of the world state for headless runs
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SimWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Traffic Simulation Summary ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(
            f,
            "Intersections: {}, Streets: {}, Cars: {}",
            self.road_network.intersection_count(),
            self.road_network.street_count(),
            self.cars.len()
        )?;

        writeln!(f, "--- Intersections ---")?;
        for intersection in self.road_network.intersections() {
            match intersection.green_street() {
                Some(green) => writeln!(
                    f,
                    "  Crossing {}: green on street {}",
                    intersection.id, green
                )?,
                None => writeln!(f, "  Roundabout {}", intersection.id)?,
            }
        }

        writeln!(f, "--- Streets ---")?;
        for street in self.road_network.streets() {
            writeln!(
                f,
                "  Street {} ({} -> {}): {}/{} cars",
                street.id,
                street.from,
                street.to,
                street.car_count(),
                street.capacity()
            )?;
        }

        if !self.cars.is_empty() {
            writeln!(f, "--- Cars ---")?;
            for car in self.cars.values() {
                writeln!(
                    f,
                    "  Car {}: street={}, position={}, speed={}",
                    car.id, car.street, car.position, car.speed
                )?;
            }
        }
        Ok(())
    }
}

/// Hand the car waiting at the end of `incoming` to an outgoing street of the
/// intersection ahead. Each incoming street gets one attempt per tick while
/// the intersection releases it. Returns true when the car crossed.
fn cross_intersection(
    network: &mut SimRoadNetwork,
    incoming: StreetId,
    car: &mut SimCar,
    tick: &mut TickState,
) -> bool {
    let Some(intersection) = network.end_intersection(incoming) else {
        return false;
    };
    let node = intersection.id;
    if !intersection.releases(incoming) || !tick.begin_attempt(incoming) {
        return false;
    }

    let Some(target) = network.may_cross(incoming, car) else {
        debug!(
            "Car {} waits at intersection {} on street {}",
            car.id, node, incoming
        );
        return false;
    };

    if let Some(source) = network.street_mut(incoming) {
        source.remove(car.position);
    }
    tick.mark_acted(car.id);
    if let Some(destination) = network.street_mut(target) {
        let position = destination.arrive(car, tick);
        debug!(
            "Car {} crossed intersection {} from street {} to street {} at {}",
            car.id, node, incoming, target, position
        );
    }
    true
}
