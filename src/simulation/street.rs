//! Streets and the movement of cars along them
//!
//! A street is a one-dimensional line from its start node (position 0) to its
//! end node (position `length`). Cars are kept in a map ordered by position so
//! "car ahead" queries are range lookups.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::car::SimCar;
use super::tick_state::TickState;
use super::types::{CarId, NodeId, StreetId, MIN_DISTANCE};

/// Outcome of moving one car along its street for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMove {
    pub new_position: u32,
    /// The car jumped past the car directly ahead of it
    pub overtaking: bool,
    /// The car closed up to exactly the minimum distance behind its leader
    pub stalled: bool,
}

/// A directed street between two intersections
#[derive(Debug, Clone)]
pub struct SimStreet {
    pub id: StreetId,
    pub from: NodeId,
    pub to: NodeId,
    pub length: u32,
    pub speed_limit: u32,
    pub lanes: u8,
    /// Position (meters from the start) to the car at that position
    cars: BTreeMap<u32, CarId>,
}

impl SimStreet {
    pub fn new(
        id: StreetId,
        from: NodeId,
        to: NodeId,
        length: u32,
        lanes: u8,
        speed_limit: u32,
    ) -> Self {
        Self {
            id,
            from,
            to,
            length,
            speed_limit,
            lanes,
            cars: BTreeMap::new(),
        }
    }

    /// Only two-lane streets allow overtaking
    pub fn is_overtakeable(&self) -> bool {
        self.lanes == 2
    }

    /// Most cars the street can hold while keeping the minimum distance
    pub fn capacity(&self) -> usize {
        (self.length / MIN_DISTANCE + 1) as usize
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Cars ordered from the end of the street towards its start
    pub fn cars_front_to_back(&self) -> Vec<(u32, CarId)> {
        self.cars.iter().rev().map(|(pos, car)| (*pos, *car)).collect()
    }

    pub fn car_at(&self, position: u32) -> Option<CarId> {
        self.cars.get(&position).copied()
    }

    /// Position of the car closest to the start of the street
    pub fn back_position(&self) -> Option<u32> {
        self.cars.keys().next().copied()
    }

    /// Find the car directly ahead of a position
    pub fn car_ahead(&self, position: u32) -> Option<(u32, CarId)> {
        self.cars
            .range((Bound::Excluded(position), Bound::Unbounded))
            .next()
            .map(|(pos, car)| (*pos, *car))
    }

    /// True if one more car fits behind the last car of the street
    pub fn has_space(&self) -> bool {
        self.entry_slot().is_some()
    }

    /// Where the next car queued onto the street goes: the street's end if it
    /// is empty, otherwise the minimum distance behind the last car
    pub fn entry_slot(&self) -> Option<u32> {
        match self.back_position() {
            Some(back) => back.checked_sub(MIN_DISTANCE),
            None => Some(self.length),
        }
    }

    /// True if a car at `position` would be on the street and at least the
    /// minimum distance away from every other car
    pub fn fits_at(&self, position: u32) -> bool {
        position <= self.length
            && self
                .cars
                .range(position.saturating_sub(MIN_DISTANCE - 1)..=position + MIN_DISTANCE - 1)
                .next()
                .is_none()
    }

    /// True if a car crossing into this street finds a gap strictly larger
    /// than the minimum distance at the entry
    pub fn admits_crossing(&self) -> bool {
        self.back_position().is_none_or(|back| back > MIN_DISTANCE)
    }

    /// Queue a car behind every car already on the street. Returns false and
    /// leaves everything untouched without space.
    pub(super) fn place_at_back(&mut self, car: &mut SimCar) -> bool {
        match self.entry_slot() {
            Some(position) => self.place_at(car, position),
            None => false,
        }
    }

    /// Put a car at a free position
    pub(super) fn place_at(&mut self, car: &mut SimCar, position: u32) -> bool {
        if !self.fits_at(position) {
            return false;
        }
        car.street = self.id;
        car.position = position;
        self.cars.insert(position, car.id);
        true
    }

    /// Take over a car that just crossed the start intersection
    pub(super) fn arrive(&mut self, car: &mut SimCar, tick: &mut TickState) -> u32 {
        let limit = match self.back_position() {
            Some(back) => back.saturating_sub(MIN_DISTANCE),
            None => self.length,
        };
        let position = car.meters_left().min(limit);
        car.consume_meters(position);
        car.street = self.id;
        car.position = position;
        tick.mark_acted(car.id);
        self.cars.insert(position, car.id);
        position
    }

    /// Remove the car at a position, returning its id
    pub(super) fn remove(&mut self, position: u32) -> Option<CarId> {
        self.cars.remove(&position)
    }

    /// Move the car stored at `from` to `to`
    pub(super) fn relocate(&mut self, from: u32, to: u32) {
        if from == to {
            return;
        }
        if let Some(car) = self.cars.remove(&from) {
            self.cars.insert(to, car);
        }
    }

    /// Decide where a car at `position` driving at `speed` ends up this tick.
    ///
    /// Only cars ahead of `position` are consulted. Those have already been
    /// updated this tick because streets are processed from the end backwards,
    /// which includes cars that just overtook.
    pub fn plan_move(&self, position: u32, speed: u32) -> PlannedMove {
        let reach = position + speed;
        let ahead = self.car_ahead(position);
        let next_pos = ahead.map_or(self.length, |(pos, _)| pos);
        let second_next_pos = ahead
            .and_then(|(pos, _)| self.car_ahead(pos))
            .map_or(self.length, |(pos, _)| pos);

        let can_overtake = ahead.is_some()
            && self.is_overtakeable()
            && second_next_pos - next_pos >= 2 * MIN_DISTANCE
            && reach >= next_pos + MIN_DISTANCE;

        if can_overtake {
            return PlannedMove {
                new_position: reach.min(second_next_pos - MIN_DISTANCE),
                overtaking: true,
                stalled: false,
            };
        }

        match ahead {
            Some((next_pos, _)) => {
                let limit = next_pos.saturating_sub(MIN_DISTANCE);
                // never move backwards, even if a leader sits closer than allowed
                let new_position = reach.min(limit).max(position);
                PlannedMove {
                    new_position,
                    overtaking: false,
                    stalled: new_position == limit,
                }
            }
            None => PlannedMove {
                new_position: reach.min(self.length),
                overtaking: false,
                stalled: false,
            },
        }
    }

    /// Every pair of neighbouring cars is at least the minimum distance apart
    pub fn respects_min_distance(&self) -> bool {
        let positions: Vec<u32> = self.cars.keys().copied().collect();
        positions
            .windows(2)
            .all(|pair| pair[1] - pair[0] >= MIN_DISTANCE)
    }

    pub fn within_capacity(&self) -> bool {
        self.cars.len() <= self.capacity()
            && self.cars.keys().all(|pos| *pos <= self.length)
    }
}
