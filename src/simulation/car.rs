//! Car kinematics and routing state
//!
//! A car never moves itself; streets move it and keep its cached location in sync.

use super::types::{CarId, StreetId, TURN_INDEX_PERIOD};

/// A car in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    /// Speed gained per tick
    pub acceleration: u32,
    /// Cruising speed the car never exceeds
    pub desired_speed: u32,
    pub speed: u32,
    /// Exit chosen at the next intersection, reduced modulo its out-degree there
    turn_index: u8,
    /// Meters the car may still drive during the current tick
    meters_left: u32,
    /// Street currently holding the car
    pub street: StreetId,
    /// Meters from the start of `street`
    pub position: u32,
}

impl SimCar {
    pub fn new(id: CarId, desired_speed: u32, acceleration: u32, street: StreetId) -> Self {
        Self {
            id,
            acceleration,
            desired_speed,
            speed: 0,
            turn_index: 0,
            meters_left: 0,
            street,
            position: 0,
        }
    }

    /// Accelerate towards the desired speed, capped by the street's limit,
    /// and grant the new speed as this tick's driving budget
    pub fn update_speed(&mut self, speed_limit: u32) {
        self.speed = (self.speed + self.acceleration)
            .min(self.desired_speed)
            .min(speed_limit);
        self.meters_left = self.speed;
    }

    pub fn consume_meters(&mut self, meters: u32) {
        self.meters_left = self.meters_left.saturating_sub(meters);
    }

    pub fn meters_left(&self) -> u32 {
        self.meters_left
    }

    /// Returns the current turn index and advances it to the next one
    pub fn next_turn(&mut self) -> u8 {
        let turn = self.turn_index;
        self.turn_index = (self.turn_index + 1) % TURN_INDEX_PERIOD;
        turn
    }

    pub fn turn_index(&self) -> u8 {
        self.turn_index
    }

    /// Force a stop, e.g. when blocked by the car ahead
    pub fn stop(&mut self) {
        self.speed = 0;
    }
}
