//! Intersection logic for the traffic simulation
//!
//! Two kinds of intersection exist: a signalled crossing that releases one
//! incoming street at a time, and a roundabout that offers every incoming
//! street a crossing attempt each tick.

use super::car::SimCar;
use super::error::SimError;
use super::types::{
    NodeId, StreetId, GREEN_PHASE_RANGE, NODE_DEGREE_RANGE, ROUNDABOUT_GREEN_PHASE,
};

/// Round-robin traffic light of a crossing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    /// Ticks each incoming street stays green
    pub green_phase: u32,
    /// Ticks left in the current green phase
    pub remaining: u32,
    /// Index into the incoming streets of the street that currently has green
    pub green_index: usize,
}

impl TrafficLight {
    pub fn new(green_phase: u32) -> Self {
        Self {
            green_phase,
            remaining: green_phase,
            green_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntersectionKind {
    Crossing(TrafficLight),
    Roundabout,
}

/// An intersection in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimIntersection {
    pub id: NodeId,
    pub kind: IntersectionKind,
    /// Streets ending here, in attachment order
    incoming: Vec<StreetId>,
    /// Streets starting here, in attachment order
    outgoing: Vec<StreetId>,
}

impl SimIntersection {
    /// A green phase of 0 makes a roundabout, 3 to 10 a crossing
    pub fn new(id: NodeId, green_phase: u32) -> Result<Self, SimError> {
        let kind = if green_phase == ROUNDABOUT_GREEN_PHASE {
            IntersectionKind::Roundabout
        } else if GREEN_PHASE_RANGE.contains(&green_phase) {
            IntersectionKind::Crossing(TrafficLight::new(green_phase))
        } else {
            return Err(SimError::InvalidGreenPhase(green_phase));
        };

        Ok(Self {
            id,
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        })
    }

    pub fn add_incoming(&mut self, street: StreetId) {
        self.incoming.push(street);
    }

    pub fn add_outgoing(&mut self, street: StreetId) {
        self.outgoing.push(street);
    }

    pub fn incoming(&self) -> &[StreetId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[StreetId] {
        &self.outgoing
    }

    /// Incoming street that currently has green, if this is a crossing
    pub fn green_street(&self) -> Option<StreetId> {
        match &self.kind {
            IntersectionKind::Crossing(light) => self.incoming.get(light.green_index).copied(),
            IntersectionKind::Roundabout => None,
        }
    }

    /// Whether cars waiting on `incoming` may attempt to cross right now
    pub fn releases(&self, incoming: StreetId) -> bool {
        match &self.kind {
            IntersectionKind::Crossing(_) => self.green_street() == Some(incoming),
            IntersectionKind::Roundabout => self.incoming.contains(&incoming),
        }
    }

    /// Choose the outgoing street for a car waiting at the end of `incoming`.
    ///
    /// The car's turn index is consumed on every attempt, also when the chosen
    /// street has no room, so a rejected car tries the next exit next time.
    /// Nothing is consumed while `incoming` is not released.
    pub fn may_cross(
        &self,
        incoming: StreetId,
        car: &mut SimCar,
        has_space: impl Fn(StreetId) -> bool,
    ) -> Option<StreetId> {
        if !self.releases(incoming) || self.outgoing.is_empty() {
            return None;
        }

        let turn = car.next_turn() as usize;
        let target = self.outgoing[turn % self.outgoing.len()];
        has_space(target).then_some(target)
    }

    /// Advance internal timers once all cars have moved.
    /// Returns true when the green light switched to another street.
    pub fn advance_clock(&mut self) -> bool {
        let incoming_count = self.incoming.len();
        match &mut self.kind {
            IntersectionKind::Crossing(light) => {
                light.remaining = light.remaining.saturating_sub(1);
                if light.remaining > 0 {
                    return false;
                }
                light.remaining = light.green_phase;
                if incoming_count > 0 {
                    light.green_index = (light.green_index + 1) % incoming_count;
                }
                true
            }
            IntersectionKind::Roundabout => false,
        }
    }

    /// 1 to 4 incoming and 1 to 4 outgoing streets
    pub fn is_valid(&self) -> bool {
        NODE_DEGREE_RANGE.contains(&self.incoming.len())
            && NODE_DEGREE_RANGE.contains(&self.outgoing.len())
    }
}
