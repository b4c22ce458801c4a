//! Street graph of the simulation
//!
//! Intersections are the graph's nodes and streets its edges. Edge indices
//! are handed out sequentially and never removed, so a street's id doubles as
//! its edge index.

use log::debug;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::BTreeMap;

use super::car::SimCar;
use super::error::SimError;
use super::intersection::SimIntersection;
use super::street::SimStreet;
use super::types::{NodeId, StreetId, LANE_COUNT_RANGE, SPEED_LIMIT_RANGE, STREET_LENGTH_RANGE};

/// Standalone street graph owning every street and intersection
#[derive(Debug, Default)]
pub struct SimRoadNetwork {
    /// Intersections as nodes, streets as edges
    graph: DiGraph<SimIntersection, SimStreet>,

    /// Maps intersection IDs to their node indices in the graph, ordered by ID
    node_indices: BTreeMap<NodeId, NodeIndex>,
}

impl SimRoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection; a green phase of 0 makes it a roundabout
    pub fn add_intersection(&mut self, id: NodeId, green_phase: u32) -> Result<(), SimError> {
        if self.node_indices.contains_key(&id) {
            return Err(SimError::DuplicateIntersection(id));
        }
        let intersection = SimIntersection::new(id, green_phase)?;
        let node_index = self.graph.add_node(intersection);
        self.node_indices.insert(id, node_index);
        Ok(())
    }

    /// Adds a street and attaches it to both intersections
    pub fn add_street(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: u32,
        lanes: u8,
        speed_limit: u32,
    ) -> Result<StreetId, SimError> {
        if !STREET_LENGTH_RANGE.contains(&length) {
            return Err(SimError::InvalidStreetLength(length));
        }
        if !LANE_COUNT_RANGE.contains(&lanes) {
            return Err(SimError::InvalidLaneCount(lanes));
        }
        if !SPEED_LIMIT_RANGE.contains(&speed_limit) {
            return Err(SimError::InvalidSpeedLimit(speed_limit));
        }
        let start_node = *self
            .node_indices
            .get(&from)
            .ok_or(SimError::UnknownIntersection(from))?;
        let end_node = *self
            .node_indices
            .get(&to)
            .ok_or(SimError::UnknownIntersection(to))?;

        let id = StreetId(self.graph.edge_count());
        let street = SimStreet::new(id, from, to, length, lanes, speed_limit);
        self.graph.add_edge(start_node, end_node, street);
        self.graph[start_node].add_outgoing(id);
        self.graph[end_node].add_incoming(id);
        Ok(id)
    }

    pub fn street(&self, id: StreetId) -> Option<&SimStreet> {
        self.graph.edge_weight(EdgeIndex::new(id.0))
    }

    pub(super) fn street_mut(&mut self, id: StreetId) -> Option<&mut SimStreet> {
        self.graph.edge_weight_mut(EdgeIndex::new(id.0))
    }

    pub fn intersection(&self, id: NodeId) -> Option<&SimIntersection> {
        self.node_indices.get(&id).map(|index| &self.graph[*index])
    }

    /// Street ids in ascending order
    pub fn street_ids(&self) -> impl Iterator<Item = StreetId> {
        (0..self.graph.edge_count()).map(StreetId)
    }

    pub fn streets(&self) -> impl Iterator<Item = &SimStreet> {
        self.graph.edge_weights()
    }

    /// Intersections in ascending id order
    pub fn intersections(&self) -> impl Iterator<Item = &SimIntersection> {
        self.node_indices.values().map(|index| &self.graph[*index])
    }

    pub fn street_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn intersection_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Intersection a street leads into
    pub fn end_intersection(&self, street: StreetId) -> Option<&SimIntersection> {
        self.graph
            .edge_endpoints(EdgeIndex::new(street.0))
            .map(|(_, end)| &self.graph[end])
    }

    /// Ask the intersection at the end of `incoming` where the car may go.
    /// A destination qualifies only if it admits a crossing car at its entry.
    pub fn may_cross(&self, incoming: StreetId, car: &mut SimCar) -> Option<StreetId> {
        self.end_intersection(incoming)?.may_cross(incoming, car, |target| {
            self.street(target).is_some_and(SimStreet::admits_crossing)
        })
    }

    /// Advance every intersection's clock in id order
    pub fn advance_clocks(&mut self) {
        for index in self.node_indices.values() {
            let intersection = &mut self.graph[*index];
            if intersection.advance_clock() {
                debug!(
                    "Intersection {} switched green to street {:?}",
                    intersection.id,
                    intersection.green_street()
                );
            }
        }
    }

    /// Every intersection has 1 to 4 streets in each direction and every
    /// street keeps its cars apart and within capacity
    pub fn is_valid(&self) -> bool {
        self.intersections().all(SimIntersection::is_valid)
            && self
                .streets()
                .all(|street| street.respects_min_distance() && street.within_capacity())
    }
}
