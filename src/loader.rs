//! Loading simulation graphs from `.sim` files
//!
//! A graph directory holds three files, loaded in this order:
//!
//! - `crossings.sim`: `<node>:<green phase>t`, a green phase of 0 makes a roundabout
//! - `streets.sim`: `<from>--><to>:<length>m,<lanes>x,<speed limit>max`
//! - `cars.sim`: `<car>,<street>,<desired speed>,<acceleration>`
//!
//! Streets are numbered by their line in `streets.sim`, starting at 0. The
//! first problem found rejects the whole graph.

use anyhow::{bail, Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use crate::simulation::{
    CarId, NodeId, SimError, SimWorld, StreetId, CARS_FILE, CROSSINGS_FILE, STREETS_FILE,
};

/// One line of `crossings.sim`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingRecord {
    pub node: NodeId,
    pub green_phase: u32,
}

/// One line of `streets.sim`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub length: u32,
    pub lanes: u8,
    pub speed_limit: u32,
}

/// One line of `cars.sim`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarRecord {
    pub id: CarId,
    pub street: StreetId,
    pub desired_speed: u32,
    pub acceleration: u32,
}

/// Raw lines of the three simulation files
#[derive(Debug, Clone, Default)]
pub struct SimulationFiles {
    pub crossings: Vec<String>,
    pub streets: Vec<String>,
    pub cars: Vec<String>,
}

impl SimulationFiles {
    /// Read all three files from a graph directory
    pub fn read(dir: &Path) -> Result<Self> {
        Ok(Self {
            crossings: read_lines(&dir.join(CROSSINGS_FILE))?,
            streets: read_lines(&dir.join(STREETS_FILE))?,
            cars: read_lines(&dir.join(CARS_FILE))?,
        })
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read \"{}\"", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Read and build the graph stored in `dir`
pub fn load_world(dir: &Path) -> Result<SimWorld> {
    let files = SimulationFiles::read(dir)?;
    let world = build_world(&files)?;
    info!(
        "Loaded {}: {} intersections, {} streets, {} cars",
        dir.display(),
        world.road_network.intersection_count(),
        world.road_network.street_count(),
        world.car_count()
    );
    Ok(world)
}

/// Build a world from file contents, rejecting it unless every line is
/// accepted and the finished graph is valid
pub fn build_world(files: &SimulationFiles) -> Result<SimWorld> {
    let mut world = SimWorld::new();

    for line in &files.crossings {
        let record = parse_crossing(line)?;
        world
            .add_intersection(record.node, record.green_phase)
            .map_err(|err| describe(err, line))?;
    }

    for line in &files.streets {
        let record = parse_street(line)?;
        world
            .add_street(
                record.from,
                record.to,
                record.length,
                record.lanes,
                record.speed_limit,
            )
            .map_err(|err| describe(err, line))?;
    }

    for line in &files.cars {
        let record = parse_car(line)?;
        world
            .add_vehicle(
                record.id,
                record.street,
                record.desired_speed,
                record.acceleration,
            )
            .map_err(|err| describe(err, line))?;
    }

    if !world.is_graph_valid() {
        bail!("The graph is not valid");
    }
    Ok(world)
}

/// Turn a rejected construction step into the message shown for that line
fn describe(err: SimError, line: &str) -> anyhow::Error {
    match err {
        SimError::UnknownIntersection(node) => anyhow::anyhow!("404 Node \"{node}\" not found"),
        SimError::UnknownStreet(street) => anyhow::anyhow!("404 Street \"{street}\" not found"),
        SimError::DuplicateCar(car) => anyhow::anyhow!("A car with id {car} already exists"),
        SimError::StreetFull(street) | SimError::NoRoomAt { street, .. } => {
            anyhow::anyhow!("Street {street} is full")
        }
        SimError::DuplicateIntersection(node) => {
            anyhow::anyhow!("A node with id {node} already exists")
        }
        other => anyhow::Error::new(other).context(invalid_line(line)),
    }
}

fn invalid_line(line: &str) -> String {
    format!("\"{line}\" is not a valid line")
}

/// Parse a non-empty run of ASCII digits
fn number<T: std::str::FromStr>(field: &str, line: &str) -> Result<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        bail!(invalid_line(line));
    }
    field.parse().ok().with_context(|| invalid_line(line))
}

/// Parse `<node>:<green phase>t`
pub fn parse_crossing(line: &str) -> Result<CrossingRecord> {
    let (node, green_phase) = line
        .strip_suffix('t')
        .and_then(|rest| rest.split_once(':'))
        .with_context(|| invalid_line(line))?;

    Ok(CrossingRecord {
        node: NodeId(number(node, line)?),
        green_phase: number(green_phase, line)?,
    })
}

/// Parse `<from>--><to>:<length>m,<lanes>x,<speed limit>max`
pub fn parse_street(line: &str) -> Result<StreetRecord> {
    let (from, rest) = line.split_once("-->").with_context(|| invalid_line(line))?;
    let (to, rest) = rest.split_once(':').with_context(|| invalid_line(line))?;
    let rest = rest.strip_suffix("max").with_context(|| invalid_line(line))?;

    let fields: Vec<&str> = rest.split(',').collect();
    let [length, lanes, speed_limit] = fields.as_slice() else {
        bail!(invalid_line(line));
    };
    let length = length.strip_suffix('m').with_context(|| invalid_line(line))?;
    let lanes = lanes.strip_suffix('x').with_context(|| invalid_line(line))?;
    if !matches!(lanes, "1" | "2") {
        bail!(invalid_line(line));
    }

    Ok(StreetRecord {
        from: NodeId(number(from, line)?),
        to: NodeId(number(to, line)?),
        length: number(length, line)?,
        lanes: number(lanes, line)?,
        speed_limit: number(speed_limit, line)?,
    })
}

/// Parse `<car>,<street>,<desired speed>,<acceleration>`
pub fn parse_car(line: &str) -> Result<CarRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    let [id, street, desired_speed, acceleration] = fields.as_slice() else {
        bail!(invalid_line(line));
    };

    Ok(CarRecord {
        id: CarId(number(id, line)?),
        street: StreetId(number(street, line)?),
        desired_speed: number(desired_speed, line)?,
        acceleration: number(acceleration, line)?,
    })
}
