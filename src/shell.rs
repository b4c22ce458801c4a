//! Line-based command shell
//!
//! Commands are a word and one parameter separated by a single space:
//!
//! - `load <dir>` replaces the current graph with the one stored in `dir`
//! - `simulate <ticks>` advances the current graph
//! - `position <car>` prints where a car is
//! - `quit` ends the session
//!
//! Failures never end the session; they are reported as `Error: <message>`.

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::loader;
use crate::simulation::{CarId, SimWorld};

/// What the session should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Holds the graph the commands operate on
#[derive(Default)]
pub struct Shell {
    world: Option<SimWorld>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a graph already in place
    pub fn with_world(world: SimWorld) -> Self {
        Self { world: Some(world) }
    }

    pub fn world(&self) -> Option<&SimWorld> {
        self.world.as_ref()
    }

    /// Load a graph directory. On failure the previous graph stays current.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        let world = loader::load_world(dir)?;
        self.world = Some(world);
        Ok(())
    }

    /// Run one command line, writing its output to `out`
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let parts: Vec<&str> = line.split(' ').collect();
        match parts.as_slice() {
            ["quit"] => return Ok(Flow::Quit),
            ["load", dir] => {
                self.load(Path::new(dir))?;
                writeln!(out, "READY")?;
            }
            ["simulate", ticks] => {
                let ticks: u64 = parameter(ticks)?;
                let world = self.loaded_mut()?;
                world.simulate(ticks);
                info!("Simulated {ticks} ticks, now at tick {}", world.ticks());
                writeln!(out, "READY")?;
            }
            ["position", car] => {
                let id = CarId(parameter(car)?);
                let world = self.loaded_mut()?;
                let car = world
                    .car(id)
                    .ok_or_else(|| anyhow!("There is no car with the identifier {id}"))?;
                writeln!(
                    out,
                    "Car {} on street {} with speed {} and position {}",
                    car.id, car.street, car.speed, car.position
                )?;
            }
            _ => bail!("\"{line}\" is not a valid command"),
        }
        Ok(Flow::Continue)
    }

    /// Read commands until `quit` or end of input
    pub fn run(
        &mut self,
        input: impl BufRead,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> Result<()> {
        for line in input.lines() {
            let line = line.context("Could not read command")?;
            match self.execute(line.trim_end_matches('\r'), out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(error) => {
                    warn!("Command \"{line}\" failed: {error:#}");
                    writeln!(err, "Error: {error}")?;
                }
            }
            out.flush()?;
        }
        Ok(())
    }

    fn loaded_mut(&mut self) -> Result<&mut SimWorld> {
        self.world
            .as_mut()
            .context("There is no graph currently loaded. Please load a graph first")
    }
}

fn parameter<T: std::str::FromStr>(raw: &str) -> Result<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        bail!("\"{raw}\" is not a valid parameter");
    }
    raw.parse()
        .ok()
        .with_context(|| format!("\"{raw}\" is not a valid parameter"))
}
