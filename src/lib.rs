//! Traffic Simulation Library
//!
//! A discrete-time street traffic simulation with a file loader and a
//! line-based command shell on top.

pub mod loader;
pub mod shell;
pub mod simulation;
