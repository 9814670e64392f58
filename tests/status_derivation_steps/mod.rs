//! Step definitions for row status derivation scenarios.

pub mod world;

mod given;
mod then;
mod when;
