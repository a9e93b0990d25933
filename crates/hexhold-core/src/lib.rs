mod city;
mod grid;
pub mod mapgen;
mod path;
mod rng;
mod terrain;
mod unit;
mod world;

pub use crate::city::*;
pub use crate::grid::*;
pub use crate::mapgen::HeightField;
pub use crate::path::*;
pub use crate::rng::*;
pub use crate::terrain::*;
pub use crate::unit::*;
pub use crate::world::*;
