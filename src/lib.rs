//! **caves** generates cellular automaton cave maps on a square grid and describes them for
//! rendering: one fill colour per cell plus corner smoothing triangle paths.

pub mod cells;
pub mod coordinates;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod paths;
pub mod renderers;
pub mod units;
pub mod utils;
