//! # Catalog Module
//!
//! Static reference data: the CPS stages and phases, the metacognition tags
//! and response depths the backend reports.
//!
//! Everything here is compiled in and immutable at runtime. This is the single
//! authority for the stage → phase mapping; every other module derives phase
//! from a [`Stage`] instead of keeping its own table.

mod metacog;
mod stage;

pub use metacog::*;
pub use stage::*;
