//! Hand-placed stone offsets.
//!
//! Every stone gets a small deterministic offset from the grid point, drawn
//! once when the stone first appears and kept for as long as the point stays
//! occupied. A bounded local relaxation pushes apart neighbours that would
//! visually overlap.

mod config;
mod field;
mod offset;
mod relax;

pub use config::JitterConfig;
pub use field::{JitterField, Occupancy};
pub use offset::Offset2D;
pub use relax::RelaxOutcome;
