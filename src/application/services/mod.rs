//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod allocation;
mod roster;

pub use allocation::{Allocation, AllocationService, AllocationSummary, CircleKind, Rotation};
pub use roster::{sample_roster, RosterFormat, RosterService};
