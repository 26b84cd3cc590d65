//! Domain layer: participants, circles and the fair interleaver
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod circle;
pub mod entities;
pub mod error;
pub mod interleave;

pub use circle::{rotate, Circle, DomesticCircle, InternationalCircle};
pub use entities::*;
pub use error::DomainError;
pub use interleave::{FairInterleaver, Interleaved, NonLargestPick};
