//! Gift-exchange circle allocation.
//!
//! Participants are split into one international circle, interleaved so that
//! neighbours come from different countries, and one domestic circle per
//! country. Participants who cannot be placed fairly become rejects and are
//! re-homed into the circle of the other kind. Every circle is finally rotated
//! into gift links: each member gives to the next, the last to the first.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
