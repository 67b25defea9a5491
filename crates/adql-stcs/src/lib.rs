//! STC-S coordinate system and region grammar (§3 C5): used by the checker
//! to validate geometry function literals against coordinate-system and
//! geometry allow-lists.

pub mod coosys;
pub mod region;

pub use coosys::{CoordinateSystem, Flavor, Frame, RefPos};
pub use region::{parse_region, Coord, Region};
