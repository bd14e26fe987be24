//! # Pattern Graph Model
//!
//! Plain DTOs for tubercles and their connections. These types cross every
//! boundary: state ↔ scoring ↔ history ↔ export.
//!
//! Design rule: no I/O, no async, no caches here.

pub mod point;
pub mod edge;
pub mod calibration;

pub use point::{Point, PointId, Source};
pub use edge::{Edge, EdgeKey};
pub use calibration::{Calibration, DEFAULT_UM_PER_PIXEL};
