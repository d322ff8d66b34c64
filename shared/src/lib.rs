pub mod area;
pub mod region;

pub use area::*;
pub use region::{Feature, FeatureCollection, Geometry, Position};
