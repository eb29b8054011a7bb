pub mod axes;
pub mod camera;
pub mod components;
pub mod interaction;
pub mod orbit;
pub mod picking;
pub mod point_cloud;
pub mod spatial;
pub mod world;

pub use world::*;
