pub mod camera;
pub mod countries;
pub mod globe;
pub mod marker;
pub mod picking;

pub use globe::*;
