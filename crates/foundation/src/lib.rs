pub mod color;
pub mod country;
pub mod math;
pub mod sentiment;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use color::*;
pub use country::*;
pub use sentiment::*;
pub use time::*;
