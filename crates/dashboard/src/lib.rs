pub mod config;
pub mod controller;
pub mod filter;
pub mod layout;
pub mod shortcuts;
pub mod view;

pub use config::DashboardConfig;
pub use controller::{DashboardController, SelectionState};
pub use filter::{BucketCounts, SentimentFilter};
pub use layout::PanelPlacement;
pub use view::DashboardView;
