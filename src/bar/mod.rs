//! Bar configuration and runtime state

pub mod config;
pub mod group;
pub mod instance;
pub mod layout;
pub mod margins;
pub mod mode;
pub mod position;
pub mod surface;

pub use config::BarConfig;
pub use instance::BarInstance;
pub use layout::ModuleTree;
pub use mode::{BarLayer, BarMode};
pub use position::Position;
