//! Template discovery, script command wiring and rendering

pub mod bridge;
pub mod dir;
pub mod helpers;
pub mod manager;
pub mod registry;

pub use bridge::*;
pub use dir::*;
pub use manager::*;
pub use registry::*;
