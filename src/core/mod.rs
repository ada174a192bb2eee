pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{ArenaError, Result};
pub use types::{AgentId, MapBounds, Vec2};
