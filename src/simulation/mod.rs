pub mod manager;
pub mod render;
pub mod scanner;

pub use manager::{GameManager, RunState};
pub use render::{DensityGrid, StatusLine, Survivor, SurvivorReport};
pub use scanner::ProximityScanner;
