//! Simulation configuration with documented constants
//!
//! Every tunable of a run lives here. Values can be overridden from a TOML
//! file; fields missing from the file keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::MapBounds;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "NPC_ARENA_CONFIG";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "arena.toml";

/// Configuration for one simulation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === MAP ===
    /// Map width in map units (metres)
    pub map_width: f64,

    /// Map height in map units (metres)
    pub map_height: f64,

    // === POPULATION ===
    /// Number of agents generated at session start
    ///
    /// Kinds are drawn uniformly, so a default run starts with roughly
    /// 16-17 agents of each kind.
    pub initial_agents: usize,

    // === COMBAT ===
    /// Maximum distance at which two agents engage
    ///
    /// The fastest kind (Knight) covers up to 30 units per tick, so with a
    /// range of 10 most engagements come from agents drifting into each
    /// other rather than being spawned adjacent.
    pub combat_range: f64,

    // === PACING ===
    /// Total run length before the render worker requests a stop
    pub run_duration_secs: u64,

    /// Movement worker cadence: one move pass + one scan pass per tick
    pub movement_tick_ms: u64,

    /// Render worker cadence: one density snapshot per frame
    pub render_tick_ms: u64,

    /// A status line is emitted on every Nth render frame
    pub summary_every_frames: u32,

    /// Upper bound on how long the combat worker blocks on an empty queue
    ///
    /// Keeps shutdown responsive even if a wake-up is missed.
    pub queue_wait_ms: u64,

    // === TELEMETRY ===
    /// Side length of one density-grid cell (map units)
    pub grid_cell_size: f64,

    /// Print density snapshots and the survivor report to stdout
    pub render_snapshots: bool,

    /// Append-only death log written by the file observer
    pub log_file: PathBuf,

    // === RANDOMNESS ===
    /// Base seed for the per-worker generators
    ///
    /// Thread interleaving still makes runs non-reproducible; the seed only
    /// fixes each worker's own stream. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            map_width: 100.0,
            map_height: 100.0,

            initial_agents: 50,

            combat_range: 10.0,

            run_duration_secs: 30,
            movement_tick_ms: 100,
            render_tick_ms: 1000,
            summary_every_frames: 5,
            queue_wait_ms: 500,

            grid_cell_size: 10.0,
            render_snapshots: true,
            log_file: PathBuf::from("battle_log.txt"),

            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded simulation config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for a process run
    ///
    /// `NPC_ARENA_CONFIG` wins, then `arena.toml` in the working directory,
    /// then built-in defaults.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.map_width >= 1.0 && self.map_height >= 1.0) {
            return Err(ArenaError::Config(format!(
                "map must be at least 1x1, got {}x{}",
                self.map_width, self.map_height
            )));
        }
        if !(self.combat_range > 0.0) {
            return Err(ArenaError::Config(format!(
                "combat_range must be positive, got {}",
                self.combat_range
            )));
        }
        if !(self.grid_cell_size > 0.0) {
            return Err(ArenaError::Config(format!(
                "grid_cell_size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        if self.movement_tick_ms == 0 || self.render_tick_ms == 0 || self.queue_wait_ms == 0 {
            return Err(ArenaError::Config("tick intervals must be non-zero".into()));
        }
        if self.summary_every_frames == 0 {
            return Err(ArenaError::Config("summary_every_frames must be non-zero".into()));
        }
        Ok(())
    }

    pub fn bounds(&self) -> MapBounds {
        MapBounds::new(self.map_width, self.map_height)
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_duration_secs)
    }

    pub fn movement_tick(&self) -> Duration {
        Duration::from_millis(self.movement_tick_ms)
    }

    pub fn render_tick(&self) -> Duration {
        Duration::from_millis(self.render_tick_ms)
    }

    pub fn queue_wait(&self) -> Duration {
        Duration::from_millis(self.queue_wait_ms)
    }
}
