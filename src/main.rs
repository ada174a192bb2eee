//! NPC Arena - Entry Point
//!
//! Sets up logging and the death observers, generates the population, waits
//! for confirmation, then runs one session to completion.

use std::io::{self, Write};
use std::sync::Arc;

use npc_arena::combat::observer::{ConsoleObserver, FileObserver, ObserverSet};
use npc_arena::core::config::SimulationConfig;
use npc_arena::core::error::Result;
use npc_arena::simulation::GameManager;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("npc_arena=info")),
        )
        .init();

    let config = SimulationConfig::from_env()?;

    println!("=== NPC ARENA ===");
    println!("Knights beat Orcs, Orcs beat Bears, Bears beat Knights.");
    println!();
    println!("Parameters:");
    println!("- Map: {}x{}", config.map_width, config.map_height);
    println!("- Initial agents: {}", config.initial_agents);
    println!("- Combat range: {}", config.combat_range);
    println!("- Duration: {} seconds", config.run_duration_secs);
    println!("- Death log: {}", config.log_file.display());

    let observers = build_observers(&config);
    let mut game = GameManager::new(config, observers)?;

    print!("\nPress Enter to start...");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    game.run()?;

    println!("\nGame over. Deaths were recorded in the log.");
    Ok(())
}

/// Console always; the file log only if it can be opened
fn build_observers(config: &SimulationConfig) -> ObserverSet {
    let mut observers = ObserverSet::new().with(Arc::new(ConsoleObserver::new()));
    match FileObserver::open(&config.log_file) {
        Ok(file) => observers.push(Arc::new(file)),
        Err(e) => tracing::warn!(
            path = %config.log_file.display(),
            error = %e,
            "Death log unavailable, continuing with console only"
        ),
    }
    observers
}
