//! Textual telemetry: density snapshots, status lines, survivor report

use std::fmt;

use crate::core::types::Vec2;
use crate::entity::agent::Agent;
use crate::entity::kind::AgentKind;
use crate::spatial::grid::Grid;

/// Living-agent counts per map cell
#[derive(Debug, Clone)]
pub struct DensityGrid {
    cells: Grid<u32>,
}

impl DensityGrid {
    pub fn from_agents(agents: &[Agent], map_width: f64, map_height: f64, cell_size: f64) -> Self {
        let mut cells = Grid::covering(map_width, map_height, cell_size);
        for agent in agents.iter().filter(|a| a.is_alive()) {
            if let Some(count) = cells.sample_mut(agent.position()) {
                *count += 1;
            }
        }
        Self { cells }
    }

    pub fn columns(&self) -> usize {
        self.cells.width
    }

    pub fn rows(&self) -> usize {
        self.cells.height
    }

    pub fn count(&self, column: usize, row: usize) -> u32 {
        self.cells.get(column, row).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.cells.rows().flatten().sum()
    }
}

impl fmt::Display for DensityGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== ARENA MAP ===")?;
        writeln!(
            f,
            "Scale: 1 cell = {0}x{0} map units",
            self.cells.cell_size
        )?;
        for row in self.cells.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|&count| match count {
                    0 => ".".to_string(),
                    1..=9 => count.to_string(),
                    _ => "*".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        write!(f, "Legend: . empty, digit = agents in cell, * = ten or more")
    }
}

/// Periodic one-line summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub elapsed_secs: u64,
    pub alive: usize,
    pub fights_processed: u64,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time: {}s, alive: {}, fights: {}",
            self.elapsed_secs, self.alive, self.fights_processed
        )
    }
}

/// One surviving agent in the end-of-run roster
#[derive(Debug, Clone, PartialEq)]
pub struct Survivor {
    pub name: String,
    pub kind: AgentKind,
    pub position: Vec2,
}

/// End-of-run summary of who is still standing
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivorReport {
    by_kind: [usize; AgentKind::COUNT],
    roster: Vec<Survivor>,
}

impl SurvivorReport {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut by_kind = [0; AgentKind::COUNT];
        let roster = agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| {
                by_kind[a.kind().index()] += 1;
                Survivor {
                    name: a.name().to_string(),
                    kind: a.kind(),
                    position: a.position(),
                }
            })
            .collect();
        Self { by_kind, roster }
    }

    pub fn total(&self) -> usize {
        self.roster.len()
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.by_kind[kind.index()]
    }

    pub fn roster(&self) -> &[Survivor] {
        &self.roster
    }
}

impl fmt::Display for SurvivorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SURVIVORS ===")?;
        if self.roster.is_empty() {
            return write!(f, "No survivors!");
        }

        writeln!(f, "Total survivors: {}", self.total())?;
        let by_kind: Vec<String> = AgentKind::ALL
            .iter()
            .map(|&kind| format!("{} {}", self.count(kind), kind))
            .collect();
        writeln!(f, "By kind: {}", by_kind.join(", "))?;
        write!(f, "Roster:")?;
        for survivor in &self.roster {
            write!(
                f,
                "\n- {} ({}) at ({:.1}, {:.1})",
                survivor.name, survivor.kind, survivor.position.x, survivor.position.y
            )?;
        }
        Ok(())
    }
}
