//! Validated agent construction and text record parsing

use rand::Rng;

use crate::core::error::{ArenaError, Result};
use crate::core::types::{MapBounds, Vec2};
use crate::entity::agent::Agent;
use crate::entity::kind::AgentKind;

/// Builds agents, rejecting unknown kinds and out-of-map coordinates
#[derive(Debug, Clone, Copy)]
pub struct AgentFactory {
    bounds: MapBounds,
}

impl AgentFactory {
    pub fn new(bounds: MapBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Construct from a kind tag, name and spawn coordinates
    ///
    /// Coordinates must lie in `(0, width] x (0, height]`.
    pub fn create(&self, kind_tag: &str, name: &str, x: f64, y: f64) -> Result<Agent> {
        let position = Vec2::new(x, y);
        if !self.bounds.accepts_spawn(position) {
            tracing::warn!(agent = name, x, y, "Rejected agent with out-of-map coordinates");
            return Err(ArenaError::InvalidCoordinates {
                name: name.to_string(),
                x,
                y,
            });
        }

        let kind = kind_tag.parse::<AgentKind>().map_err(|e| {
            tracing::warn!(agent = name, kind = kind_tag, "Rejected agent with unknown kind");
            e
        })?;

        Ok(Agent::new(name, kind, position))
    }

    /// Parse a `kind name x y` record
    pub fn parse_record(&self, line: &str) -> Result<Agent> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [kind, name, x, y] = tokens.as_slice() else {
            tracing::warn!(line, "Agent record must have exactly four fields");
            return Err(ArenaError::MalformedRecord(line.to_string()));
        };

        let (Ok(x), Ok(y)) = (x.parse::<f64>(), y.parse::<f64>()) else {
            tracing::warn!(line, "Agent record has non-numeric coordinates");
            return Err(ArenaError::MalformedRecord(line.to_string()));
        };

        self.create(kind, name, x, y)
    }

    /// Parse a block of records, one per line
    ///
    /// Blank lines and `#` comments are skipped. Bad records are logged and
    /// dropped; the rest still load.
    pub fn load_records(&self, text: &str) -> Vec<Agent> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| self.parse_record(line).ok())
            .collect()
    }

    /// Random starting population
    ///
    /// Kinds are uniform; names are numbered per kind (`Knight_1`, `Orc_1`, ...).
    pub fn populate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Agent> {
        let mut per_kind = [0usize; AgentKind::COUNT];
        let mut agents = Vec::with_capacity(count);

        for _ in 0..count {
            let kind = AgentKind::ALL[rng.gen_range(0..AgentKind::COUNT)];
            per_kind[kind.index()] += 1;
            let name = format!("{}_{}", kind, per_kind[kind.index()]);

            let x = spawn_coordinate(rng, self.bounds.width);
            let y = spawn_coordinate(rng, self.bounds.height);

            match self.create(kind.label(), &name, x, y) {
                Ok(agent) => agents.push(agent),
                Err(e) => tracing::warn!(error = %e, "Skipped generated agent"),
            }
        }

        tracing::info!(
            total = agents.len(),
            knights = per_kind[AgentKind::Knight.index()],
            orcs = per_kind[AgentKind::Orc.index()],
            bears = per_kind[AgentKind::Bear.index()],
            "Generated initial population"
        );
        agents
    }
}

/// Uniform in `[1, dim - 1]`, degrading gracefully for tiny maps
fn spawn_coordinate<R: Rng + ?Sized>(rng: &mut R, dim: f64) -> f64 {
    let hi = (dim - 1.0).max(1.0_f64.min(dim));
    let lo = 1.0_f64.min(hi);
    rng.gen_range(lo..=hi)
}
