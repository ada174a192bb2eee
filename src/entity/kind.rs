//! Agent kinds and the combat dominance relation
//!
//! Kinds form a closed set. Everything that depends on a kind (speed, who
//! beats whom) is a table lookup rather than per-kind behaviour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ArenaError;

/// Kind tag of an agent; fixes its combat role and movement speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AgentKind {
    Knight = 0,
    Orc = 1,
    Bear = 2,
}

impl AgentKind {
    pub const COUNT: usize = 3;

    pub const ALL: [AgentKind; AgentKind::COUNT] =
        [AgentKind::Knight, AgentKind::Orc, AgentKind::Bear];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentKind::Knight => "Knight",
            AgentKind::Orc => "Orc",
            AgentKind::Bear => "Bear",
        }
    }

    /// Maximum distance covered by one move (map units)
    pub fn move_speed(self) -> f64 {
        match self {
            AgentKind::Knight => 30.0,
            AgentKind::Orc => 20.0,
            AgentKind::Bear => 5.0,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgentKind {
    type Err = ArenaError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.label() == tag)
            .ok_or_else(|| ArenaError::UnknownKind(tag.to_string()))
    }
}

/// Kind x kind lookup: `beats(a, b)` is true when `a` can defeat `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominanceTable {
    beats: [[bool; AgentKind::COUNT]; AgentKind::COUNT],
}

impl DominanceTable {
    /// Knight beats Orc, Orc beats Bear, Bear beats Knight
    pub const STANDARD: DominanceTable = DominanceTable {
        beats: [
            // Knight vs [Knight, Orc, Bear]
            [false, true, false],
            // Orc
            [false, false, true],
            // Bear
            [true, false, false],
        ],
    };

    /// Nobody beats anybody
    pub fn empty() -> Self {
        Self {
            beats: [[false; AgentKind::COUNT]; AgentKind::COUNT],
        }
    }

    /// Each kind in `order` beats the next one; the last beats the first
    ///
    /// Duplicate kinds are ignored after their first appearance. Fewer than
    /// two distinct kinds yields an empty table.
    pub fn cyclic(order: &[AgentKind]) -> Self {
        let mut ring: Vec<AgentKind> = Vec::with_capacity(order.len());
        for &kind in order {
            if !ring.contains(&kind) {
                ring.push(kind);
            }
        }

        let mut table = Self::empty();
        if ring.len() < 2 {
            return table;
        }
        for (i, &winner) in ring.iter().enumerate() {
            let loser = ring[(i + 1) % ring.len()];
            table.beats[winner.index()][loser.index()] = true;
        }
        table
    }

    pub fn beats(&self, attacker: AgentKind, defender: AgentKind) -> bool {
        self.beats[attacker.index()][defender.index()]
    }
}

impl Default for DominanceTable {
    fn default() -> Self {
        Self::STANDARD
    }
}
