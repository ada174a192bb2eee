//! Proximity scanning: turns "who is near whom" into queued fight tasks
//!
//! Detection only. Nothing here rolls dice or changes liveness, so a scan can
//! run under a shared lock on every movement tick.

use crate::combat::queue::{FightQueue, FightTask};
use crate::core::types::AgentId;
use crate::entity::agent::Agent;

#[derive(Debug, Clone, Copy)]
pub struct ProximityScanner {
    range: f64,
}

impl ProximityScanner {
    pub fn new(range: f64) -> Self {
        Self { range }
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Enqueue one task per living opponent within range of `id`
    ///
    /// Returns the number of tasks pushed. A dead or unknown agent is a no-op.
    pub fn visit(&self, id: AgentId, agents: &[Agent], queue: &FightQueue) -> usize {
        let Some(agent) = agents.get(id.index()) else {
            return 0;
        };
        if !agent.is_alive() {
            return 0;
        }

        let mut pushed = 0;
        for (index, other) in agents.iter().enumerate() {
            if index == id.index() || !other.is_alive() || !agent.is_within(other, self.range) {
                continue;
            }
            queue.push(FightTask::new(id, AgentId(index)));
            pushed += 1;
        }
        pushed
    }

    /// Visit every living agent once
    ///
    /// A mutually close pair yields two tasks, one per direction.
    pub fn scan_all(&self, agents: &[Agent], queue: &FightQueue) -> usize {
        (0..agents.len())
            .map(|index| self.visit(AgentId(index), agents, queue))
            .sum()
    }
}
