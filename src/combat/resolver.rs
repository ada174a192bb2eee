//! Validation and mutual resolution of queued fights

use rand::Rng;

use crate::combat::queue::FightTask;
use crate::core::types::AgentId;
use crate::entity::agent::Agent;
use crate::entity::kind::DominanceTable;

/// A kill, ready to be broadcast to death observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathEvent {
    pub killer: AgentId,
    pub victim: AgentId,
    pub killer_label: String,
    pub victim_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FightOutcome {
    /// A participant died or moved away since detection; nothing happened
    Stale,
    /// Both directions were rolled; `deaths` may be empty
    Resolved { deaths: Vec<DeathEvent> },
}

impl FightOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, FightOutcome::Resolved { .. })
    }

    pub fn deaths(&self) -> &[DeathEvent] {
        match self {
            FightOutcome::Stale => &[],
            FightOutcome::Resolved { deaths } => deaths,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CombatResolver {
    policy: DominanceTable,
    range: f64,
}

impl CombatResolver {
    pub fn new(policy: DominanceTable, range: f64) -> Self {
        Self { policy, range }
    }

    pub fn standard(range: f64) -> Self {
        Self::new(DominanceTable::STANDARD, range)
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Re-validate a task against current state and resolve it
    ///
    /// The attacker strikes first; the defender strikes back only if it
    /// survived. Each direction rolls its own pair of dice.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        agents: &mut [Agent],
        task: FightTask,
        rng: &mut R,
    ) -> FightOutcome {
        let Some((attacker, defender)) = pair_mut(agents, task.attacker, task.defender) else {
            return FightOutcome::Stale;
        };

        if !attacker.is_alive() || !defender.is_alive() || !attacker.is_within(defender, self.range) {
            return FightOutcome::Stale;
        }

        let mut deaths = Vec::new();
        if attacker.strike(defender, &self.policy, rng) {
            deaths.push(DeathEvent {
                killer: task.attacker,
                victim: task.defender,
                killer_label: attacker.label(),
                victim_label: defender.label(),
            });
        }
        if defender.strike(attacker, &self.policy, rng) {
            deaths.push(DeathEvent {
                killer: task.defender,
                victim: task.attacker,
                killer_label: defender.label(),
                victim_label: attacker.label(),
            });
        }

        FightOutcome::Resolved { deaths }
    }
}

/// Two distinct mutable agents out of one slice
fn pair_mut(agents: &mut [Agent], a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
    let (a, b) = (a.index(), b.index());
    if a == b || a >= agents.len() || b >= agents.len() {
        return None;
    }
    if a < b {
        let (left, right) = agents.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = agents.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}
