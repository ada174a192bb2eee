//! A single simulated actor: identity, position, liveness

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{MapBounds, Vec2};
use crate::entity::kind::{AgentKind, DominanceTable};

/// Maximum distance at which two agents may engage
pub const DEFAULT_COMBAT_RANGE: f64 = 10.0;

/// Faces on the combat die
pub const DICE_SIDES: u8 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    name: String,
    kind: AgentKind,
    position: Vec2,
    alive: bool,
    move_speed: f64,
}

impl Agent {
    /// Build an agent without bounds checks
    ///
    /// Validated construction goes through `AgentFactory`.
    pub fn new(name: impl Into<String>, kind: AgentKind, position: Vec2) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            alive: true,
            move_speed: kind.move_speed(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn move_speed(&self) -> f64 {
        self.move_speed
    }

    /// Human-readable label used in death notifications
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    /// Random step of up to `move_speed` in a uniform direction, clamped to the map
    ///
    /// Dead agents stay where they fell.
    pub fn move_within<R: Rng + ?Sized>(&mut self, bounds: MapBounds, rng: &mut R) {
        if !self.alive {
            return;
        }
        let direction = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(0.0..=self.move_speed);
        self.position = bounds.clamp(self.position.polar_offset(direction, distance));
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        self.position.distance(&other.position)
    }

    pub fn is_in_killing_range(&self, other: &Agent) -> bool {
        self.is_within(other, DEFAULT_COMBAT_RANGE)
    }

    pub fn is_within(&self, other: &Agent, range: f64) -> bool {
        self.distance_to(other) <= range
    }

    pub fn can_defeat(&self, other: &Agent) -> bool {
        DominanceTable::STANDARD.beats(self.kind, other.kind)
    }

    /// One-directional combat under the standard dominance cycle
    ///
    /// Returns true when `other` was killed.
    pub fn fight<R: Rng + ?Sized>(&self, other: &mut Agent, rng: &mut R) -> bool {
        self.strike(other, &DominanceTable::STANDARD, rng)
    }

    /// One-directional combat under an explicit policy
    ///
    /// Both dice are rolled on every call; `other` dies only if this agent's
    /// kind beats it and the attack roll is strictly higher than the defence.
    pub fn strike<R: Rng + ?Sized>(
        &self,
        other: &mut Agent,
        policy: &DominanceTable,
        rng: &mut R,
    ) -> bool {
        if !self.alive || !other.alive {
            return false;
        }

        let attack = Self::roll_dice(rng);
        let defense = Self::roll_dice(rng);

        if policy.beats(self.kind, other.kind) && attack > defense {
            other.die();
            return true;
        }
        false
    }

    /// Irreversible; calling twice is harmless
    pub fn die(&mut self) {
        self.alive = false;
    }

    pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R) -> u8 {
        rng.gen_range(1..=DICE_SIDES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_creation_and_basic_properties() {
        let knight = Agent::new("Arthur", AgentKind::Knight, Vec2::new(50.0, 50.0));

        assert_eq!(knight.name(), "Arthur");
        assert_eq!(knight.kind(), AgentKind::Knight);
        assert_eq!(knight.x(), 50.0);
        assert_eq!(knight.y(), 50.0);
        assert!(knight.is_alive());
        assert_eq!(knight.move_speed(), 30.0);
        assert_eq!(knight.label(), "Arthur (Knight)");
    }

    #[test]
    fn test_killing_range_boundary() {
        let a = Agent::new("A", AgentKind::Knight, Vec2::new(0.0, 0.0));
        let near = Agent::new("B", AgentKind::Knight, Vec2::new(8.0, 0.0));
        let edge = Agent::new("C", AgentKind::Knight, Vec2::new(10.0, 0.0));
        let far = Agent::new("D", AgentKind::Knight, Vec2::new(15.0, 0.0));

        assert!(a.is_in_killing_range(&near));
        assert!(a.is_in_killing_range(&edge));
        assert!(!a.is_in_killing_range(&far));
    }

    #[test]
    fn test_same_position_is_zero_distance() {
        let a = Agent::new("K1", AgentKind::Knight, Vec2::new(50.0, 50.0));
        let b = Agent::new("K2", AgentKind::Knight, Vec2::new(50.0, 50.0));
        assert_eq!(a.distance_to(&b), 0.0);
        assert!(a.is_in_killing_range(&b));
    }

    #[test]
    fn test_move_stays_in_bounds_from_corner() {
        let bounds = MapBounds::new(100.0, 100.0);
        let mut rng = rng();
        let mut knight = Agent::new("K", AgentKind::Knight, Vec2::new(99.0, 0.0));
        for _ in 0..500 {
            knight.move_within(bounds, &mut rng);
            assert!(bounds.contains(knight.position()), "escaped to {:?}", knight.position());
        }
    }

    #[test]
    fn test_move_distance_capped_by_speed() {
        let bounds = MapBounds::new(1000.0, 1000.0);
        let mut rng = rng();
        let mut bear = Agent::new("B", AgentKind::Bear, Vec2::new(500.0, 500.0));
        for _ in 0..200 {
            let before = bear.position();
            bear.move_within(bounds, &mut rng);
            assert!(before.distance(&bear.position()) <= AgentKind::Bear.move_speed() + 1e-9);
        }
    }

    #[test]
    fn test_dead_agent_is_frozen() {
        let bounds = MapBounds::new(100.0, 100.0);
        let mut rng = rng();
        let mut knight = Agent::new("Arthur", AgentKind::Knight, Vec2::new(50.0, 50.0));

        knight.die();
        knight.die();
        assert!(!knight.is_alive());

        let before = knight.position();
        for _ in 0..10 {
            knight.move_within(bounds, &mut rng);
        }
        assert_eq!(knight.position(), before);
        assert!(!knight.is_alive());
    }

    #[test]
    fn test_dice_range() {
        let mut rng = rng();
        let mut seen = [false; DICE_SIDES as usize];
        for _ in 0..1000 {
            let roll = Agent::roll_dice(&mut rng);
            assert!((1..=DICE_SIDES).contains(&roll));
            seen[(roll - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "every face should come up");
    }

    #[test]
    fn test_fight_respects_dominance() {
        let mut rng = rng();
        let mut knight_kills = 0;
        for _ in 0..200 {
            let knight = Agent::new("K", AgentKind::Knight, Vec2::new(0.0, 0.0));
            let mut orc = Agent::new("O", AgentKind::Orc, Vec2::new(5.0, 0.0));
            if knight.fight(&mut orc, &mut rng) {
                assert!(!orc.is_alive());
                knight_kills += 1;
            }

            let orc = Agent::new("O", AgentKind::Orc, Vec2::new(5.0, 0.0));
            let mut knight = Agent::new("K", AgentKind::Knight, Vec2::new(0.0, 0.0));
            assert!(!orc.fight(&mut knight, &mut rng));
            assert!(knight.is_alive());
        }
        // P(attack > defence) = 15/36, so 200 tries land well inside (0, 200)
        assert!(knight_kills > 0 && knight_kills < 200);
    }

    #[test]
    fn test_dead_agents_do_not_fight() {
        let mut rng = rng();
        let mut bear = Agent::new("B", AgentKind::Bear, Vec2::new(0.0, 0.0));
        bear.die();
        let mut knight = Agent::new("K", AgentKind::Knight, Vec2::new(0.0, 0.0));
        for _ in 0..50 {
            assert!(!bear.fight(&mut knight, &mut rng));
        }
        assert!(knight.is_alive());
    }

    #[test]
    fn test_scenario_knight_and_orc() {
        let knight = Agent::new("Knight", AgentKind::Knight, Vec2::new(0.0, 0.0));
        let orc = Agent::new("Orc", AgentKind::Orc, Vec2::new(5.0, 0.0));

        assert!(knight.is_in_killing_range(&orc));
        assert!(orc.is_in_killing_range(&knight));
        assert!(knight.can_defeat(&orc));
        assert!(!orc.can_defeat(&knight));
        assert!(knight.is_alive() && orc.is_alive());
    }
}
