//! Property tests for agent geometry and movement

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use npc_arena::core::types::{MapBounds, Vec2};
use npc_arena::entity::{Agent, AgentKind};

fn kind_strategy() -> impl Strategy<Value = AgentKind> {
    prop_oneof![
        Just(AgentKind::Knight),
        Just(AgentKind::Orc),
        Just(AgentKind::Bear),
    ]
}

proptest! {
    #[test]
    fn moves_never_leave_the_map(
        kind in kind_strategy(),
        width in 1.0f64..500.0,
        height in 1.0f64..500.0,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
        seed in any::<u64>(),
        steps in 1usize..200,
    ) {
        let bounds = MapBounds::new(width, height);
        let start = bounds.clamp(Vec2::new(fx * width, fy * height));
        let mut agent = Agent::new("Walker", kind, start);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..steps {
            agent.move_within(bounds, &mut rng);
            prop_assert!(agent.x() >= 0.0 && agent.x() < width);
            prop_assert!(agent.y() >= 0.0 && agent.y() < height);
        }
    }

    #[test]
    fn distance_and_range_are_symmetric(
        ax in 0.0f64..500.0, ay in 0.0f64..500.0,
        bx in 0.0f64..500.0, by in 0.0f64..500.0,
        ka in kind_strategy(), kb in kind_strategy(),
    ) {
        let a = Agent::new("A", ka, Vec2::new(ax, ay));
        let b = Agent::new("B", kb, Vec2::new(bx, by));
        prop_assert_eq!(a.distance_to(&b), b.distance_to(&a));
        prop_assert_eq!(a.is_in_killing_range(&b), b.is_in_killing_range(&a));
    }

    #[test]
    fn death_freezes_position(kind in kind_strategy(), seed in any::<u64>()) {
        let bounds = MapBounds::new(100.0, 100.0);
        let mut agent = Agent::new("Fallen", kind, Vec2::new(50.0, 50.0));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        agent.move_within(bounds, &mut rng);
        agent.die();

        let resting = agent.position();
        for _ in 0..20 {
            agent.move_within(bounds, &mut rng);
            prop_assert!(!agent.is_alive());
        }
        prop_assert_eq!(agent.position(), resting);
    }
}
