pub mod observer;
pub mod queue;
pub mod resolver;

pub use observer::{ConsoleObserver, DeathObserver, FileObserver, ObserverSet};
pub use queue::{FightQueue, FightTask};
pub use resolver::{CombatResolver, DeathEvent, FightOutcome};
