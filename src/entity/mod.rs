pub mod agent;
pub mod factory;
pub mod kind;

pub use agent::{Agent, DEFAULT_COMBAT_RANGE};
pub use factory::AgentFactory;
pub use kind::{AgentKind, DominanceTable};
