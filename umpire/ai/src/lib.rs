//! The five named AI policies for Warbots (spec.md §4.6), kept in their own
//! crate so the engine in `warbots-common` has no dependency on any
//! particular policy, the same separation the teacher draws between the
//! core game crate and its `umpire-ai` policies.

pub mod balanced;
pub mod defensive;
pub mod expansionist;
pub mod generic;
pub mod helpers;
pub mod infestor;
mod strategy;

use common::game::player::AiStrategyKind;

pub use strategy::Strategy;

pub use balanced::Balanced;
pub use defensive::Defensive;
pub use expansionist::Expansionist;
pub use generic::Generic;
pub use infestor::Infestor;

/// Resolve a player's configured policy tag to its `Strategy` implementation.
pub fn strategy_for(kind: AiStrategyKind) -> Box<dyn Strategy> {
    match kind {
        AiStrategyKind::Balanced => Box::new(Balanced),
        AiStrategyKind::Expansionist => Box::new(Expansionist),
        AiStrategyKind::Infestor => Box::new(Infestor),
        AiStrategyKind::Defensive => Box::new(Defensive),
        AiStrategyKind::Generic => Box::new(Generic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::game::player::AiStrategyKind;

    #[test]
    fn every_strategy_kind_resolves() {
        for kind in [
            AiStrategyKind::Balanced,
            AiStrategyKind::Expansionist,
            AiStrategyKind::Infestor,
            AiStrategyKind::Defensive,
            AiStrategyKind::Generic,
        ] {
            let _ = strategy_for(kind);
        }
    }
}
