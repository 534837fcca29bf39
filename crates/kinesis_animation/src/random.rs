//! Random effect pools

use crate::event::WindowEvent;
use crate::registry::{EffectId, EffectRegistry};
use indexmap::IndexSet;
use rand::seq::SliceRandom;
use rand::Rng;
use std::str::FromStr;

/// Deduplicated set of effects `random` may resolve to for one event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RandomEffectPool {
    effects: Vec<EffectId>,
}

impl RandomEffectPool {
    /// Keep only registered effects that are allowed for `event`
    ///
    /// Unknown names are logged and skipped; duplicates keep their first
    /// position.
    pub fn build(names: &[String], event: WindowEvent, registry: &EffectRegistry) -> Self {
        let mut allowed: IndexSet<EffectId> = IndexSet::new();
        for name in names {
            let id = match EffectId::from_str(name) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!("{} random pool: {}", event.name(), err);
                    continue;
                }
            };
            let usable = id.is_concrete()
                && registry.get(id).is_some_and(|descriptor| descriptor.allows(event));
            if usable {
                allowed.insert(id);
            } else {
                tracing::debug!("{} random pool: {} not usable, skipped", event.name(), id);
            }
        }
        Self {
            effects: allowed.into_iter().collect(),
        }
    }

    pub fn effects(&self) -> &[EffectId] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Uniformly pick one effect
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<EffectId> {
        self.effects.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pool_filters_and_dedups() {
        let registry = EffectRegistry::builtin();
        let pool = RandomEffectPool::build(
            &names(&["zoom", "roll_up", "teleport", "random", "zoom", "explode"]),
            WindowEvent::Close,
            &registry,
        );
        // roll_up is shade-only
        assert_eq!(pool.effects(), &[EffectId::Zoom, EffectId::Explode]);
    }

    #[test]
    fn test_pick_is_uniform_over_pool() {
        let registry = EffectRegistry::builtin();
        let pool = RandomEffectPool::build(&names(&["fade", "zoom"]), WindowEvent::Open, &registry);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [0usize; 2];
        for _ in 0..200 {
            match pool.pick(&mut rng) {
                Some(EffectId::Fade) => seen[0] += 1,
                Some(EffectId::Zoom) => seen[1] += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }
        assert!(seen[0] > 50 && seen[1] > 50);
    }

    #[test]
    fn test_empty_pool_picks_nothing() {
        let pool = RandomEffectPool::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pool.is_empty());
        assert_eq!(pool.pick(&mut rng), None);
    }
}
