//! Enemy decision policy
//!
//! Weighted-random pattern selection and the rare stance change that
//! replaces an attack.

use crate::config::PolicyConfig;
use crate::core::{EnemyPattern, Stance};
use rand::Rng;

/// Stateless policy; randomness comes from the caller's RNG
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDecisionPolicy {
    pattern1_weight: f32,
    pattern2_weight: f32,
    stance_change_chance: f32,
}

impl EnemyDecisionPolicy {
    pub fn new(config: &PolicyConfig) -> Self {
        EnemyDecisionPolicy {
            pattern1_weight: config.pattern1_weight,
            pattern2_weight: config.pattern2_weight,
            stance_change_chance: config.stance_change_chance,
        }
    }

    /// Map a uniform draw in `[0, 1)` to a pattern. Whatever the first two
    /// weights leave over goes to Pattern3.
    pub fn pattern_for_draw(&self, r: f32) -> EnemyPattern {
        if r < self.pattern1_weight {
            EnemyPattern::Pattern1
        } else if r < self.pattern1_weight + self.pattern2_weight {
            EnemyPattern::Pattern2
        } else {
            EnemyPattern::Pattern3
        }
    }

    pub fn decide_pattern<R: Rng + ?Sized>(&self, rng: &mut R) -> EnemyPattern {
        let r: f32 = rng.gen();
        self.pattern_for_draw(r)
    }

    /// Roll for a stance change. On success returns the new stance, drawn
    /// uniformly from the stances other than `current`.
    pub fn try_change_stance<R: Rng + ?Sized>(&self, current: Stance, rng: &mut R) -> Option<Stance> {
        let r: f32 = rng.gen();
        if r >= self.stance_change_chance {
            return None;
        }
        let candidates = current.alternatives();
        let index = rng.gen_range(0..candidates.len());
        Some(candidates[index])
    }
}

impl Default for EnemyDecisionPolicy {
    fn default() -> Self {
        EnemyDecisionPolicy::new(&PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_draw_half_selects_pattern2() {
        let policy = EnemyDecisionPolicy::default();
        assert_eq!(policy.pattern_for_draw(0.50), EnemyPattern::Pattern2);
    }

    #[test]
    fn test_draw_boundaries() {
        let policy = EnemyDecisionPolicy::default();
        assert_eq!(policy.pattern_for_draw(0.0), EnemyPattern::Pattern1);
        assert_eq!(policy.pattern_for_draw(0.44), EnemyPattern::Pattern1);
        assert_eq!(policy.pattern_for_draw(0.45), EnemyPattern::Pattern2);
        assert_eq!(policy.pattern_for_draw(0.89), EnemyPattern::Pattern2);
        assert_eq!(policy.pattern_for_draw(0.95), EnemyPattern::Pattern3);
    }

    #[test]
    fn test_weights_not_summing_to_one() {
        let policy = EnemyDecisionPolicy::new(&PolicyConfig {
            pattern1_weight: 0.2,
            pattern2_weight: 0.2,
            stance_change_chance: 0.0,
        });
        assert_eq!(policy.pattern_for_draw(0.5), EnemyPattern::Pattern3);
    }

    #[test]
    fn test_pattern_distribution_roughly_matches_weights() {
        let policy = EnemyDecisionPolicy::default();
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            match policy.decide_pattern(&mut rng) {
                EnemyPattern::Pattern1 => counts[0] += 1,
                EnemyPattern::Pattern2 => counts[1] += 1,
                EnemyPattern::Pattern3 => counts[2] += 1,
            }
        }
        assert!((4000..5000).contains(&counts[0]), "{counts:?}");
        assert!((4000..5000).contains(&counts[1]), "{counts:?}");
        assert!((600..1400).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn test_stance_change_never_repeats_current() {
        let policy = EnemyDecisionPolicy::new(&PolicyConfig {
            stance_change_chance: 1.0,
            ..PolicyConfig::default()
        });
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for current in Stance::CHOOSABLE {
            for _ in 0..50 {
                let next = policy.try_change_stance(current, &mut rng).unwrap();
                assert_ne!(next, current);
                assert!(next.is_choosable());
            }
        }
    }

    #[test]
    fn test_stance_change_disabled() {
        let policy = EnemyDecisionPolicy::new(&PolicyConfig {
            stance_change_chance: 0.0,
            ..PolicyConfig::default()
        });
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        for _ in 0..1000 {
            assert_eq!(policy.try_change_stance(Stance::Wind, &mut rng), None);
        }
    }

    #[test]
    fn test_stance_change_rate() {
        let policy = EnemyDecisionPolicy::default();
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let changes = (0..20_000)
            .filter(|_| policy.try_change_stance(Stance::None, &mut rng).is_some())
            .count();
        assert!((700..1300).contains(&changes), "{changes} changes");
    }
}
