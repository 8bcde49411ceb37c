//! Numeric combat rules shared by both sides of the duel

use crate::core::{Stance, TimingResult};

/// Fraction of base attack that pierces a parry made against a Flame attacker
pub const PIERCE_FACTOR: f32 = 0.3;

/// Enemy Wind auto-counter, as a fraction of enemy base attack
pub const ENEMY_COUNTER_FACTOR: f32 = 1.2;

/// Player Wind auto-counter, as a fraction of enemy base attack
pub const PLAYER_COUNTER_FACTOR: f32 = 0.5;

/// Round a raw damage value to whole hit points, halves to even.
///
/// Negative and NaN inputs saturate to 0.
pub fn round_damage(raw: f32) -> i32 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    raw.round_ties_even() as i32
}

/// Damage of an unparried basic hit
pub fn basic_damage(base_attack: f32, stance: Stance) -> i32 {
    round_damage(base_attack * stance.damage_multiplier())
}

/// Damage that still lands when a hit is parried.
///
/// Only a Flame-stance attacker pierces; everything else is fully negated.
pub fn pierce_damage(attacker_base_attack: f32, attacker_stance: Stance) -> i32 {
    if attacker_stance == Stance::Flame {
        round_damage(attacker_base_attack * PIERCE_FACTOR)
    } else {
        0
    }
}

/// Chance that the enemy parries one player hit
pub fn enemy_parry_chance(base_enemy_parry: f32, result: TimingResult) -> f32 {
    (base_enemy_parry + result.parry_bonus()).clamp(0.0, 1.0)
}

/// Whether a Wind-stance defender retaliates after the whole sequence.
///
/// Requires that the defender never successfully defended a hit, that the
/// defender is in Wind, and that the attacker is not in Stone.
pub fn wind_counter_applies(
    defender_went_undefended: bool,
    defender_stance: Stance,
    attacker_stance: Stance,
) -> bool {
    defender_went_undefended && defender_stance == Stance::Wind && attacker_stance != Stance::Stone
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_damage_halves_to_even() {
        assert_eq!(round_damage(2.4), 2);
        assert_eq!(round_damage(9.6), 10);
        assert_eq!(round_damage(4.5), 4);
        assert_eq!(round_damage(5.5), 6);
        assert_eq!(round_damage(-3.0), 0);
        assert_eq!(round_damage(f32::NAN), 0);
    }

    #[test]
    fn test_basic_damage_by_stance() {
        assert_eq!(basic_damage(10.0, Stance::Wind), 10);
        assert_eq!(basic_damage(10.0, Stance::Stone), 7);
        assert_eq!(basic_damage(10.0, Stance::Flame), 13);
        assert_eq!(basic_damage(10.0, Stance::None), 10);
        assert_eq!(basic_damage(8.0, Stance::Flame), 10);
    }

    #[test]
    fn test_pierce_only_for_flame() {
        assert_eq!(pierce_damage(10.0, Stance::Flame), 3);
        assert_eq!(pierce_damage(8.0, Stance::Flame), 2);
        assert_eq!(pierce_damage(10.0, Stance::Stone), 0);
        assert_eq!(pierce_damage(10.0, Stance::Wind), 0);
        assert_eq!(pierce_damage(10.0, Stance::None), 0);
    }

    #[test]
    fn test_parry_chance_perfect_is_base() {
        assert_eq!(enemy_parry_chance(0.10, TimingResult::Perfect), 0.10);
    }

    #[test]
    fn test_parry_chance_clamped_and_monotonic() {
        for base in [-0.5_f32, 0.0, 0.1, 0.6, 1.0, 2.0] {
            let chances: Vec<f32> = [
                TimingResult::Perfect,
                TimingResult::SmallMiss,
                TimingResult::MediumMiss,
                TimingResult::Failed,
            ]
            .iter()
            .map(|r| enemy_parry_chance(base, *r))
            .collect();

            for c in &chances {
                assert!((0.0..=1.0).contains(c), "chance {c} out of range for base {base}");
            }
            for pair in chances.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
            if base >= 0.0 {
                assert_eq!(chances[3], 1.0);
            }
        }
    }

    #[test]
    fn test_wind_counter_truth_table() {
        let stances = [Stance::None, Stance::Stone, Stance::Wind, Stance::Flame];
        for undefended in [true, false] {
            for defender in stances {
                for attacker in stances {
                    let expected =
                        undefended && defender == Stance::Wind && attacker != Stance::Stone;
                    assert_eq!(
                        wind_counter_applies(undefended, defender, attacker),
                        expected,
                        "undefended={undefended} defender={defender} attacker={attacker}"
                    );
                }
            }
        }
    }
}
