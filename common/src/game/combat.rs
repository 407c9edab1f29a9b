//! The combat resolver (spec.md §4.4): multi-party battle resolution at a
//! single tile, including fortification participation, randomized attack
//! ordering, and per-unit dice damage.

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, RngCore};
use serde::{Deserialize, Serialize};

use crate::conf;

use super::building::Building;
use super::ids::{MechId, PlayerId};
use super::mech::Mech;

/// A single entry in the resolver's detailed log, emitted as the battle
/// unfolds so a UI can replay it round by round.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum CombatLogRecord {
    Round { round: u32 },
    FortificationAttack { roll: i64, target: MechId },
    Attack { attacker: MechId, target: CombatTarget, roll: i64 },
    Destroyed { target: CombatTarget },
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum CombatTarget {
    Mech(MechId),
    Fortification,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Casualties {
    pub initial: usize,
    pub survivors: usize,
}

impl Casualties {
    pub fn lost(&self) -> usize {
        self.initial - self.survivors
    }
}

/// The outcome of resolving every conflict at one tile.
pub struct CombatOutcome {
    /// The owner left holding the tile, if any mechs remain at all.
    pub occupant: Option<PlayerId>,
    pub surviving_mechs: Vec<Mech>,
    pub fortification: Option<Building>,
    pub log: Vec<CombatLogRecord>,
    /// Casualties per participating owner, aggregated across every
    /// pair-combat in the multi-party sequence.
    pub casualties: BTreeMap<PlayerId, Casualties>,
}

/// Resolve every owner's forces at a single tile against a possibly-present
/// defender and fortification.
pub fn resolve<R: RngCore>(
    mut forces_by_owner: BTreeMap<PlayerId, Vec<Mech>>,
    mut fortification: Option<Building>,
    defender: Option<PlayerId>,
    rng: &mut R,
) -> CombatOutcome {
    let mut log = Vec::new();
    let mut casualties: BTreeMap<PlayerId, Casualties> = BTreeMap::new();

    let mut standing_owner = defender;
    let mut standing_force = defender
        .and_then(|d| forces_by_owner.remove(&d))
        .unwrap_or_default();

    let mut attacker_ids: Vec<PlayerId> = forces_by_owner.keys().copied().collect();
    attacker_ids.shuffle(rng);

    for attacker_id in attacker_ids {
        let attacker_force = forces_by_owner.remove(&attacker_id).unwrap_or_default();
        let initial_attacker = attacker_force.len();
        let initial_defender = standing_force.len();

        let result = pair_combat(attacker_force, standing_force, fortification.as_mut(), rng);
        log.extend(result.log);

        if let Some(fort) = fortification.as_ref() {
            if fort.hp <= 0 {
                fortification = None;
            }
        }

        let attacker_survivors = result.attacker_survivors;
        let defender_survivors = result.defender_survivors;

        casualties
            .entry(attacker_id)
            .or_insert_with(|| Casualties {
                initial: 0,
                survivors: 0,
            })
            .initial += initial_attacker;
        casualties.get_mut(&attacker_id).unwrap().survivors += attacker_survivors.len();

        if let Some(owner) = standing_owner {
            let entry = casualties.entry(owner).or_insert_with(|| Casualties {
                initial: 0,
                survivors: 0,
            });
            entry.initial += initial_defender;
            entry.survivors += defender_survivors.len();
        }

        if result.attacker_won {
            standing_force = attacker_survivors;
            standing_owner = Some(attacker_id);
        } else {
            standing_force = defender_survivors;
            // standing_owner unchanged
        }
    }

    let occupant = if standing_force.is_empty() {
        None
    } else {
        standing_owner
    };

    CombatOutcome {
        occupant,
        surviving_mechs: standing_force,
        fortification,
        log,
        casualties,
    }
}

struct PairCombatResult {
    attacker_survivors: Vec<Mech>,
    defender_survivors: Vec<Mech>,
    attacker_won: bool,
    log: Vec<CombatLogRecord>,
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    Attacker,
    Defender,
}

/// Run a single pair-combat between `attackers` and `defenders`, with an
/// optional fortification belonging to the defender side.
fn pair_combat<R: RngCore>(
    mut attackers: Vec<Mech>,
    mut defenders: Vec<Mech>,
    mut fortification: Option<&mut Building>,
    rng: &mut R,
) -> PairCombatResult {
    let mut log = Vec::new();

    for round in 1..=conf::MAX_COMBAT_ROUNDS {
        if attackers.is_empty() {
            break;
        }
        if defenders.is_empty() && fortification.as_ref().map_or(true, |f| f.hp <= 0) {
            break;
        }

        log.push(CombatLogRecord::Round { round });

        // 1. Fortification attacks first, if alive.
        if let Some(fort) = fortification.as_deref_mut() {
            if fort.hp > 0 {
                if let Some(target_idx) = random_alive_index(&attackers, rng) {
                    let roll = super::mech::roll_dice(rng, 2, 6);
                    let target = &mut attackers[target_idx];
                    log.push(CombatLogRecord::FortificationAttack {
                        roll,
                        target: target.id,
                    });
                    target.hp -= roll;
                    if target.hp <= 0 {
                        log.push(CombatLogRecord::Destroyed {
                            target: CombatTarget::Mech(target.id),
                        });
                    }
                }
            }
        }

        // 2. Interleave all still-alive mechs from both sides into one
        // randomly-ordered attack sequence.
        let mut order: Vec<(Side, usize)> = attackers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.hp > 0)
            .map(|(i, _)| (Side::Attacker, i))
            .chain(
                defenders
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| m.hp > 0)
                    .map(|(i, _)| (Side::Defender, i)),
            )
            .collect();
        order.shuffle(rng);

        for (side, idx) in order {
            let (roller_hp, roller_type, roller_id) = match side {
                Side::Attacker => {
                    let m = &attackers[idx];
                    (m.hp, m.mech_type, m.id)
                }
                Side::Defender => {
                    let m = &defenders[idx];
                    (m.hp, m.mech_type, m.id)
                }
            };
            if roller_hp <= 0 {
                continue; // killed earlier this round
            }

            match side {
                Side::Attacker => {
                    let fort_alive = fortification.as_ref().map_or(false, |f| f.hp > 0);
                    if fort_alive {
                        let roll = roller_type.roll_damage(rng);
                        log.push(CombatLogRecord::Attack {
                            attacker: roller_id,
                            target: CombatTarget::Fortification,
                            roll,
                        });
                        let fort = fortification.as_deref_mut().unwrap();
                        fort.hp -= roll;
                        if fort.hp <= 0 {
                            log.push(CombatLogRecord::Destroyed {
                                target: CombatTarget::Fortification,
                            });
                        }
                    } else if let Some(target_idx) = random_alive_index(&defenders, rng) {
                        let roll = roller_type.roll_damage(rng);
                        let target = &mut defenders[target_idx];
                        log.push(CombatLogRecord::Attack {
                            attacker: roller_id,
                            target: CombatTarget::Mech(target.id),
                            roll,
                        });
                        target.hp -= roll;
                        if target.hp <= 0 {
                            log.push(CombatLogRecord::Destroyed {
                                target: CombatTarget::Mech(target.id),
                            });
                        }
                    }
                }
                Side::Defender => {
                    if let Some(target_idx) = random_alive_index(&attackers, rng) {
                        let roll = roller_type.roll_damage(rng);
                        let target = &mut attackers[target_idx];
                        log.push(CombatLogRecord::Attack {
                            attacker: roller_id,
                            target: CombatTarget::Mech(target.id),
                            roll,
                        });
                        target.hp -= roll;
                        if target.hp <= 0 {
                            log.push(CombatLogRecord::Destroyed {
                                target: CombatTarget::Mech(target.id),
                            });
                        }
                    }
                }
            }
        }

        attackers.retain(|m| m.hp > 0);
        defenders.retain(|m| m.hp > 0);
        if let Some(fort) = fortification.as_deref_mut() {
            if fort.hp <= 0 {
                // hp stays at/below 0; the caller drops the Building once
                // this pair-combat returns.
            }
        }

        let fort_dead = fortification.as_ref().map_or(true, |f| f.hp <= 0);
        if attackers.is_empty() || (defenders.is_empty() && fort_dead) {
            break;
        }
    }

    let fort_dead = fortification.as_ref().map_or(true, |f| f.hp <= 0);
    let attacker_won = !attackers.is_empty() && defenders.is_empty() && fort_dead;

    if attacker_won {
        PairCombatResult {
            attacker_survivors: attackers,
            defender_survivors: defenders,
            attacker_won: true,
            log,
        }
    } else if attackers.is_empty() {
        PairCombatResult {
            attacker_survivors: attackers,
            defender_survivors: defenders,
            attacker_won: false,
            log,
        }
    } else {
        // Safety cap reached with both sides still standing: the side with
        // more remaining mechs wins; ties go to the defender.
        let attacker_wins_tiebreak = attackers.len() > defenders.len();
        PairCombatResult {
            attacker_won: attacker_wins_tiebreak,
            attacker_survivors: attackers,
            defender_survivors: defenders,
            log,
        }
    }
}

fn random_alive_index<R: RngCore>(mechs: &[Mech], rng: &mut R) -> Option<usize> {
    let alive: Vec<usize> = mechs
        .iter()
        .enumerate()
        .filter(|(_, m)| m.hp > 0)
        .map(|(i, _)| i)
        .collect();
    if alive.is_empty() {
        None
    } else {
        Some(*alive.choose(rng).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::mech::MechType;
    use rand::{rngs::StdRng, SeedableRng};

    fn mech(id: u64, owner: u64, t: MechType) -> Mech {
        Mech::new(
            MechId::new(id),
            PlayerId::new(owner),
            t,
            crate::util::Location::new(0, 0),
            format!("{}-{:04}", t, id),
        )
    }

    #[test]
    fn overwhelming_attacker_wins_and_casualties_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut forces = BTreeMap::new();
        forces.insert(
            PlayerId::new(2),
            vec![
                mech(1, 2, MechType::Heavy),
                mech(2, 2, MechType::Heavy),
                mech(3, 2, MechType::Heavy),
                mech(4, 2, MechType::Assault),
            ],
        );
        forces.insert(PlayerId::new(1), vec![mech(5, 1, MechType::Light)]);

        let outcome = resolve(forces, None, Some(PlayerId::new(1)), &mut rng);

        let total_initial: usize = outcome.casualties.values().map(|c| c.initial).sum();
        let total_survivors: usize = outcome.casualties.values().map(|c| c.survivors).sum();
        assert!(total_survivors <= total_initial);
        assert_eq!(outcome.occupant, Some(PlayerId::new(2)));
    }

    #[test]
    fn fortification_hp_never_exceeds_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut forces = BTreeMap::new();
        forces.insert(PlayerId::new(2), vec![mech(1, 2, MechType::Heavy)]);
        let fort = Building::new(
            super::super::ids::BuildingId::new(1),
            super::super::ids::PlanetId::new(1),
            super::super::building::BuildingType::Fortification,
        );
        let outcome = resolve(forces, Some(fort), None, &mut rng);
        if let Some(f) = outcome.fortification {
            assert!(f.hp > 0 && f.hp <= conf::FORTIFICATION_MAX_HP);
        }
    }
}
