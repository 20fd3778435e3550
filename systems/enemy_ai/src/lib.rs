#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure decision system that runs a ship on autopilot.
//!
//! Once per simulated tick the system inspects the ship it controls and the
//! opposing ship, then emits the commands an enemy captain would issue: power
//! every affordable weapon, aim idle weapons at the most valuable system, hand
//! out spare reactor power and surrender when the hull is nearly gone.

use into_the_light_core::{
    Command, Event, PowerStep, Role, RoomId, RoomRef, RoomSnapshot, ShipSide, ShipView,
    SystemStatus, WeaponState,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Order in which opposing systems are considered as weapon targets.
pub const TARGET_PRIORITY: [Role; 9] = [
    Role::Weapons,
    Role::Shields,
    Role::Engines,
    Role::Oxygen,
    Role::Medbay,
    Role::Pilot,
    Role::Sensors,
    Role::Drones,
    Role::Doors,
];

/// Percentile above which a damaged system is passed over for the next one.
const DAMAGED_SKIP_THRESHOLD: u32 = 70;

/// Configuration parameters required to construct the enemy AI.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    seed: u64,
    resign_hull_fraction: f32,
}

impl Config {
    /// Creates a configuration from an RNG seed and the surrender threshold.
    #[must_use]
    pub const fn new(seed: u64, resign_hull_fraction: f32) -> Self {
        Self {
            seed,
            resign_hull_fraction,
        }
    }
}

/// Autopilot for one ship.
#[derive(Debug)]
pub struct EnemyAi {
    rng: ChaCha8Rng,
    resign_hull_fraction: f32,
    resign_requested: bool,
}

impl EnemyAi {
    /// Creates a new AI driven by the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            resign_hull_fraction: config.resign_hull_fraction,
            resign_requested: false,
        }
    }

    /// Consumes the events of the last step and emits commands for `own`.
    ///
    /// Decisions are only taken on steps that advanced time.
    pub fn handle(
        &mut self,
        events: &[Event],
        own: &ShipView,
        opponent: Option<&ShipView>,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }
        if own.destroyed {
            return;
        }

        self.consider_resigning(own, out);

        let Some(opponent) = opponent.filter(|opponent| !opponent.destroyed) else {
            return;
        };
        let mut budget = PowerBudget::from_view(own);
        self.arm_weapons(own, opponent, &mut budget, out);
        distribute_power(own, &mut budget, out);
    }

    fn consider_resigning(&mut self, own: &ShipView, out: &mut Vec<Command>) {
        if own.side != ShipSide::Enemy || own.resigning || self.resign_requested {
            return;
        }
        let threshold = own.max_hull as f32 * self.resign_hull_fraction;
        if own.hull > 0 && own.hull as f32 <= threshold {
            self.resign_requested = true;
            out.push(Command::ResignEnemy);
        }
    }

    /// Powers every affordable weapon and aims idle ones.
    fn arm_weapons(
        &mut self,
        own: &ShipView,
        opponent: &ShipView,
        budget: &mut PowerBudget,
        out: &mut Vec<Command>,
    ) {
        for weapon in &own.weapons {
            let mut active = weapon.state != WeaponState::Disabled;
            if !active && budget.afford_weapon(weapon.kind.spec().req_power) {
                out.push(Command::ActivateWeapon {
                    weapon: weapon.weapon,
                });
                active = true;
            }

            if active && weapon.target.is_none() {
                if let Some(room) = self.choose_target(opponent) {
                    out.push(Command::TargetRoom {
                        weapon: weapon.weapon,
                        target: RoomRef::new(opponent.side, room),
                    });
                }
            }
        }
    }

    /// Picks the opposing room to aim at.
    ///
    /// Offline systems are skipped, damaged ones are skipped some of the time,
    /// and when every system was skipped a random installed one is chosen.
    pub fn choose_target(&mut self, opponent: &ShipView) -> Option<RoomId> {
        for role in TARGET_PRIORITY {
            let Some(room) = opponent.system(role) else {
                continue;
            };
            match room.status {
                Some(SystemStatus::Offline) => continue,
                Some(SystemStatus::Damaged) => {
                    if self.rng.gen_range(0..=100) > DAMAGED_SKIP_THRESHOLD {
                        continue;
                    }
                }
                Some(SystemStatus::Nominal) | None => {}
            }
            return Some(room.id);
        }

        if opponent.systems.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..opponent.systems.len());
        Some(opponent.systems[pick].1)
    }
}

/// Local copy of the power figures, updated as commands are planned.
#[derive(Debug)]
struct PowerBudget {
    usable: u32,
    weapons: Option<(u32, u32)>,
    systems: Vec<(Role, u32, u32)>,
}

impl PowerBudget {
    fn from_view(view: &ShipView) -> Self {
        let ceiling = |room: &RoomSnapshot| room.max_power.min(room.health);
        let mut weapons = None;
        let mut systems = Vec::new();
        for (role, id) in &view.systems {
            let Some(room) = view.room(*id) else {
                continue;
            };
            if *role == Role::Weapons {
                weapons = Some((room.power, ceiling(room)));
            } else {
                systems.push((*role, room.power, ceiling(room)));
            }
        }
        Self {
            usable: view.usable_power(),
            weapons,
            systems,
        }
    }

    fn afford_weapon(&mut self, required: u32) -> bool {
        let Some((power, ceiling)) = self.weapons.as_mut() else {
            return false;
        };
        if required > self.usable || *power + required > *ceiling {
            return false;
        }
        *power += required;
        self.usable -= required;
        true
    }
}

/// Adds one bar per system in installed order, stopping at the first refusal.
fn distribute_power(own: &ShipView, budget: &mut PowerBudget, out: &mut Vec<Command>) {
    if budget.systems.is_empty() {
        return;
    }
    loop {
        for (role, power, ceiling) in &mut budget.systems {
            let bar = role.power_per_bar();
            if bar > budget.usable || *power + bar > *ceiling {
                return;
            }
            *power += bar;
            budget.usable -= bar;
            out.push(Command::ChangeSystemPower {
                ship: own.side,
                role: *role,
                step: PowerStep::Increase,
            });
        }
    }
}
