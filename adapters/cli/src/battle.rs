//! Headless battle between two autopiloted ships.

use std::time::Duration;

use into_the_light_core::{Command, Event, ShipSide};
use into_the_light_system_enemy_ai::{Config as AiConfig, EnemyAi};
use into_the_light_system_fire_control::FireControl;
use into_the_light_world::{self as world, query, World};
use log::{debug, info, trace};

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The enemy wreck was removed and its loot awarded.
    EnemyDefeated {
        /// Scrap awarded for the wreck.
        loot: u32,
    },
    /// The player's hull was depleted.
    PlayerDestroyed,
    /// The tick limit was reached with both ships still fighting.
    TimeLimit,
}

/// Autopilot and fire control flying one ship.
#[derive(Debug)]
struct Pilot {
    side: ShipSide,
    ai: EnemyAi,
    fire_control: FireControl,
}

impl Pilot {
    fn new(side: ShipSide, seed: u64, resign_hull_fraction: f32) -> Self {
        Self {
            side,
            ai: EnemyAi::new(AiConfig::new(seed, resign_hull_fraction)),
            fire_control: FireControl::new(),
        }
    }

    /// Reacts to the events of the last tick, appending the feedback to `out`.
    fn steer(&mut self, world: &mut World, trigger: &[Event], out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        if let Some(own) = query::ship_view(world, self.side) {
            let opponent = query::ship_view(world, self.side.opponent());
            self.ai
                .handle(trigger, &own, opponent.as_ref(), &mut commands);
        }
        for command in commands.drain(..) {
            world::apply(world, command, out);
        }

        if let Some(own) = query::ship_view(world, self.side) {
            let opponent = query::ship_view(world, self.side.opponent());
            self.fire_control
                .handle(&own, opponent.as_ref(), &mut commands);
        }
        for command in commands {
            world::apply(world, command, out);
        }
    }
}

/// Battle driven tick by tick until one side falls.
#[derive(Debug)]
pub(crate) struct Battle {
    world: World,
    pilots: [Pilot; 2],
    ticks: u32,
}

impl Battle {
    /// Wraps a world holding both ships; pilots are seeded from its configuration.
    pub(crate) fn new(world: World) -> Self {
        let config = query::config(&world);
        let seed = config.seed;
        let resign = config.resign_hull_fraction;
        Self {
            pilots: [
                Pilot::new(ShipSide::Player, seed.wrapping_add(1), resign),
                Pilot::new(ShipSide::Enemy, seed.wrapping_add(2), resign),
            ],
            world,
            ticks: 0,
        }
    }

    /// Read-only access to the simulated world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Number of ticks simulated so far.
    pub(crate) fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Runs up to `limit` ticks of `dt` and reports the outcome.
    pub(crate) fn run(&mut self, limit: u32, dt: Duration) -> Outcome {
        while self.ticks < limit {
            if let Some(outcome) = self.step(dt) {
                return outcome;
            }
        }
        Outcome::TimeLimit
    }

    /// Advances one tick and lets both pilots react.
    fn step(&mut self, dt: Duration) -> Option<Outcome> {
        self.ticks += 1;
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut feedback = Vec::new();
        for pilot in &mut self.pilots {
            pilot.steer(&mut self.world, &events, &mut feedback);
        }
        events.append(&mut feedback);

        let mut outcome = None;
        for event in &events {
            log_event(self.ticks, event);
            match event {
                Event::ShipDestroyed {
                    ship: ShipSide::Player,
                } => outcome = Some(Outcome::PlayerDestroyed),
                Event::RemoveEnemy => outcome = Some(self.remove_enemy()),
                _ => {}
            }
        }
        outcome
    }

    fn remove_enemy(&mut self) -> Outcome {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::RemoveEnemy, &mut events);
        let loot = events
            .iter()
            .find_map(|event| match event {
                Event::EnemyRemoved { loot } => Some(*loot),
                _ => None,
            })
            .unwrap_or(0);
        Outcome::EnemyDefeated { loot }
    }
}

fn log_event(tick: u32, event: &Event) {
    match event {
        Event::ShipDestroyed { .. } | Event::EnemyResigning => info!("tick {tick}: {event:?}"),
        Event::WeaponFired { .. }
        | Event::TookDamage { .. }
        | Event::SystemDamaged { .. }
        | Event::ProjectileMissed { .. } => debug!("tick {tick}: {event:?}"),
        Event::TimeAdvanced { .. } => {}
        _ => trace!("tick {tick}: {event:?}"),
    }
}

#[cfg(test)]
mod tests {
    use into_the_light_core::WeaponState;
    use into_the_light_world::{builtin, SimulationConfig};

    use super::*;

    fn battle(seed: u64) -> Battle {
        let config = SimulationConfig {
            seed,
            ..SimulationConfig::default()
        };
        let mut world = World::new(config, &builtin("scout").expect("scout")).expect("world");
        world
            .spawn_enemy(&builtin("cruiser").expect("cruiser"))
            .expect("enemy");
        Battle::new(world)
    }

    #[test]
    fn a_single_tick_hits_the_time_limit() {
        let mut battle = battle(1);
        assert_eq!(
            battle.run(1, Duration::from_millis(100)),
            Outcome::TimeLimit
        );
        assert_eq!(battle.ticks(), 1);
        assert_eq!(query::tick_index(battle.world()), 1);
    }

    #[test]
    fn first_tick_arms_and_aims_both_ships() {
        let mut battle = battle(7);
        let _ = battle.run(1, Duration::from_millis(100));

        for side in [ShipSide::Player, ShipSide::Enemy] {
            let view = query::ship_view(battle.world(), side).expect("ship");
            assert!(view.current_power <= view.max_power);
            assert!(view.weapons.iter().any(|weapon| {
                weapon.state != WeaponState::Disabled
                    && weapon.target.map(|target| target.ship) == Some(side.opponent())
            }));
        }
    }

    #[test]
    fn identical_seeds_fight_identical_battles() {
        let run = |seed| {
            let mut battle = battle(seed);
            let outcome = battle.run(2_000, Duration::from_millis(100));
            (
                outcome,
                battle.ticks(),
                query::ship_view(battle.world(), ShipSide::Player),
                query::inventory(battle.world()).scrap(),
            )
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn defeated_enemy_awards_its_hull_as_loot() {
        let mut battle = battle(3);
        let max_hull = query::ship_view(battle.world(), ShipSide::Enemy)
            .expect("enemy")
            .max_hull;
        let scrap = query::inventory(battle.world()).scrap();

        if let Outcome::EnemyDefeated { loot } = battle.run(20_000, Duration::from_millis(100)) {
            assert_eq!(loot, max_hull);
            assert_eq!(query::inventory(battle.world()).scrap(), scrap + loot);
            assert!(!query::enemy_present(battle.world()));
        }
    }
}
