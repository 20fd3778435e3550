#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for Into The Light.
//!
//! The world owns the player's ship and, while a battle is running, the enemy
//! ship. Every mutation goes through [`apply`]; adapters and systems observe
//! the battle through the read-only [`query`] functions.

pub mod config;
mod crew;
mod doors;
pub mod layout;
mod navigation;
mod projectile;
mod room;
mod shield_mask;
mod ship;
mod upgrades;

use std::time::Duration;

use glam::Vec2;
use into_the_light_core::{
    Command, CrewError, CrewId, Event, PowerError, PowerStep, Role, RoomRef, ShipSide,
    TargetError, TileCoord, WeaponError, WeaponRef,
};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use config::{InventoryConfig, RoutingStrategy, SimulationConfig};
pub use layout::{
    builtin, ConfigurationError, CrewLayout, LayoutSet, RoomLayout, ShipLayout, SlotLayout,
    BUILTIN_LAYOUTS, DEFAULT_ENEMY_LAYOUT, DEFAULT_PLAYER_LAYOUT,
};

use projectile::Flight;
use ship::{Destruction, Ship};

/// Resources the player carries from battle to battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inventory {
    fuel: u32,
    missiles: u32,
    drones: u32,
    scrap: u32,
}

impl Inventory {
    /// Jump fuel.
    #[must_use]
    pub const fn fuel(&self) -> u32 {
        self.fuel
    }

    /// Missile ammunition.
    #[must_use]
    pub const fn missiles(&self) -> u32 {
        self.missiles
    }

    /// Drone parts.
    #[must_use]
    pub const fn drones(&self) -> u32 {
        self.drones
    }

    /// Scrap collected from defeated ships.
    #[must_use]
    pub const fn scrap(&self) -> u32 {
        self.scrap
    }
}

impl From<InventoryConfig> for Inventory {
    fn from(config: InventoryConfig) -> Self {
        Self {
            fuel: config.fuel,
            missiles: config.missiles,
            drones: config.drones,
            scrap: config.scrap,
        }
    }
}

/// Represents the authoritative battle state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    player: Ship,
    enemy: Option<Ship>,
    rng: ChaCha8Rng,
    paused: bool,
    inventory: Inventory,
    tick_index: u64,
}

impl World {
    /// Creates a world holding the player's ship and no enemy.
    pub fn new(config: SimulationConfig, player: &ShipLayout) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let player = Ship::assemble(ShipSide::Player, player, config.player_hull, None, &config)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            inventory: config.inventory.into(),
            config,
            player,
            enemy: None,
            paused: false,
            tick_index: 0,
        })
    }

    /// Assembles an enemy ship from the layout and starts a battle against it.
    ///
    /// An enemy that is still present is replaced.
    pub fn spawn_enemy(&mut self, layout: &ShipLayout) -> Result<(), ConfigurationError> {
        let hull = self
            .rng
            .gen_range(self.config.enemy_hull_min..=self.config.enemy_hull_max);
        let enemy = Ship::assemble(
            ShipSide::Enemy,
            layout,
            hull,
            Some(self.config.enemy_reactor_power),
            &self.config,
        )?;
        if self.enemy.is_some() {
            debug!("replacing the enemy ship before it was removed");
            let _ = self.detach_enemy();
        }
        info!("enemy `{}` spawned with {hull} hull", layout.name);
        self.enemy = Some(enemy);
        Ok(())
    }

    fn ship(&self, side: ShipSide) -> Option<&Ship> {
        match side {
            ShipSide::Player => Some(&self.player),
            ShipSide::Enemy => self.enemy.as_ref(),
        }
    }

    fn ship_mut(&mut self, side: ShipSide) -> Option<&mut Ship> {
        match side {
            ShipSide::Player => Some(&mut self.player),
            ShipSide::Enemy => self.enemy.as_mut(),
        }
    }

    /// Drops the back-reference a released weapon target left on its room.
    fn release_target(&mut self, weapon: WeaponRef, target: RoomRef) {
        if let Some(ship) = self.ship_mut(target.ship) {
            ship.forget_attacker(weapon, target);
        }
    }

    fn weapons_power(&self, side: ShipSide) -> u32 {
        self.ship(side)
            .and_then(|ship| ship.systems.get(&Role::Weapons).and_then(|id| ship.room(*id)))
            .map_or(0, room::Room::power)
    }

    /// Takes the enemy out of the battle, detaching everything that pointed at it.
    fn detach_enemy(&mut self) -> Option<Ship> {
        let enemy = self.enemy.take()?;
        let _ = self.player.drop_targets_on(ShipSide::Enemy);
        self.player
            .projectiles
            .retain(|projectile| projectile.target.ship != ShipSide::Enemy);
        for room in &mut self.player.rooms {
            room.targeted_by
                .retain(|weapon| weapon.ship != ShipSide::Enemy);
        }
        Some(enemy)
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.paused {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });
        let seconds = dt.as_secs_f32();

        let Self {
            config,
            player,
            enemy,
            rng,
            ..
        } = self;

        player.update_systems(seconds, config);
        match enemy.as_mut() {
            Some(enemy) => {
                enemy.update_systems(seconds, config);
                advance_projectiles(player, enemy, seconds, rng, config);
                advance_projectiles(enemy, player, seconds, rng, config);
            }
            None => player.projectiles.clear(),
        }

        player.update_doors(seconds);
        player.update_crew(seconds, config);
        if let Some(enemy) = enemy.as_mut() {
            enemy.update_doors(seconds);
            enemy.update_crew(seconds, config);
        }

        settle_destruction(player, enemy.as_mut(), seconds, config);
        if let Some(enemy) = enemy.as_mut() {
            settle_destruction(enemy, Some(&mut *player), seconds, config);
        }

        out_events.append(&mut player.events);
        if let Some(enemy) = enemy.as_mut() {
            out_events.append(&mut enemy.events);
        }
    }

    fn change_system_power(
        &mut self,
        side: ShipSide,
        role: Role,
        step: PowerStep,
        out_events: &mut Vec<Event>,
    ) {
        let outcome = if role == Role::Weapons {
            self.step_weapons_power(side, step, out_events)
        } else {
            match self.ship_mut(side) {
                Some(ship) => ship.step_system_power(role, step),
                None => Err(PowerError::MissingSystem),
            }
        };

        match outcome {
            Ok(power) => out_events.push(Event::PowerChanged {
                ship: side,
                role,
                power,
            }),
            Err(reason) => {
                debug!("{side:?} power request for {role:?} rejected: {reason}");
                out_events.push(Event::PowerRequestRejected {
                    ship: side,
                    role,
                    reason,
                });
            }
        }
    }

    /// Weapons power moves one weapon at a time.
    fn step_weapons_power(
        &mut self,
        side: ShipSide,
        step: PowerStep,
        out_events: &mut Vec<Event>,
    ) -> Result<u32, PowerError> {
        let ship = self.ship_mut(side).ok_or(PowerError::MissingSystem)?;
        if ship.is_destroyed() {
            return Err(PowerError::ShipDestroyed);
        }
        match step {
            PowerStep::Increase => {
                let weapon = ship
                    .first_disabled_weapon()
                    .ok_or(PowerError::NoWeaponAvailable)?;
                ship.activate_weapon(weapon).map_err(weapon_power_error)?;
                out_events.push(Event::WeaponActivated { weapon });
            }
            PowerStep::Decrease => {
                let weapon = ship.last_active_weapon().ok_or(PowerError::OutOfRange)?;
                let released = ship
                    .deactivate_weapon(weapon)
                    .map_err(weapon_power_error)?;
                if let Some(target) = released {
                    self.release_target(weapon, target);
                }
                out_events.push(Event::WeaponDeactivated { weapon });
            }
        }
        Ok(self.weapons_power(side))
    }

    fn activate_weapon(&mut self, weapon: WeaponRef, out_events: &mut Vec<Event>) -> bool {
        let outcome = self
            .ship_mut(weapon.ship)
            .ok_or(WeaponError::MissingWeapon)
            .and_then(|ship| ship.activate_weapon(weapon));
        match outcome {
            Ok(()) => {
                out_events.push(Event::WeaponActivated { weapon });
                out_events.push(Event::PowerChanged {
                    ship: weapon.ship,
                    role: Role::Weapons,
                    power: self.weapons_power(weapon.ship),
                });
                true
            }
            Err(reason) => {
                reject_weapon(weapon, reason, out_events);
                false
            }
        }
    }

    fn deactivate_weapon(&mut self, weapon: WeaponRef, out_events: &mut Vec<Event>) {
        let outcome = self
            .ship_mut(weapon.ship)
            .ok_or(WeaponError::MissingWeapon)
            .and_then(|ship| ship.deactivate_weapon(weapon));
        match outcome {
            Ok(released) => {
                if let Some(target) = released {
                    self.release_target(weapon, target);
                }
                out_events.push(Event::WeaponDeactivated { weapon });
                out_events.push(Event::PowerChanged {
                    ship: weapon.ship,
                    role: Role::Weapons,
                    power: self.weapons_power(weapon.ship),
                });
            }
            Err(reason) => reject_weapon(weapon, reason, out_events),
        }
    }

    fn select_weapon(&mut self, weapon: WeaponRef, out_events: &mut Vec<Event>) {
        let active = match self.ship(weapon.ship).and_then(|ship| ship.weapon(weapon)) {
            Some(mounted) => mounted.is_active(),
            None => {
                reject_weapon(weapon, WeaponError::MissingWeapon, out_events);
                return;
            }
        };

        if active {
            self.clear_target(weapon, out_events);
        } else if !self.activate_weapon(weapon, out_events) {
            return;
        }

        if let Some(ship) = self.ship_mut(weapon.ship) {
            ship.selected_weapon = Some(weapon);
        }
        out_events.push(Event::WeaponSelected { weapon });
    }

    fn target_room(&mut self, weapon: WeaponRef, target: RoomRef, out_events: &mut Vec<Event>) {
        match self.check_target(weapon, target) {
            Ok(previous) => {
                if let Some(previous) = previous {
                    self.release_target(weapon, previous);
                }
                if let Some(mounted) = self
                    .ship_mut(weapon.ship)
                    .and_then(|ship| ship.weapon_mut(weapon))
                {
                    mounted.target = Some(target);
                }
                if let Some(ship) = self.ship_mut(weapon.ship) {
                    if ship.selected_weapon == Some(weapon) {
                        ship.selected_weapon = None;
                    }
                }
                if let Some(ship) = self.ship_mut(target.ship) {
                    ship.mark_targeted(weapon, target.room);
                }
                out_events.push(Event::TargetAssigned { weapon, target });
            }
            Err(reason) => {
                debug!("target for {weapon:?} rejected: {reason}");
                out_events.push(Event::TargetRejected { weapon, reason });
            }
        }
    }

    /// Validates a targeting order, returning the target it replaces.
    fn check_target(
        &self,
        weapon: WeaponRef,
        target: RoomRef,
    ) -> Result<Option<RoomRef>, TargetError> {
        let mounted = self
            .ship(weapon.ship)
            .and_then(|ship| ship.weapon(weapon))
            .ok_or(TargetError::MissingWeapon)?;
        if !mounted.is_active() {
            return Err(TargetError::WeaponDisabled);
        }
        if target.ship == weapon.ship {
            return Err(TargetError::OwnShip);
        }
        let defender = self.ship(target.ship).ok_or(TargetError::MissingRoom)?;
        if defender.room(target.room).is_none() {
            return Err(TargetError::MissingRoom);
        }
        if defender.is_destroyed() {
            return Err(TargetError::ShipDestroyed);
        }
        Ok(mounted.target)
    }

    fn clear_target(&mut self, weapon: WeaponRef, out_events: &mut Vec<Event>) {
        let Some(mounted) = self
            .ship_mut(weapon.ship)
            .and_then(|ship| ship.weapon_mut(weapon))
        else {
            out_events.push(Event::TargetRejected {
                weapon,
                reason: TargetError::MissingWeapon,
            });
            return;
        };
        if let Some(previous) = mounted.target.take() {
            self.release_target(weapon, previous);
            out_events.push(Event::TargetCleared { weapon });
        }
    }

    fn fire_weapon(&mut self, weapon: WeaponRef, out_events: &mut Vec<Event>) {
        let Self {
            config,
            player,
            enemy,
            rng,
            ..
        } = self;
        let Some(enemy) = enemy.as_mut() else {
            let reason = match weapon.ship {
                ShipSide::Player => WeaponError::NoTarget,
                ShipSide::Enemy => WeaponError::MissingWeapon,
            };
            reject_weapon(weapon, reason, out_events);
            return;
        };
        let (attacker, defender) = match weapon.ship {
            ShipSide::Player => (player, enemy),
            ShipSide::Enemy => (enemy, player),
        };

        match attacker.fire_weapon(weapon, defender, rng, config) {
            Ok((target, shots)) => {
                out_events.push(Event::WeaponFired {
                    weapon,
                    target,
                    shots,
                });
                if !attacker.autofire {
                    if let Some(mounted) = attacker.weapon_mut(weapon) {
                        mounted.target = None;
                    }
                    defender.forget_attacker(weapon, target);
                    out_events.push(Event::TargetCleared { weapon });
                }
            }
            Err(reason) => reject_weapon(weapon, reason, out_events),
        }
    }

    fn move_crew(
        &mut self,
        side: ShipSide,
        crew: CrewId,
        destination: TileCoord,
        out_events: &mut Vec<Event>,
    ) {
        let config = &self.config;
        let outcome = match side {
            ShipSide::Player => self.player.move_crew(crew, destination, config),
            ShipSide::Enemy => match self.enemy.as_mut() {
                Some(enemy) => enemy.move_crew(crew, destination, config),
                None => Err(CrewError::UnknownCrew),
            },
        };
        match outcome {
            Ok(()) => out_events.push(Event::CrewMoving {
                ship: side,
                crew,
                destination,
            }),
            Err(reason) => {
                debug!("{side:?} crew order for {crew:?} rejected: {reason}");
                out_events.push(Event::CrewOrderRejected {
                    ship: side,
                    crew,
                    reason,
                });
            }
        }
    }

    fn remove_enemy(&mut self, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.detach_enemy() else {
            debug!("enemy removal requested without an enemy present");
            return;
        };
        let loot = if enemy.is_destroyed() {
            enemy.max_hull()
        } else {
            0
        };
        self.inventory.scrap = self.inventory.scrap.saturating_add(loot);
        info!("enemy removed; {loot} scrap awarded");
        out_events.push(Event::EnemyRemoved { loot });
    }
}

fn reject_weapon(weapon: WeaponRef, reason: WeaponError, out_events: &mut Vec<Event>) {
    debug!("{weapon:?} rejected: {reason}");
    out_events.push(Event::WeaponRejected { weapon, reason });
}

/// Advances every projectile the attacker has in flight toward the defender.
fn advance_projectiles(
    attacker: &mut Ship,
    defender: &mut Ship,
    dt: f32,
    rng: &mut ChaCha8Rng,
    config: &SimulationConfig,
) {
    let mut released = Vec::new();
    let mut index = 0;
    while index < attacker.projectiles.len() {
        let projectile = &mut attacker.projectiles[index];
        let flight = projectile.step(dt);

        if flight == Flight::ReachedExit {
            match defender.reveal_aim(projectile.target.room, projectile.future_pos, rng, config) {
                Some(aim) => {
                    let entry = Vec2::new(defender.entry_x(config), projectile.future_pos.y);
                    projectile.switch_screens(entry, aim);
                }
                None => {
                    warn!("projectile aimed at a missing room; dropping it");
                    projectile.hit_target = true;
                }
            }
        }

        if projectile.switched_screens
            && !projectile.missed
            && !projectile.hit_target
            && projectile.kind.absorbed_by_shields()
        {
            if let Some(remaining) = defender.try_absorb(projectile.end()) {
                projectile.hit_target = true;
                defender.events.push(Event::ShieldAbsorbed {
                    ship: defender.side,
                    remaining,
                });
            }
        }

        if flight == Flight::ReachedTarget && !projectile.hit_target {
            let room = projectile.target.room;
            if projectile.missed {
                projectile.hit_target = true;
            } else if rng.gen_range(0..100) < defender.evade(config) {
                projectile.deflect(config.miss_deflection);
                defender.events.push(Event::ProjectileMissed {
                    ship: defender.side,
                    room,
                });
            } else {
                released.extend(defender.apply_damage(room, projectile.damage));
                projectile.hit_target = true;
            }
        }

        if attacker.projectiles[index].hit_target {
            let _ = attacker.projectiles.remove(index);
        } else {
            index += 1;
        }
    }

    for (weapon, target) in released {
        attacker.forget_attacker(weapon, target);
    }
}

/// Runs the destruction check and detaches the opponent from a fresh wreck.
fn settle_destruction(
    ship: &mut Ship,
    opponent: Option<&mut Ship>,
    dt: f32,
    config: &SimulationConfig,
) {
    if ship.check_destruction(dt, config) != Destruction::JustDestroyed {
        return;
    }
    let Some(opponent) = opponent else {
        return;
    };
    for weapon in opponent.drop_targets_on(ship.side) {
        opponent.events.push(Event::TargetCleared { weapon });
    }
    opponent
        .projectiles
        .retain(|projectile| projectile.target.ship != ship.side);
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::GamePaused { paused });
            }
        }
        Command::ChangeSystemPower { ship, role, step } => {
            world.change_system_power(ship, role, step, out_events);
        }
        Command::ActivateWeapon { weapon } => {
            let _ = world.activate_weapon(weapon, out_events);
        }
        Command::DeactivateWeapon { weapon } => world.deactivate_weapon(weapon, out_events),
        Command::SelectWeapon { weapon } => world.select_weapon(weapon, out_events),
        Command::TargetRoom { weapon, target } => world.target_room(weapon, target, out_events),
        Command::ClearTarget { weapon } => world.clear_target(weapon, out_events),
        Command::FireWeapon { weapon } => world.fire_weapon(weapon, out_events),
        Command::SetAutofire { ship, enabled } => match ship {
            ShipSide::Player => {
                if world.player.autofire != enabled {
                    world.player.autofire = enabled;
                    out_events.push(Event::AutofireChanged { ship, enabled });
                }
            }
            ShipSide::Enemy => debug!("enemy ships always autofire"),
        },
        Command::MoveCrew {
            ship,
            crew,
            destination,
        } => world.move_crew(ship, crew, destination, out_events),
        Command::ToggleDoor { ship, door } => {
            match world.ship_mut(ship).and_then(|owner| owner.toggle_door(door)) {
                Some(opened) => out_events.push(Event::DoorToggled { ship, door, opened }),
                None => debug!("{ship:?} has no door {door:?}"),
            }
        }
        Command::ResignEnemy => {
            if let Some(enemy) = world.enemy.as_mut() {
                if !enemy.resigning && !enemy.is_destroyed() {
                    enemy.resigning = true;
                    info!("enemy is resigning");
                    out_events.push(Event::EnemyResigning);
                }
            }
        }
        Command::RemoveEnemy => world.remove_enemy(out_events),
    }
}

/// Translates a per-weapon failure into the weapons room power vocabulary.
fn weapon_power_error(error: WeaponError) -> PowerError {
    match error {
        WeaponError::Power(reason) => reason,
        WeaponError::ShipDestroyed => PowerError::ShipDestroyed,
        WeaponError::MissingWeapon
        | WeaponError::AlreadyActive
        | WeaponError::NotActive
        | WeaponError::NotReady
        | WeaponError::NoTarget => PowerError::NoWeaponAvailable,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use into_the_light_core::{ShipSide, ShipView};

    use super::{Inventory, SimulationConfig, World};

    /// Captures a read-only view of one ship, if it is present.
    #[must_use]
    pub fn ship_view(world: &World, side: ShipSide) -> Option<ShipView> {
        world.ship(side).map(|ship| ship.view(&world.config))
    }

    /// Reports whether an enemy ship is currently engaged.
    #[must_use]
    pub fn enemy_present(world: &World) -> bool {
        world.enemy.is_some()
    }

    /// Resources the player currently carries.
    #[must_use]
    pub fn inventory(world: &World) -> Inventory {
        world.inventory
    }

    /// Reports whether ticks are currently frozen.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use into_the_light_core::{RoomId, SlotIndex, WeaponState};

    use super::*;

    fn world_with_enemy() -> World {
        let mut world = World::new(
            SimulationConfig::default(),
            &builtin(DEFAULT_PLAYER_LAYOUT).expect("player layout"),
        )
        .expect("world");
        world
            .spawn_enemy(&builtin(DEFAULT_ENEMY_LAYOUT).expect("enemy layout"))
            .expect("enemy spawned");
        world
    }

    fn player_weapon(world: &World, index: usize) -> WeaponRef {
        world.player.weapon_refs()[index]
    }

    #[test]
    fn enemy_hull_is_drawn_from_the_configured_range() {
        let world = world_with_enemy();
        let view = query::ship_view(&world, ShipSide::Enemy).expect("enemy view");
        assert!((6..=20).contains(&view.max_hull));
        assert_eq!(view.max_power, 100);
        assert!(view.autofire);
    }

    #[test]
    fn inverted_hull_range_is_a_configuration_error() {
        let config = SimulationConfig {
            enemy_hull_min: 9,
            enemy_hull_max: 3,
            ..SimulationConfig::default()
        };
        let error = World::new(config, &builtin("scout").expect("layout")).expect_err("rejected");
        assert_eq!(error, ConfigurationError::InvalidHullRange { min: 9, max: 3 });
    }

    #[test]
    fn degenerate_tile_size_is_a_configuration_error() {
        let layout = builtin("scout").expect("layout");
        for tile_size in [0.0, -32.0, f32::NAN, f32::INFINITY] {
            let config = SimulationConfig {
                tile_size,
                ..SimulationConfig::default()
            };
            let error = World::new(config, &layout).expect_err("rejected");
            assert_eq!(error, ConfigurationError::InvalidSetting("tile_size"));
        }
    }

    #[test]
    fn non_finite_jitter_and_crew_speed_are_configuration_errors() {
        let layout = builtin("scout").expect("layout");
        let config = SimulationConfig {
            aim_jitter: f32::NAN,
            ..SimulationConfig::default()
        };
        assert_eq!(
            World::new(config, &layout).expect_err("rejected"),
            ConfigurationError::InvalidSetting("aim_jitter")
        );
        let config = SimulationConfig {
            crew_speed: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            World::new(config, &layout).expect_err("rejected"),
            ConfigurationError::InvalidSetting("crew_speed")
        );
    }

    #[test]
    fn weapon_errors_keep_their_meaning_as_power_errors() {
        assert_eq!(
            weapon_power_error(WeaponError::Power(PowerError::InsufficientPower)),
            PowerError::InsufficientPower
        );
        assert_eq!(
            weapon_power_error(WeaponError::ShipDestroyed),
            PowerError::ShipDestroyed
        );
        for error in [
            WeaponError::MissingWeapon,
            WeaponError::AlreadyActive,
            WeaponError::NotActive,
            WeaponError::NotReady,
            WeaponError::NoTarget,
        ] {
            assert_eq!(weapon_power_error(error), PowerError::NoWeaponAvailable);
        }
    }

    #[test]
    fn weapons_power_bar_activates_weapons_in_order() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ChangeSystemPower {
                ship: ShipSide::Player,
                role: Role::Weapons,
                step: PowerStep::Increase,
            },
            &mut events,
        );

        let weapon = player_weapon(&world, 0);
        assert_eq!(
            events,
            vec![
                Event::WeaponActivated { weapon },
                Event::PowerChanged {
                    ship: ShipSide::Player,
                    role: Role::Weapons,
                    power: 1,
                },
            ]
        );
    }

    #[test]
    fn targeting_records_back_reference_and_firing_clears_it_without_autofire() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        let weapon = player_weapon(&world, 1);
        let target = RoomRef::new(ShipSide::Enemy, RoomId::new(0));

        apply(&mut world, Command::ActivateWeapon { weapon }, &mut events);
        apply(&mut world, Command::TargetRoom { weapon, target }, &mut events);
        let enemy = query::ship_view(&world, ShipSide::Enemy).expect("enemy");
        assert_eq!(
            enemy.room(RoomId::new(0)).expect("room").targeted_by,
            vec![weapon]
        );

        for _ in 0..7 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
        }
        events.clear();
        apply(&mut world, Command::FireWeapon { weapon }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::WeaponFired {
                    weapon,
                    target,
                    shots: 1,
                },
                Event::TargetCleared { weapon },
            ]
        );
        let enemy = query::ship_view(&world, ShipSide::Enemy).expect("enemy");
        assert!(enemy.room(RoomId::new(0)).expect("room").targeted_by.is_empty());
    }

    #[test]
    fn targeting_requires_an_active_weapon_on_the_other_ship() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        let weapon = player_weapon(&world, 0);

        apply(
            &mut world,
            Command::TargetRoom {
                weapon,
                target: RoomRef::new(ShipSide::Enemy, RoomId::new(1)),
            },
            &mut events,
        );
        apply(&mut world, Command::ActivateWeapon { weapon }, &mut events);
        apply(
            &mut world,
            Command::TargetRoom {
                weapon,
                target: RoomRef::new(ShipSide::Player, RoomId::new(1)),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::TargetRoom {
                weapon,
                target: RoomRef::new(ShipSide::Enemy, RoomId::new(99)),
            },
            &mut events,
        );

        let reasons: Vec<TargetError> = events
            .iter()
            .filter_map(|event| match event {
                Event::TargetRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                TargetError::WeaponDisabled,
                TargetError::OwnShip,
                TargetError::MissingRoom
            ]
        );
    }

    #[test]
    fn selecting_a_disabled_weapon_activates_it() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        let weapon = player_weapon(&world, 0);

        apply(&mut world, Command::SelectWeapon { weapon }, &mut events);
        let view = query::ship_view(&world, ShipSide::Player).expect("player");
        assert_eq!(view.selected_weapon, Some(weapon));
        let snapshot = view
            .weapons
            .iter()
            .find(|snapshot| snapshot.weapon == weapon)
            .expect("weapon snapshot");
        assert_eq!(snapshot.state, WeaponState::Charging);
        assert!(events.contains(&Event::WeaponSelected { weapon }));
    }

    #[test]
    fn paused_ticks_advance_nothing() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::GamePaused { paused: true }]);
        assert_eq!(query::tick_index(&world), 0);
        assert!(query::is_paused(&world));
    }

    #[test]
    fn removing_a_living_enemy_awards_nothing() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        apply(&mut world, Command::ResignEnemy, &mut events);
        apply(&mut world, Command::ResignEnemy, &mut events);
        apply(&mut world, Command::RemoveEnemy, &mut events);
        assert_eq!(
            events,
            vec![Event::EnemyResigning, Event::EnemyRemoved { loot: 0 }]
        );
        assert!(!query::enemy_present(&world));
        assert_eq!(query::inventory(&world).scrap(), 10);
    }

    #[test]
    fn enemy_autofire_cannot_be_disabled() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetAutofire {
                ship: ShipSide::Enemy,
                enabled: false,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::ship_view(&world, ShipSide::Enemy)
            .expect("enemy")
            .autofire);
    }

    #[test]
    fn unknown_weapon_reports_missing_weapon() {
        let mut world = world_with_enemy();
        let mut events = Vec::new();
        let weapon = WeaponRef::new(ShipSide::Player, RoomId::new(0), SlotIndex::new(7));
        apply(&mut world, Command::ActivateWeapon { weapon }, &mut events);
        assert_eq!(
            events,
            vec![Event::WeaponRejected {
                weapon,
                reason: WeaponError::MissingWeapon,
            }]
        );
    }
}
