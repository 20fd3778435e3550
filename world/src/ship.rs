//! Ship aggregate: rooms, doors, crew, projectiles and the per-tick event queue.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use into_the_light_core::{
    CrewError, CrewId, DoorId, Event, Orientation, PixelPoint, PowerError, PowerStep, Role, RoomId,
    RoomRef, ShieldKind, ShieldSnapshot, ShipSide, ShipView, SlotIndex, ThrusterSnapshot,
    TileCoord, WeaponError, WeaponRef, WeaponSnapshot, WeaponState,
};
use log::{debug, info, warn};
use rand::Rng;

use crate::{
    config::SimulationConfig,
    crew::{Crewmate, Stride},
    doors::{build_doors, Door},
    layout::{ConfigurationError, ShipLayout, Upgrade},
    navigation::find_path,
    projectile::Projectile,
    room::{Room, Tile},
    shield_mask::ShieldMask,
    upgrades::{mount_point, Shield, Thruster, UpgradeSlot, Weapon},
};

/// Weapon whose target was dropped, paired with the room it aimed at.
pub(crate) type ReleasedTarget = (WeaponRef, RoomRef);

/// Outcome of the per-tick destruction check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Destruction {
    Intact,
    JustDestroyed,
    Wrecked,
    RemovalDue,
}

#[derive(Clone, Debug)]
pub(crate) struct Ship {
    pub(crate) side: ShipSide,
    layout: String,
    pub(crate) rooms: Vec<Room>,
    /// Installed systems; iteration order is the power bar priority order.
    pub(crate) systems: BTreeMap<Role, RoomId>,
    pub(crate) doors: Vec<Door>,
    pub(crate) crew: Vec<Crewmate>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) events: Vec<Event>,
    shield: Option<(RoomId, SlotIndex)>,
    hull: u32,
    max_hull: u32,
    max_power: u32,
    destroyed: bool,
    wreck_timer: f32,
    removal_requested: bool,
    pub(crate) resigning: bool,
    pub(crate) autofire: bool,
    pub(crate) selected_weapon: Option<WeaponRef>,
    bounds: (Vec2, Vec2),
}

impl Ship {
    /// Builds a ship from a validated layout.
    ///
    /// `reactor` overrides the engine-derived reactor output.
    pub(crate) fn assemble(
        side: ShipSide,
        layout: &ShipLayout,
        hull: u32,
        reactor: Option<u32>,
        config: &SimulationConfig,
    ) -> Result<Self, ConfigurationError> {
        layout.validate()?;
        let tile_size = config.tile_size;

        let mut rooms = Vec::with_capacity(layout.rooms.len());
        let mut systems = BTreeMap::new();
        for (index, template) in layout.rooms.iter().enumerate() {
            let id = RoomId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if let Some(role) = template.role {
                let _ = systems.insert(role, id);
            }
            rooms.push(Room::new(
                id,
                template.rect(),
                template.role,
                template.effective_level(),
                template.tile_coords(),
            ));
        }

        let bounds = rooms
            .iter()
            .map(|room| room.pixel_bounds(tile_size))
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
            .ok_or(ConfigurationError::EmptyRoom { room: 0 })?;
        let mask = ShieldMask::enclosing(bounds.0, bounds.1, config.shield_margin);

        let mut shield = None;
        for (room, template) in rooms.iter_mut().zip(&layout.rooms) {
            let (min, max) = room.pixel_bounds(tile_size);
            for slot in &template.slots {
                let mount = mount_point(min, max, slot.orientation);
                let mounted = match slot.resolve()? {
                    None => UpgradeSlot::Empty {
                        orientation: slot.orientation,
                    },
                    Some(Upgrade::Weapon(kind)) => {
                        UpgradeSlot::Weapon(Weapon::new(kind, slot.orientation, mount))
                    }
                    Some(Upgrade::Thruster(kind)) => UpgradeSlot::Thruster(Thruster {
                        kind,
                        orientation: slot.orientation,
                        mount,
                    }),
                    Some(Upgrade::Shield(kind)) => {
                        UpgradeSlot::Shield(Shield::new(kind, slot.orientation, mask.clone()))
                    }
                };
                if shield.is_none() && matches!(mounted, UpgradeSlot::Shield(_)) {
                    shield = Some((room.id, slot_index(room.slots.len())));
                }
                room.slots.push(mounted);
            }
        }

        if shield.is_none() {
            if let Some(&room_id) = systems.get(&Role::Shields) {
                let room = &mut rooms[room_id.get() as usize];
                shield = Some((room_id, slot_index(room.slots.len())));
                room.slots.push(UpgradeSlot::Shield(Shield::new(
                    ShieldKind::ShieldMk1,
                    Orientation::Right,
                    mask,
                )));
            }
        }

        let doors = build_doors(&mut rooms, tile_size);

        let max_power = match reactor {
            Some(power) => power,
            None => systems
                .get(&Role::Engines)
                .map(|room| rooms[room.get() as usize].level)
                .ok_or(ConfigurationError::MissingEngines)?
                .saturating_mul(config.reactor_power_per_engine_level),
        };

        let mut crew = Vec::with_capacity(layout.crew.len());
        for (index, member) in layout.crew.iter().enumerate() {
            let room = rooms
                .get_mut(member.room)
                .ok_or_else(|| ConfigurationError::UnknownCrewRoom(member.name.clone()))?;
            let tile = room
                .first_free_tile()
                .ok_or_else(|| ConfigurationError::CrowdedCrewRoom(member.name.clone()))?;
            if let Some(held) = room.tile_mut(tile) {
                held.occupied = true;
            }
            crew.push(Crewmate::stationed(
                CrewId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                member.name.clone(),
                member.race,
                tile,
                tile_size,
            ));
        }

        Ok(Self {
            side,
            layout: layout.name.clone(),
            rooms,
            systems,
            doors,
            crew,
            projectiles: Vec::new(),
            events: Vec::new(),
            shield,
            hull,
            max_hull: hull,
            max_power,
            destroyed: false,
            wreck_timer: 0.0,
            removal_requested: false,
            resigning: false,
            autofire: side == ShipSide::Enemy,
            selected_weapon: None,
            bounds,
        })
    }

    pub(crate) const fn max_hull(&self) -> u32 {
        self.max_hull
    }

    pub(crate) const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.get() as usize)
    }

    fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id.get() as usize)
    }

    fn room_power(&self, role: Role) -> u32 {
        self.systems
            .get(&role)
            .and_then(|id| self.room(*id))
            .map_or(0, Room::power)
    }

    pub(crate) fn current_power(&self) -> u32 {
        self.rooms.iter().map(Room::power).sum()
    }

    pub(crate) fn usable_power(&self) -> u32 {
        self.max_power.saturating_sub(self.current_power())
    }

    /// Chance out of 100 to dodge an incoming projectile.
    pub(crate) fn evade(&self, config: &SimulationConfig) -> u32 {
        let engines = self.room_power(Role::Engines);
        if engines == 0 || self.destroyed {
            0
        } else {
            config.evade_base + config.evade_per_engine_power * engines
        }
    }

    /// Sets a room's power after checking capacity, health and reactor slack.
    pub(crate) fn try_set_power(&mut self, id: RoomId, value: u32) -> Result<(), PowerError> {
        if self.destroyed {
            return Err(PowerError::ShipDestroyed);
        }
        let usable = self.usable_power();
        let room = self.room_mut(id).ok_or(PowerError::MissingSystem)?;
        room.check_power(value, usable)?;
        room.commit_power(value);
        if room.role == Some(Role::Shields) {
            if value == 0 {
                self.reset_shield();
            } else {
                self.clamp_shield();
            }
        }
        Ok(())
    }

    /// Moves a non-weapon system by one bar, returning its new power.
    pub(crate) fn step_system_power(
        &mut self,
        role: Role,
        step: PowerStep,
    ) -> Result<u32, PowerError> {
        if self.destroyed {
            return Err(PowerError::ShipDestroyed);
        }
        let id = *self.systems.get(&role).ok_or(PowerError::MissingSystem)?;
        let current = self.room(id).map_or(0, Room::power);
        let bar = role.power_per_bar();
        let value = match step {
            PowerStep::Increase => current + bar,
            PowerStep::Decrease => current.checked_sub(bar).ok_or(PowerError::OutOfRange)?,
        };
        self.try_set_power(id, value)?;
        Ok(value)
    }

    pub(crate) fn weapon_refs(&self) -> Vec<WeaponRef> {
        let mut refs = Vec::new();
        for room in &self.rooms {
            for (index, slot) in room.slots.iter().enumerate() {
                if slot.weapon().is_some() {
                    refs.push(WeaponRef::new(self.side, room.id, slot_index(index)));
                }
            }
        }
        refs
    }

    pub(crate) fn weapon(&self, weapon: WeaponRef) -> Option<&Weapon> {
        if weapon.ship != self.side {
            return None;
        }
        self.room(weapon.room)?
            .slots
            .get(weapon.slot.get() as usize)?
            .weapon()
    }

    pub(crate) fn weapon_mut(&mut self, weapon: WeaponRef) -> Option<&mut Weapon> {
        if weapon.ship != self.side {
            return None;
        }
        self.room_mut(weapon.room)?
            .slots
            .get_mut(weapon.slot.get() as usize)?
            .weapon_mut()
    }

    pub(crate) fn first_disabled_weapon(&self) -> Option<WeaponRef> {
        self.weapon_refs()
            .into_iter()
            .find(|weapon| self.weapon(*weapon).is_some_and(|w| !w.is_active()))
    }

    pub(crate) fn last_active_weapon(&self) -> Option<WeaponRef> {
        self.weapon_refs()
            .into_iter()
            .rev()
            .find(|weapon| self.weapon(*weapon).is_some_and(Weapon::is_active))
    }

    /// Draws the weapon's power from the weapons room and starts charging.
    pub(crate) fn activate_weapon(&mut self, weapon: WeaponRef) -> Result<(), WeaponError> {
        if self.destroyed {
            return Err(WeaponError::ShipDestroyed);
        }
        let mounted = self.weapon(weapon).ok_or(WeaponError::MissingWeapon)?;
        if mounted.is_active() {
            return Err(WeaponError::AlreadyActive);
        }
        let required = mounted.spec().req_power;
        let room = *self
            .systems
            .get(&Role::Weapons)
            .ok_or(WeaponError::Power(PowerError::MissingSystem))?;
        let value = self.room_power(Role::Weapons) + required;
        self.try_set_power(room, value).map_err(WeaponError::Power)?;
        if let Some(mounted) = self.weapon_mut(weapon) {
            mounted.activate();
        }
        Ok(())
    }

    /// Unpowers an active weapon, returning the target it dropped.
    pub(crate) fn deactivate_weapon(
        &mut self,
        weapon: WeaponRef,
    ) -> Result<Option<RoomRef>, WeaponError> {
        if self.destroyed {
            return Err(WeaponError::ShipDestroyed);
        }
        match self.weapon(weapon) {
            None => Err(WeaponError::MissingWeapon),
            Some(mounted) if !mounted.is_active() => Err(WeaponError::NotActive),
            Some(_) => Ok(self.power_down_weapon(weapon)),
        }
    }

    fn power_down_weapon(&mut self, weapon: WeaponRef) -> Option<RoomRef> {
        let mounted = self.weapon_mut(weapon)?;
        let required = mounted.spec().req_power;
        let released = mounted.disable();
        if self.selected_weapon == Some(weapon) {
            self.selected_weapon = None;
        }
        if let Some(id) = self.systems.get(&Role::Weapons).copied() {
            if let Some(room) = self.room_mut(id) {
                room.release_power(required);
            }
        }
        released
    }

    /// Sets a room's health and powers down whatever no longer fits.
    ///
    /// Weapons rooms shed their last active weapons first; other rooms clamp.
    pub(crate) fn set_room_health(&mut self, id: RoomId, value: u32) -> Vec<ReleasedTarget> {
        let mut released = Vec::new();
        let Some(room) = self.room_mut(id) else {
            return released;
        };
        let excess = room.set_health(value);
        let role = room.role;
        if excess == 0 {
            return released;
        }

        if role == Some(Role::Weapons) {
            while self.room(id).is_some_and(|room| room.power() > room.health()) {
                let Some(weapon) = self.last_active_weapon() else {
                    break;
                };
                if let Some(target) = self.power_down_weapon(weapon) {
                    released.push((weapon, target));
                }
                self.events.push(Event::WeaponDeactivated { weapon });
            }
        }

        if let Some(room) = self.room_mut(id) {
            if room.power() > room.health() {
                if role == Some(Role::Weapons) {
                    warn!("weapons room power exceeded health with no active weapon left");
                }
                room.clamp_power_to_health();
            }
        }
        if role == Some(Role::Shields) {
            self.clamp_shield();
        }
        released
    }

    /// Applies a projectile hit to a room and the hull.
    pub(crate) fn apply_damage(&mut self, id: RoomId, damage: u32) -> Vec<ReleasedTarget> {
        let Some(room) = self.room(id) else {
            return Vec::new();
        };
        let role = room.role;
        let health = room.health().saturating_sub(damage);

        self.hull = self.hull.saturating_sub(damage);
        let released = self.set_room_health(id, health);
        self.events.push(Event::TookDamage {
            ship: self.side,
            room: id,
            damage,
            hull: self.hull,
        });
        if let Some(role) = role {
            let health = self.room(id).map_or(0, Room::health);
            self.events.push(Event::SystemDamaged {
                ship: self.side,
                role,
                health,
            });
        }
        released
    }

    /// Drops this ship's weapon back-references from the room they aimed at.
    pub(crate) fn forget_attacker(&mut self, weapon: WeaponRef, target: RoomRef) {
        if target.ship != self.side {
            return;
        }
        if let Some(room) = self.room_mut(target.room) {
            room.targeted_by.retain(|attacker| *attacker != weapon);
        }
    }

    pub(crate) fn mark_targeted(&mut self, weapon: WeaponRef, room: RoomId) {
        if let Some(room) = self.room_mut(room) {
            if !room.targeted_by.contains(&weapon) {
                room.targeted_by.push(weapon);
            }
        }
    }

    /// Clears every weapon target pointing at the given ship.
    pub(crate) fn drop_targets_on(&mut self, side: ShipSide) -> Vec<WeaponRef> {
        let mut cleared = Vec::new();
        for weapon in self.weapon_refs() {
            if let Some(mounted) = self.weapon_mut(weapon) {
                if mounted.target.is_some_and(|target| target.ship == side) {
                    mounted.target = None;
                    cleared.push(weapon);
                }
            }
        }
        cleared
    }

    pub(crate) fn shield(&self) -> Option<&Shield> {
        let (room, slot) = self.shield?;
        self.room(room)?.slots.get(slot.get() as usize)?.shield()
    }

    fn shield_mut(&mut self) -> Option<&mut Shield> {
        let (room, slot) = self.shield?;
        self.room_mut(room)?
            .slots
            .get_mut(slot.get() as usize)?
            .shield_mut()
    }

    pub(crate) fn max_shield_charge(&self) -> u32 {
        self.room_power(Role::Shields) / 2
    }

    fn reset_shield(&mut self) {
        if let Some(shield) = self.shield_mut() {
            shield.reset();
        }
    }

    fn clamp_shield(&mut self) {
        let max_charge = self.max_shield_charge();
        if let Some(shield) = self.shield_mut() {
            shield.update(0.0, max_charge, 0.0, f32::MAX);
        }
    }

    /// Consumes a shield bubble if the point lands inside an active shield.
    pub(crate) fn try_absorb(&mut self, point: Vec2) -> Option<u32> {
        let shield = self.shield_mut()?;
        shield.try_absorb(point).then(|| shield.charge())
    }

    /// Charges weapons and regenerates the shield.
    pub(crate) fn update_systems(&mut self, dt: f32, config: &SimulationConfig) {
        if self.destroyed {
            return;
        }
        for weapon in self.weapon_refs() {
            let Some(mounted) = self.weapon_mut(weapon) else {
                continue;
            };
            if mounted.update(dt, config.weapon_charge_speed) {
                self.events.push(Event::WeaponReady { weapon });
            }
        }

        let max_charge = self.max_shield_charge();
        if let Some(shield) = self.shield_mut() {
            shield.update(
                dt,
                max_charge,
                config.shield_charge_change,
                config.shield_charge_time,
            );
        }
    }

    /// Launches a volley from a ready weapon at its target on `opponent`.
    pub(crate) fn fire_weapon<R: Rng>(
        &mut self,
        weapon: WeaponRef,
        opponent: &Ship,
        rng: &mut R,
        config: &SimulationConfig,
    ) -> Result<(RoomRef, u32), WeaponError> {
        if self.destroyed {
            return Err(WeaponError::ShipDestroyed);
        }
        let mounted = self.weapon(weapon).ok_or(WeaponError::MissingWeapon)?;
        match mounted.state() {
            WeaponState::Disabled => return Err(WeaponError::NotActive),
            WeaponState::Charging => return Err(WeaponError::NotReady),
            WeaponState::Ready => {}
        }
        let target = mounted.target.ok_or(WeaponError::NoTarget)?;
        if target.ship != opponent.side || opponent.destroyed {
            return Err(WeaponError::NoTarget);
        }
        let (min, max) = opponent
            .room(target.room)
            .map(|room| room.pixel_bounds(config.tile_size))
            .ok_or(WeaponError::NoTarget)?;

        let spec = mounted.spec();
        let mount = mounted.mount;
        let exit = Vec2::new(self.bounds.1.x + config.screen_margin, mount.y);
        for shot in 0..spec.volley_shots {
            let future_pos = Vec2::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y));
            self.projectiles.push(Projectile::launch(
                self.side,
                &spec,
                mount,
                exit,
                future_pos,
                target,
                shot as f32 * spec.volley_delay,
            ));
        }
        if let Some(mounted) = self.weapon_mut(weapon) {
            mounted.discharge();
        }
        Ok((target, spec.volley_shots))
    }

    /// Horizontal position where incoming projectiles appear on this screen.
    pub(crate) fn entry_x(&self, config: &SimulationConfig) -> f32 {
        let left = self
            .shield()
            .map_or(self.bounds.0.x, |shield| shield.mask.left().min(self.bounds.0.x));
        left - config.screen_margin
    }

    /// Aim point revealed after a projectile switches screens.
    pub(crate) fn reveal_aim<R: Rng>(
        &self,
        room: RoomId,
        future_pos: Vec2,
        rng: &mut R,
        config: &SimulationConfig,
    ) -> Option<Vec2> {
        let (min, max) = self.room(room)?.pixel_bounds(config.tile_size);
        let jitter = config.aim_jitter.abs();
        let offset = Vec2::new(
            rng.gen_range(-jitter..=jitter),
            rng.gen_range(-jitter..=jitter),
        );
        Some((future_pos + offset).clamp(min, max))
    }

    pub(crate) fn update_doors(&mut self, dt: f32) {
        for door in &mut self.doors {
            door.update(dt);
        }
    }

    /// Walks crew along their queues and lets stationed crew repair.
    pub(crate) fn update_crew(&mut self, dt: f32, config: &SimulationConfig) {
        for index in 0..self.crew.len() {
            let stride = self.crew[index].advance(dt, config.crew_speed, config.tile_size);
            match stride {
                Stride::Arrived(tile) => {
                    if let Some(held) = self.tile_mut(tile) {
                        held.occupied = true;
                        held.selected = false;
                    }
                    self.events.push(Event::CrewArrived {
                        ship: self.side,
                        crew: self.crew[index].id,
                        tile,
                    });
                }
                Stride::Walking => {
                    let position = self.crew[index].position;
                    for door in &mut self.doors {
                        if door.position.distance(position) <= config.door_proximity {
                            door.open_for_passage(config.door_close_delay);
                        }
                    }
                }
                Stride::Idle => {}
            }
            self.repair(index, dt, config);
        }
    }

    fn repair(&mut self, index: usize, dt: f32, config: &SimulationConfig) {
        let Some(tile) = self.crew[index].occupied else {
            self.crew[index].repairing = false;
            return;
        };
        let Some(room_index) = self.rooms.iter().position(|room| room.contains(tile)) else {
            self.crew[index].repairing = false;
            return;
        };
        let room = &mut self.rooms[room_index];
        if !room.needs_repair() {
            self.crew[index].repairing = false;
            room.repair_progress = 0.0;
            return;
        }

        self.crew[index].repairing = true;
        room.repair_progress += config.crew_repair_speed * dt;
        if room.repair_progress < 1.0 {
            return;
        }
        room.repair_progress = 0.0;
        let (id, role, health) = (room.id, room.role, room.health() + 1);
        let _ = self.set_room_health(id, health);
        if let Some(role) = role {
            self.events.push(Event::SystemRepaired {
                ship: self.side,
                role,
                health: self.room(id).map_or(health, Room::health),
            });
        }
    }

    fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.rooms
            .iter_mut()
            .find(|room| room.contains(coord))
            .and_then(|room| room.tile_mut(coord))
    }

    /// Plans a route for a crewmate and claims the destination tile.
    pub(crate) fn move_crew(
        &mut self,
        crew: CrewId,
        destination: TileCoord,
        config: &SimulationConfig,
    ) -> Result<(), CrewError> {
        if self.destroyed {
            return Err(CrewError::ShipDestroyed);
        }
        let index = self
            .crew
            .iter()
            .position(|member| member.id == crew)
            .ok_or(CrewError::UnknownCrew)?;
        let tile = self
            .rooms
            .iter()
            .find_map(|room| room.tile(destination))
            .ok_or(CrewError::UnknownTile)?;
        if !tile.is_free() {
            return Err(CrewError::TileTaken);
        }

        let member = &self.crew[index];
        let origin = member.route_origin().ok_or(CrewError::NoPath)?;
        let was_moving = member.is_moving();
        let previous_claim = if was_moving {
            member.moving_to
        } else {
            member.occupied
        };
        let mut route: VecDeque<TileCoord> = find_path(&self.rooms, origin, destination, config.routing)
            .map_err(|_| CrewError::NoPath)?
            .into();
        if was_moving {
            route.push_front(origin);
        }

        if let Some(previous) = previous_claim.and_then(|claim| self.tile_mut(claim)) {
            previous.occupied = false;
            previous.selected = false;
        }
        if let Some(claimed) = self.tile_mut(destination) {
            claimed.selected = true;
        }
        self.crew[index].assign_route(route, destination);
        Ok(())
    }

    pub(crate) fn toggle_door(&mut self, door: DoorId) -> Option<bool> {
        self.doors
            .iter_mut()
            .find(|candidate| candidate.id == door)
            .map(Door::toggle)
    }

    /// Detects hull depletion and runs the wreck countdown.
    pub(crate) fn check_destruction(&mut self, dt: f32, config: &SimulationConfig) -> Destruction {
        if !self.destroyed {
            if self.hull > 0 {
                return Destruction::Intact;
            }
            self.destroyed = true;
            for room in &mut self.rooms {
                room.targeted_by.clear();
            }
            self.events.push(Event::ShipDestroyed { ship: self.side });
            info!("{:?} ship `{}` destroyed", self.side, self.layout);
            return Destruction::JustDestroyed;
        }

        if self.side != ShipSide::Enemy || self.removal_requested {
            return Destruction::Wrecked;
        }
        self.wreck_timer += dt;
        if self.wreck_timer < config.destruction_countdown {
            return Destruction::Wrecked;
        }
        self.removal_requested = true;
        self.events.push(Event::RemoveEnemy);
        debug!("wreck countdown elapsed; requesting enemy removal");
        Destruction::RemovalDue
    }

    pub(crate) fn view(&self, config: &SimulationConfig) -> ShipView {
        let mut weapons = Vec::new();
        let mut thrusters = Vec::new();
        let engines_powered = self.room_power(Role::Engines) > 0 && !self.destroyed;
        for room in &self.rooms {
            for (index, slot) in room.slots.iter().enumerate() {
                let slot_id = slot_index(index);
                match slot {
                    UpgradeSlot::Weapon(weapon) => weapons.push(WeaponSnapshot {
                        weapon: WeaponRef::new(self.side, room.id, slot_id),
                        kind: weapon.kind,
                        state: weapon.state(),
                        charge_level: weapon.charge_level(),
                        charge_time: weapon.spec().charge_time,
                        target: weapon.target,
                        mount: point(weapon.mount),
                        orientation: slot.orientation(),
                    }),
                    UpgradeSlot::Thruster(thruster) => thrusters.push(ThrusterSnapshot {
                        room: room.id,
                        slot: slot_id,
                        kind: thruster.kind,
                        mount: point(thruster.mount),
                        orientation: slot.orientation(),
                        active: engines_powered,
                    }),
                    UpgradeSlot::Shield(_) | UpgradeSlot::Empty { .. } => {}
                }
            }
        }

        let shield = self.shield.and_then(|(room, slot)| {
            self.shield().map(|shield| ShieldSnapshot {
                kind: shield.kind,
                room,
                slot,
                charge: shield.charge(),
                max_charge: self.max_shield_charge(),
                progress: shield.progress(),
            })
        });

        ShipView {
            side: self.side,
            layout: self.layout.clone(),
            hull: self.hull,
            max_hull: self.max_hull,
            destroyed: self.destroyed,
            resigning: self.resigning,
            max_power: self.max_power,
            current_power: self.current_power(),
            evade: self.evade(config),
            autofire: self.autofire,
            selected_weapon: self.selected_weapon,
            rooms: self.rooms.iter().map(Room::snapshot).collect(),
            systems: self.systems.iter().map(|(role, id)| (*role, *id)).collect(),
            weapons,
            shield,
            thrusters,
            doors: self.doors.iter().map(Door::snapshot).collect(),
            crew: self.crew.iter().map(Crewmate::snapshot).collect(),
            projectiles: self.projectiles.iter().map(Projectile::snapshot).collect(),
        }
    }
}

fn slot_index(index: usize) -> SlotIndex {
    SlotIndex::new(u32::try_from(index).unwrap_or(u32::MAX))
}

fn point(position: Vec2) -> PixelPoint {
    PixelPoint::new(position.x, position.y)
}
