#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Into The Light combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player or AI intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for controllers
//! and systems to react to. Systems consume [`ShipView`] snapshots and respond
//! exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown by adapters when a battle session starts.
pub const GAME_TITLE: &str = "Into The Light";

/// Identifies one of the two ships taking part in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipSide {
    /// Ship controlled by the player.
    Player,
    /// Ship controlled by the enemy decision system.
    Enemy,
}

impl ShipSide {
    /// Returns the side facing this one in battle.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Index of a room within its ship's room list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a new room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a door within its ship's door list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorId(u32);

impl DoorId {
    /// Creates a new door identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a crewmate within its ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CrewId(u32);

impl CrewId {
    /// Creates a new crew identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position of an upgrade slot within its room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(u32);

impl SlotIndex {
    /// Creates a new slot index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Non-owning reference to a room that may live on either ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomRef {
    /// Ship that owns the room.
    pub ship: ShipSide,
    /// Room within the owning ship.
    pub room: RoomId,
}

impl RoomRef {
    /// Creates a new room reference.
    #[must_use]
    pub const fn new(ship: ShipSide, room: RoomId) -> Self {
        Self { ship, room }
    }
}

/// Non-owning reference to a weapon mounted in a room's upgrade slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponRef {
    /// Ship carrying the weapon.
    pub ship: ShipSide,
    /// Room hosting the weapon's upgrade slot.
    pub room: RoomId,
    /// Upgrade slot holding the weapon.
    pub slot: SlotIndex,
}

impl WeaponRef {
    /// Creates a new weapon reference.
    #[must_use]
    pub const fn new(ship: ShipSide, room: RoomId, slot: SlotIndex) -> Self {
        Self { ship, room, slot }
    }
}

/// Location of a single tile on a ship's tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Computes the squared Euclidean distance between two tile coordinates.
    #[must_use]
    pub fn distance_squared(self, other: TileCoord) -> u64 {
        let dx = u64::from(self.column.abs_diff(other.column));
        let dy = u64::from(self.row.abs_diff(other.row));
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle expressed in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    origin: TileCoord,
    width: u32,
    height: u32,
}

impl TileRect {
    /// Constructs a rectangle from an origin tile and dimensions.
    #[must_use]
    pub const fn new(origin: TileCoord, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left tile that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Column of the left edge.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.origin.column
    }

    /// Column one past the right edge.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.origin.column + self.width
    }

    /// Row of the top edge.
    #[must_use]
    pub const fn top(&self) -> u32 {
        self.origin.row
    }

    /// Row one past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.origin.row + self.height
    }

    /// Reports whether the tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column >= self.left()
            && tile.column < self.right()
            && tile.row >= self.top()
            && tile.row < self.bottom()
    }
}

/// Point in a ship's local pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate in pixels.
    pub x: f32,
    /// Vertical coordinate in pixels.
    pub y: f32,
}

impl PixelPoint {
    /// Creates a new pixel-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// System type implemented by a room.
///
/// Declaration order doubles as the installed-systems priority order, so a
/// `BTreeMap<Role, _>` iterates systems the way the power bar lists them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shield generator; every bar costs two power.
    Shields,
    /// Engines; drive evasion and the player reactor.
    Engines,
    /// Oxygen generation.
    Oxygen,
    /// Crew healing bay.
    Medbay,
    /// Weapon control; power is allocated per activated weapon.
    Weapons,
    /// Drone control.
    Drones,
    /// Piloting station.
    Pilot,
    /// Sensor array.
    Sensors,
    /// Door control.
    Doors,
}

impl Role {
    /// Every role in installed-systems priority order.
    pub const ALL: [Role; 9] = [
        Role::Shields,
        Role::Engines,
        Role::Oxygen,
        Role::Medbay,
        Role::Weapons,
        Role::Drones,
        Role::Pilot,
        Role::Sensors,
        Role::Doors,
    ];

    /// Power capacity granted per room level.
    #[must_use]
    pub const fn power_per_level(self) -> u32 {
        match self {
            Self::Shields => 2,
            Self::Engines
            | Self::Oxygen
            | Self::Medbay
            | Self::Weapons
            | Self::Drones
            | Self::Pilot
            | Self::Sensors
            | Self::Doors => 1,
        }
    }

    /// Power consumed by a single bar on the power panel.
    #[must_use]
    pub const fn power_per_bar(self) -> u32 {
        self.power_per_level()
    }

    /// Maximum power a room of this role accepts at the provided level.
    #[must_use]
    pub const fn max_power(self, level: u32) -> u32 {
        level * self.power_per_level()
    }

    /// Identifier used by layout descriptors and asset lookups.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Shields => "shields",
            Self::Engines => "engines",
            Self::Oxygen => "oxygen",
            Self::Medbay => "medbay",
            Self::Weapons => "weapons",
            Self::Drones => "drones",
            Self::Pilot => "pilot",
            Self::Sensors => "sensors",
            Self::Doors => "doors",
        }
    }
}

/// Three-tier health state of a system room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemStatus {
    /// Health equals the room's maximum power.
    Nominal,
    /// Health is above zero but below the maximum.
    Damaged,
    /// Health reached zero; the room accepts no power.
    Offline,
}

impl SystemStatus {
    /// Classifies a health value against the room's capacity.
    #[must_use]
    pub const fn classify(health: u32, max_power: u32) -> Self {
        if health == 0 {
            Self::Offline
        } else if health >= max_power {
            Self::Nominal
        } else {
            Self::Damaged
        }
    }
}

/// Direction of a single power bar adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerStep {
    /// Add one bar of power.
    Increase,
    /// Remove one bar of power.
    Decrease,
}

/// Ballistic family of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Standard energy bolt stopped by shields.
    Laser,
    /// Continuous beam that passes through shields.
    Beam,
}

impl ProjectileKind {
    /// Reports whether an active shield can absorb this projectile.
    #[must_use]
    pub const fn absorbed_by_shields(self) -> bool {
        !matches!(self, Self::Beam)
    }
}

/// Static description of a weapon model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponSpec {
    /// Name shown on the weapon panel.
    pub display_name: &'static str,
    /// Power drawn from the weapons room while the weapon is active.
    pub req_power: u32,
    /// Charge units required before the weapon is ready.
    pub charge_time: f32,
    /// Number of projectiles emitted per volley.
    pub volley_shots: u32,
    /// Launch delay between successive shots of a volley, in seconds.
    pub volley_delay: f32,
    /// Projectile family emitted by the weapon.
    pub projectile: ProjectileKind,
    /// Hull and system damage dealt by each projectile.
    pub damage: u32,
    /// Projectile speed in pixels per second.
    pub speed: f32,
    /// Visual length of each projectile line in pixels.
    pub length: f32,
}

/// Weapon models that can be mounted in a weapon slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Single-shot laser.
    LaserMk1,
    /// Three-shot burst laser.
    LaserMk2,
    /// Shield-piercing beam.
    BeamMk1,
}

impl WeaponKind {
    /// Every weapon model known to the catalog.
    pub const ALL: [WeaponKind; 3] = [Self::LaserMk1, Self::LaserMk2, Self::BeamMk1];

    /// Returns the static description of the weapon model.
    #[must_use]
    pub const fn spec(self) -> WeaponSpec {
        match self {
            Self::LaserMk1 => WeaponSpec {
                display_name: "Laser MK1",
                req_power: 1,
                charge_time: 100.0,
                volley_shots: 1,
                volley_delay: 0.3,
                projectile: ProjectileKind::Laser,
                damage: 1,
                speed: 300.0,
                length: 15.0,
            },
            Self::LaserMk2 => WeaponSpec {
                display_name: "Laser MK2",
                req_power: 1,
                charge_time: 100.0,
                volley_shots: 3,
                volley_delay: 0.3,
                projectile: ProjectileKind::Laser,
                damage: 1,
                speed: 300.0,
                length: 15.0,
            },
            Self::BeamMk1 => WeaponSpec {
                display_name: "Beam MK1",
                req_power: 2,
                charge_time: 150.0,
                volley_shots: 1,
                volley_delay: 0.0,
                projectile: ProjectileKind::Beam,
                damage: 2,
                speed: 450.0,
                length: 40.0,
            },
        }
    }

    /// Identifier used by layout descriptors and asset lookups.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::LaserMk1 => "laser_mk1",
            Self::LaserMk2 => "laser_mk2",
            Self::BeamMk1 => "beam_mk1",
        }
    }

    /// Resolves a layout identifier into a weapon model.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// Thruster models that can be mounted in a thruster slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrusterKind {
    /// Standard thruster.
    ThrusterMk1,
}

impl ThrusterKind {
    /// Identifier used by layout descriptors and asset lookups.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ThrusterMk1 => "thruster_mk1",
        }
    }

    /// Resolves a layout identifier into a thruster model.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        (id == Self::ThrusterMk1.id()).then_some(Self::ThrusterMk1)
    }
}

/// Shield generator models that can be mounted in a shield slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldKind {
    /// Standard bubble shield.
    ShieldMk1,
}

impl ShieldKind {
    /// Identifier used by layout descriptors and asset lookups.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ShieldMk1 => "shield_mk1",
        }
    }

    /// Resolves a layout identifier into a shield model.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        (id == Self::ShieldMk1.id()).then_some(Self::ShieldMk1)
    }
}

/// Kind of mount point an upgrade slot provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Accepts weapons.
    Weapon,
    /// Accepts thrusters.
    Thruster,
    /// Accepts shield generators.
    Shield,
}

/// Side of a room an upgrade slot is mounted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Centre of the top edge.
    Top,
    /// Centre of the right edge.
    Right,
    /// Centre of the bottom edge.
    Bottom,
    /// Centre of the left edge.
    Left,
}

/// Charge state of a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponState {
    /// Unpowered; residual charge decays.
    Disabled,
    /// Powered and accumulating charge.
    Charging,
    /// Fully charged and waiting to fire.
    Ready,
}

/// Species of a crewmate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    /// Baseline crew.
    Human,
    /// Repair specialists.
    Engi,
    /// Energy beings.
    Zoltan,
    /// Melee specialists.
    Mantis,
    /// Slow, resilient crew.
    Rockman,
    /// Telepathic crew.
    Slug,
}

/// Cardinal screen-space direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    Up,
    /// Toward increasing rows.
    Down,
    /// Toward decreasing columns.
    Left,
    /// Toward increasing columns.
    Right,
}

/// Animation-relevant activity of a crewmate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrewActivity {
    /// Standing on a tile with nothing to do.
    Idle,
    /// Walking in the provided direction.
    Moving(Direction),
    /// Stationed in a damaged system room and repairing it.
    Repairing,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Pauses or resumes the simulation.
    SetPaused {
        /// Whether ticks should be ignored.
        paused: bool,
    },
    /// Requests a one-bar power change on an installed system.
    ChangeSystemPower {
        /// Ship owning the system.
        ship: ShipSide,
        /// System to adjust.
        role: Role,
        /// Direction of the adjustment.
        step: PowerStep,
    },
    /// Requests that a disabled weapon be powered and start charging.
    ActivateWeapon {
        /// Weapon to activate.
        weapon: WeaponRef,
    },
    /// Requests that an active weapon be unpowered.
    DeactivateWeapon {
        /// Weapon to deactivate.
        weapon: WeaponRef,
    },
    /// Marks a weapon as the ship's selected weapon, activating it when disabled.
    SelectWeapon {
        /// Weapon to select.
        weapon: WeaponRef,
    },
    /// Aims a weapon at a room on the opposing ship.
    TargetRoom {
        /// Weapon being aimed.
        weapon: WeaponRef,
        /// Room the weapon should fire at.
        target: RoomRef,
    },
    /// Removes a weapon's current target.
    ClearTarget {
        /// Weapon losing its target.
        weapon: WeaponRef,
    },
    /// Fires a ready weapon at its current target.
    FireWeapon {
        /// Weapon to fire.
        weapon: WeaponRef,
    },
    /// Toggles whether weapons keep their targets after firing.
    SetAutofire {
        /// Ship whose autofire flag changes.
        ship: ShipSide,
        /// New autofire state.
        enabled: bool,
    },
    /// Orders a crewmate to walk to a tile.
    MoveCrew {
        /// Ship the crewmate belongs to.
        ship: ShipSide,
        /// Crewmate receiving the order.
        crew: CrewId,
        /// Tile the crewmate should end up on.
        destination: TileCoord,
    },
    /// Opens a closed door or closes an open one.
    ToggleDoor {
        /// Ship owning the door.
        ship: ShipSide,
        /// Door to toggle.
        door: DoorId,
    },
    /// Signals that the enemy ship gives up the fight.
    ResignEnemy,
    /// Tears down a destroyed enemy ship and awards its loot.
    RemoveEnemy,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation was paused or resumed.
    GamePaused {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Confirms a power change on a system room.
    PowerChanged {
        /// Ship owning the system.
        ship: ShipSide,
        /// System whose power changed.
        role: Role,
        /// Power allocated to the system after the change.
        power: u32,
    },
    /// Reports that a power request was not applied.
    PowerRequestRejected {
        /// Ship owning the system.
        ship: ShipSide,
        /// System targeted by the request.
        role: Role,
        /// Specific reason the request failed.
        reason: PowerError,
    },
    /// Confirms that a weapon was powered and started charging.
    WeaponActivated {
        /// Weapon that was activated.
        weapon: WeaponRef,
    },
    /// Confirms that a weapon was unpowered.
    WeaponDeactivated {
        /// Weapon that was deactivated.
        weapon: WeaponRef,
    },
    /// Reports that a weapon finished charging.
    WeaponReady {
        /// Weapon that became ready.
        weapon: WeaponRef,
    },
    /// Confirms that a weapon fired a volley.
    WeaponFired {
        /// Weapon that fired.
        weapon: WeaponRef,
        /// Room the volley is aimed at.
        target: RoomRef,
        /// Number of projectiles launched.
        shots: u32,
    },
    /// Reports that a weapon command was rejected.
    WeaponRejected {
        /// Weapon named by the command.
        weapon: WeaponRef,
        /// Specific reason the command failed.
        reason: WeaponError,
    },
    /// Confirms that a weapon became the ship's selected weapon.
    WeaponSelected {
        /// Weapon that is now selected.
        weapon: WeaponRef,
    },
    /// Confirms that a weapon acquired a target.
    TargetAssigned {
        /// Weapon that was aimed.
        weapon: WeaponRef,
        /// Room the weapon now aims at.
        target: RoomRef,
    },
    /// Confirms that a weapon lost its target.
    TargetCleared {
        /// Weapon whose target was removed.
        weapon: WeaponRef,
    },
    /// Reports that a targeting command was rejected.
    TargetRejected {
        /// Weapon named by the command.
        weapon: WeaponRef,
        /// Specific reason the command failed.
        reason: TargetError,
    },
    /// Announces that a shield absorbed a projectile.
    ShieldAbsorbed {
        /// Ship whose shield absorbed the hit.
        ship: ShipSide,
        /// Shield bubbles left after the hit.
        remaining: u32,
    },
    /// Announces that a projectile was evaded.
    ProjectileMissed {
        /// Ship that evaded the projectile.
        ship: ShipSide,
        /// Room the projectile was aimed at.
        room: RoomId,
    },
    /// Announces that a room and the hull took damage.
    TookDamage {
        /// Ship that was hit.
        ship: ShipSide,
        /// Room that was hit.
        room: RoomId,
        /// Damage applied by the hit.
        damage: u32,
        /// Hull points remaining after the hit.
        hull: u32,
    },
    /// Announces that a system room lost health.
    SystemDamaged {
        /// Ship owning the system.
        ship: ShipSide,
        /// System that was damaged.
        role: Role,
        /// Health remaining after the hit.
        health: u32,
    },
    /// Announces that crew repaired one health point of a system.
    SystemRepaired {
        /// Ship owning the system.
        ship: ShipSide,
        /// System that was repaired.
        role: Role,
        /// Health after the repair.
        health: u32,
    },
    /// Announces that a ship's hull was depleted.
    ShipDestroyed {
        /// Ship that was destroyed.
        ship: ShipSide,
    },
    /// Signals the owning controller to tear the enemy ship down.
    RemoveEnemy,
    /// Confirms that the enemy ship was removed.
    EnemyRemoved {
        /// Scrap awarded to the player.
        loot: u32,
    },
    /// Announces that the enemy ship gave up the fight.
    EnemyResigning,
    /// Confirms that a crewmate started walking.
    CrewMoving {
        /// Ship the crewmate belongs to.
        ship: ShipSide,
        /// Crewmate that started moving.
        crew: CrewId,
        /// Tile the crewmate is walking to.
        destination: TileCoord,
    },
    /// Confirms that a crewmate reached its destination.
    CrewArrived {
        /// Ship the crewmate belongs to.
        ship: ShipSide,
        /// Crewmate that arrived.
        crew: CrewId,
        /// Tile the crewmate now occupies.
        tile: TileCoord,
    },
    /// Reports that a crew order was rejected.
    CrewOrderRejected {
        /// Ship named by the order.
        ship: ShipSide,
        /// Crewmate named by the order.
        crew: CrewId,
        /// Specific reason the order failed.
        reason: CrewError,
    },
    /// Confirms that a door opened or closed.
    DoorToggled {
        /// Ship owning the door.
        ship: ShipSide,
        /// Door that changed state.
        door: DoorId,
        /// Whether the door is now open.
        opened: bool,
    },
    /// Confirms a change of a ship's autofire flag.
    AutofireChanged {
        /// Ship whose flag changed.
        ship: ShipSide,
        /// New autofire state.
        enabled: bool,
    },
}

/// Reasons a power request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PowerError {
    /// The ship has no room with the requested role.
    #[error("the ship has no such system installed")]
    MissingSystem,
    /// The requested value lies outside `0..=max_power`.
    #[error("requested power is outside the room's capacity")]
    OutOfRange,
    /// The reactor cannot supply the requested increase.
    #[error("the reactor has too little unused power")]
    InsufficientPower,
    /// The requested value exceeds the room's remaining health.
    #[error("requested power exceeds the room's health")]
    ExceedsHealth,
    /// The room has no role and therefore no power.
    #[error("the room hosts no system")]
    NotASystem,
    /// Weapon room power changes are made per weapon and none qualified.
    #[error("no weapon can change state")]
    NoWeaponAvailable,
    /// The ship has been destroyed.
    #[error("the ship has been destroyed")]
    ShipDestroyed,
}

/// Reasons a weapon command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WeaponError {
    /// No weapon is mounted at the referenced slot.
    #[error("no weapon is mounted at the referenced slot")]
    MissingWeapon,
    /// The weapon is already powered.
    #[error("the weapon is already active")]
    AlreadyActive,
    /// The weapon is not powered.
    #[error("the weapon is disabled")]
    NotActive,
    /// The weapon has not finished charging.
    #[error("the weapon is still charging")]
    NotReady,
    /// The weapon has no target.
    #[error("the weapon has no target")]
    NoTarget,
    /// The weapons room could not supply the required power.
    #[error("weapon power request failed: {0}")]
    Power(PowerError),
    /// The ship has been destroyed.
    #[error("the ship has been destroyed")]
    ShipDestroyed,
}

/// Reasons a targeting command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum TargetError {
    /// No weapon is mounted at the referenced slot.
    #[error("no weapon is mounted at the referenced slot")]
    MissingWeapon,
    /// The weapon is not powered.
    #[error("the weapon is disabled")]
    WeaponDisabled,
    /// Weapons cannot target rooms on their own ship.
    #[error("weapons cannot target their own ship")]
    OwnShip,
    /// The referenced ship or room does not exist.
    #[error("the targeted room does not exist")]
    MissingRoom,
    /// The referenced ship has been destroyed.
    #[error("the targeted ship has been destroyed")]
    ShipDestroyed,
}

/// Reasons a crew order may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum CrewError {
    /// No crewmate with the provided identifier exists.
    #[error("no such crewmate")]
    UnknownCrew,
    /// The destination tile is not part of any room.
    #[error("the destination is not a ship tile")]
    UnknownTile,
    /// The destination tile is occupied or already claimed.
    #[error("the destination tile is taken")]
    TileTaken,
    /// The room graph does not connect the start and destination tiles.
    #[error("no path connects the crewmate to the destination")]
    NoPath,
    /// The ship has been destroyed.
    #[error("the ship has been destroyed")]
    ShipDestroyed,
}

/// Immutable representation of a room's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSnapshot {
    /// Identifier of the room within its ship.
    pub id: RoomId,
    /// Footprint of the room in tiles.
    pub rect: TileRect,
    /// System hosted by the room, if any.
    pub role: Option<Role>,
    /// Upgrade level fixed at assembly.
    pub level: u32,
    /// Power currently allocated to the room.
    pub power: u32,
    /// Structural health of the room.
    pub health: u32,
    /// Maximum power the room accepts.
    pub max_power: u32,
    /// Health tier of a system room.
    pub status: Option<SystemStatus>,
    /// Weapons currently aiming at this room.
    pub targeted_by: Vec<WeaponRef>,
}

/// Immutable representation of a weapon's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSnapshot {
    /// Reference to the weapon's slot.
    pub weapon: WeaponRef,
    /// Weapon model.
    pub kind: WeaponKind,
    /// Charge state.
    pub state: WeaponState,
    /// Accumulated charge.
    pub charge_level: f32,
    /// Charge required before the weapon is ready.
    pub charge_time: f32,
    /// Room the weapon is aiming at.
    pub target: Option<RoomRef>,
    /// Pixel position of the weapon mount.
    pub mount: PixelPoint,
    /// Edge of the room the weapon is mounted on.
    pub orientation: Orientation,
}

/// Immutable representation of a thruster used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ThrusterSnapshot {
    /// Room hosting the thruster.
    pub room: RoomId,
    /// Slot hosting the thruster.
    pub slot: SlotIndex,
    /// Thruster model.
    pub kind: ThrusterKind,
    /// Pixel position of the thruster mount.
    pub mount: PixelPoint,
    /// Edge of the room the thruster is mounted on.
    pub orientation: Orientation,
    /// Whether powered engines are driving the thruster.
    pub active: bool,
}

/// Immutable representation of a ship's shield used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ShieldSnapshot {
    /// Shield generator model.
    pub kind: ShieldKind,
    /// Room hosting the shield generator.
    pub room: RoomId,
    /// Slot hosting the shield generator.
    pub slot: SlotIndex,
    /// Shield bubbles currently raised.
    pub charge: u32,
    /// Maximum number of bubbles supported by the shields room power.
    pub max_charge: u32,
    /// Progress toward the next bubble, in charge units.
    pub progress: f32,
}

/// Immutable representation of a crewmate used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CrewSnapshot {
    /// Identifier of the crewmate.
    pub id: CrewId,
    /// Display name.
    pub name: String,
    /// Species.
    pub race: Race,
    /// Pixel position of the crewmate's centre.
    pub position: PixelPoint,
    /// Tile occupied while stationed.
    pub occupied_tile: Option<TileCoord>,
    /// Destination while walking.
    pub moving_to: Option<TileCoord>,
    /// Animation-relevant activity.
    pub activity: CrewActivity,
    /// Whether the crewmate is selected in the UI.
    pub selected: bool,
    /// Whether the cursor hovers over the crewmate.
    pub hovering: bool,
}

/// Immutable representation of a door used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct DoorSnapshot {
    /// Identifier of the door.
    pub id: DoorId,
    /// Rooms joined by the door.
    pub rooms: (RoomId, RoomId),
    /// Facing tiles joined by the door.
    pub tiles: (TileCoord, TileCoord),
    /// Pixel position of the door's centre.
    pub position: PixelPoint,
    /// Whether the door separates left/right neighbours.
    pub vertical: bool,
    /// Whether the door is open.
    pub opened: bool,
}

/// Immutable representation of a projectile used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Ship that fired the projectile.
    pub owner: ShipSide,
    /// Ballistic family.
    pub kind: ProjectileKind,
    /// Trailing point of the projectile line.
    pub start: PixelPoint,
    /// Leading point of the projectile line.
    pub end: PixelPoint,
    /// Room the projectile is aimed at.
    pub target: RoomRef,
    /// Whether the projectile is drawn on the defender's screen.
    pub switched_screens: bool,
    /// Whether the projectile was evaded.
    pub missed: bool,
    /// Whether the projectile is still waiting for launch.
    pub pending_launch: bool,
}

/// Read-only snapshot describing a whole ship.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipView {
    /// Side the ship fights on.
    pub side: ShipSide,
    /// Name of the layout the ship was assembled from.
    pub layout: String,
    /// Hull points remaining.
    pub hull: u32,
    /// Hull points at spawn.
    pub max_hull: u32,
    /// Whether the hull has been depleted.
    pub destroyed: bool,
    /// Whether the ship has given up the fight.
    pub resigning: bool,
    /// Reactor output.
    pub max_power: u32,
    /// Power allocated across all rooms.
    pub current_power: u32,
    /// Chance out of 100 to evade an incoming projectile.
    pub evade: u32,
    /// Whether weapons keep their targets after firing.
    pub autofire: bool,
    /// Weapon highlighted on the weapon panel.
    pub selected_weapon: Option<WeaponRef>,
    /// Rooms in assembly order.
    pub rooms: Vec<RoomSnapshot>,
    /// Installed systems in priority order.
    pub systems: Vec<(Role, RoomId)>,
    /// Weapons in room and slot order.
    pub weapons: Vec<WeaponSnapshot>,
    /// Installed shield, if any.
    pub shield: Option<ShieldSnapshot>,
    /// Thrusters in room and slot order.
    pub thrusters: Vec<ThrusterSnapshot>,
    /// Doors in construction order.
    pub doors: Vec<DoorSnapshot>,
    /// Crew in identifier order.
    pub crew: Vec<CrewSnapshot>,
    /// Projectiles fired by this ship that are still in flight.
    pub projectiles: Vec<ProjectileSnapshot>,
}

impl ShipView {
    /// Power the reactor can still hand out.
    #[must_use]
    pub fn usable_power(&self) -> u32 {
        self.max_power.saturating_sub(self.current_power)
    }

    /// Looks up a room snapshot by identifier.
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&RoomSnapshot> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Looks up the room hosting an installed system.
    #[must_use]
    pub fn system(&self, role: Role) -> Option<&RoomSnapshot> {
        self.systems
            .iter()
            .find(|(installed, _)| *installed == role)
            .and_then(|(_, room)| self.room(*room))
    }
}
