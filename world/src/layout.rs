//! Ship layout descriptors and their validation.

use std::collections::{BTreeMap, BTreeSet};

use into_the_light_core::{
    Orientation, Race, Role, ShieldKind, SlotKind, ThrusterKind, TileCoord, TileRect, WeaponKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the layout the player flies by default.
pub const DEFAULT_PLAYER_LAYOUT: &str = "scout";

/// Name of the layout enemies spawn with by default.
pub const DEFAULT_ENEMY_LAYOUT: &str = "cruiser";

/// Names of the layouts that ship with the engine.
pub const BUILTIN_LAYOUTS: [&str; 2] = ["scout", "cruiser"];

/// Reasons a layout cannot be assembled into a ship.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A room's tile matrix contains no tiles.
    #[error("room {room} has no tiles")]
    EmptyRoom {
        /// Index of the offending room.
        room: usize,
    },
    /// Two rooms share the same grid position.
    #[error("room {room} reuses the position of an earlier room")]
    DuplicatePosition {
        /// Index of the offending room.
        room: usize,
    },
    /// Two rooms claim the same tile.
    #[error("rooms {first} and {second} overlap")]
    OverlappingRooms {
        /// Index of the room that claimed the tile first.
        first: usize,
        /// Index of the room that claimed it again.
        second: usize,
    },
    /// More than one room hosts the same system.
    #[error("more than one room hosts the {0:?} system")]
    DuplicateRole(Role),
    /// The layout has no engines room to derive the reactor from.
    #[error("the layout has no engines room")]
    MissingEngines,
    /// An upgrade identifier is not in the catalog.
    #[error("unknown upgrade `{0}`")]
    UnknownUpgrade(String),
    /// An upgrade was placed into a slot of the wrong kind.
    #[error("upgrade `{upgrade}` does not fit a {kind:?} slot")]
    WrongSlotKind {
        /// Identifier of the misplaced upgrade.
        upgrade: String,
        /// Kind of the slot it was placed in.
        kind: SlotKind,
    },
    /// A crewmate was assigned to a room that does not exist.
    #[error("crewmate `{0}` starts in a room that does not exist")]
    UnknownCrewRoom(String),
    /// A crewmate's starting room has no free tile left.
    #[error("crewmate `{0}` has no free tile in its starting room")]
    CrowdedCrewRoom(String),
    /// No layout with the requested name is known.
    #[error("unknown layout `{0}`")]
    UnknownLayout(String),
    /// The configured enemy hull range is empty.
    #[error("enemy hull range {min}..={max} is empty")]
    InvalidHullRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// A tunable is zero, negative or not a finite number where that makes no sense.
    #[error("setting `{0}` is out of range")]
    InvalidSetting(&'static str),
}

/// Named template describing a ship's rooms and crew.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLayout {
    /// Name used to look the layout up.
    pub name: String,
    /// Rooms in assembly order.
    pub rooms: Vec<RoomLayout>,
    /// Crew on board at spawn.
    #[serde(default)]
    pub crew: Vec<CrewLayout>,
}

/// Template for a single room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Tile of the room's upper-left corner.
    pub position: [u32; 2],
    /// Column-major occupancy matrix; non-zero entries are tiles.
    pub tiles: Vec<Vec<u8>>,
    /// System hosted by the room.
    #[serde(default)]
    pub role: Option<Role>,
    /// Upgrade level; system rooms default to one.
    #[serde(default)]
    pub level: Option<u32>,
    /// Upgrade slots on the room's perimeter.
    #[serde(default)]
    pub slots: Vec<SlotLayout>,
}

/// Template for an upgrade slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    /// Kind of upgrade the slot accepts.
    pub kind: SlotKind,
    /// Edge of the room the slot sits on.
    pub orientation: Orientation,
    /// Identifier of the mounted upgrade; empty when absent.
    #[serde(default)]
    pub upgrade: Option<String>,
}

/// Template for a crewmate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewLayout {
    /// Display name.
    pub name: String,
    /// Species.
    pub race: Race,
    /// Index of the room the crewmate starts in.
    pub room: usize,
}

/// Collection of layouts loaded from a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSet {
    /// Layouts in file order.
    #[serde(default)]
    pub layouts: Vec<ShipLayout>,
}

impl LayoutSet {
    /// Looks a layout up by name, falling back to the built-in layouts.
    pub fn resolve(&self, name: &str) -> Result<ShipLayout, ConfigurationError> {
        match self.layouts.iter().find(|layout| layout.name == name) {
            Some(layout) => Ok(layout.clone()),
            None => builtin(name),
        }
    }
}

/// Upgrade resolved from a slot identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Upgrade {
    Weapon(WeaponKind),
    Thruster(ThrusterKind),
    Shield(ShieldKind),
}

impl ShipLayout {
    /// Checks the structural rules every assembled ship relies on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut positions = BTreeSet::new();
        let mut roles = BTreeSet::new();
        let mut claimed: BTreeMap<TileCoord, usize> = BTreeMap::new();

        for (index, room) in self.rooms.iter().enumerate() {
            let tiles = room.tile_coords();
            if tiles.is_empty() {
                return Err(ConfigurationError::EmptyRoom { room: index });
            }
            if !positions.insert(room.position) {
                return Err(ConfigurationError::DuplicatePosition { room: index });
            }
            if let Some(role) = room.role {
                if !roles.insert(role) {
                    return Err(ConfigurationError::DuplicateRole(role));
                }
            }
            for tile in tiles {
                if let Some(first) = claimed.insert(tile, index) {
                    return Err(ConfigurationError::OverlappingRooms {
                        first,
                        second: index,
                    });
                }
            }
            for slot in &room.slots {
                let _ = slot.resolve()?;
            }
        }

        if !roles.contains(&Role::Engines) {
            return Err(ConfigurationError::MissingEngines);
        }

        for member in &self.crew {
            let Some(room) = self.rooms.get(member.room) else {
                return Err(ConfigurationError::UnknownCrewRoom(member.name.clone()));
            };
            let seats = room.tile_coords().len();
            let taken = self
                .crew
                .iter()
                .filter(|other| other.room == member.room)
                .count();
            if taken > seats {
                return Err(ConfigurationError::CrowdedCrewRoom(member.name.clone()));
            }
        }

        Ok(())
    }
}

impl RoomLayout {
    /// Ship-global coordinates of the room's tiles in column-major order.
    #[must_use]
    pub fn tile_coords(&self) -> Vec<TileCoord> {
        let [left, top] = self.position;
        let mut coords = Vec::new();
        for (x, column) in (0u32..).zip(&self.tiles) {
            for (y, cell) in (0u32..).zip(column) {
                if *cell != 0 {
                    coords.push(TileCoord::new(left + x, top + y));
                }
            }
        }
        coords
    }

    /// Bounding rectangle of the tile matrix.
    #[must_use]
    pub fn rect(&self) -> TileRect {
        let [left, top] = self.position;
        let width = u32::try_from(self.tiles.len()).unwrap_or(u32::MAX);
        let height = self
            .tiles
            .iter()
            .map(|column| u32::try_from(column.len()).unwrap_or(u32::MAX))
            .max()
            .unwrap_or(0);
        TileRect::new(TileCoord::new(left, top), width, height)
    }

    /// Upgrade level, defaulting to one for system rooms.
    #[must_use]
    pub fn effective_level(&self) -> u32 {
        match (self.role, self.level) {
            (_, Some(level)) => level,
            (Some(_), None) => 1,
            (None, None) => 0,
        }
    }
}

impl SlotLayout {
    pub(crate) fn resolve(&self) -> Result<Option<Upgrade>, ConfigurationError> {
        let Some(id) = self.upgrade.as_deref() else {
            return Ok(None);
        };

        let upgrade = if let Some(kind) = WeaponKind::from_id(id) {
            Upgrade::Weapon(kind)
        } else if let Some(kind) = ThrusterKind::from_id(id) {
            Upgrade::Thruster(kind)
        } else if let Some(kind) = ShieldKind::from_id(id) {
            Upgrade::Shield(kind)
        } else {
            return Err(ConfigurationError::UnknownUpgrade(id.to_owned()));
        };

        let fits = matches!(
            (self.kind, upgrade),
            (SlotKind::Weapon, Upgrade::Weapon(_))
                | (SlotKind::Thruster, Upgrade::Thruster(_))
                | (SlotKind::Shield, Upgrade::Shield(_))
        );
        if !fits {
            return Err(ConfigurationError::WrongSlotKind {
                upgrade: id.to_owned(),
                kind: self.kind,
            });
        }

        Ok(Some(upgrade))
    }
}

/// Returns one of the layouts that ship with the engine.
pub fn builtin(name: &str) -> Result<ShipLayout, ConfigurationError> {
    match name {
        "scout" => Ok(scout()),
        "cruiser" => Ok(cruiser()),
        other => Err(ConfigurationError::UnknownLayout(other.to_owned())),
    }
}

fn room(position: [u32; 2], width: usize, height: usize) -> RoomLayout {
    RoomLayout {
        position,
        tiles: vec![vec![1; height]; width],
        role: None,
        level: None,
        slots: Vec::new(),
    }
}

fn system(position: [u32; 2], width: usize, height: usize, role: Role, level: u32) -> RoomLayout {
    RoomLayout {
        role: Some(role),
        level: Some(level),
        ..room(position, width, height)
    }
}

fn slot(kind: SlotKind, orientation: Orientation, upgrade: Option<&str>) -> SlotLayout {
    SlotLayout {
        kind,
        orientation,
        upgrade: upgrade.map(str::to_owned),
    }
}

fn crew(name: &str, race: Race, room: usize) -> CrewLayout {
    CrewLayout {
        name: name.to_owned(),
        race,
        room,
    }
}

fn scout() -> ShipLayout {
    let mut rooms = vec![
        room([0, 2], 1, 2),
        system([1, 1], 2, 1, Role::Oxygen, 1),
        system([1, 2], 2, 2, Role::Engines, 3),
        room([1, 4], 2, 1),
        room([3, 1], 2, 1),
        room([3, 4], 2, 1),
        system([4, 2], 2, 2, Role::Weapons, 2),
        room([6, 0], 2, 1),
        room([6, 1], 2, 2),
        room([6, 3], 2, 2),
        room([6, 5], 2, 1),
        system([8, 1], 2, 2, Role::Medbay, 1),
        system([8, 3], 2, 2, Role::Shields, 1),
        room([10, 2], 2, 1),
        system([10, 3], 2, 1, Role::Sensors, 1),
        room([12, 2], 2, 2),
        system([14, 2], 1, 2, Role::Pilot, 1),
    ];
    rooms[0].slots = vec![slot(
        SlotKind::Thruster,
        Orientation::Left,
        Some("thruster_mk1"),
    )];
    rooms[11].slots = vec![slot(SlotKind::Weapon, Orientation::Top, Some("laser_mk2"))];
    rooms[14].slots = vec![slot(
        SlotKind::Weapon,
        Orientation::Bottom,
        Some("laser_mk1"),
    )];
    rooms[15].slots = vec![
        slot(SlotKind::Weapon, Orientation::Top, Some("laser_mk1")),
        slot(SlotKind::Weapon, Orientation::Bottom, Some("laser_mk1")),
    ];

    ShipLayout {
        name: "scout".to_owned(),
        rooms,
        crew: vec![
            crew("Ada", Race::Human, 16),
            crew("Bram", Race::Engi, 2),
            crew("Cass", Race::Mantis, 6),
        ],
    }
}

fn cruiser() -> ShipLayout {
    let mut rooms = vec![
        system([0, 0], 3, 2, Role::Shields, 2),
        system([3, 1], 4, 3, Role::Weapons, 3),
        system([7, 1], 4, 3, Role::Medbay, 1),
        system([1, 2], 2, 2, Role::Oxygen, 1),
        system([0, 4], 3, 3, Role::Engines, 2),
        room([3, 6], 6, 2),
        system([7, 4], 4, 2, Role::Sensors, 1),
        system([11, 4], 4, 2, Role::Pilot, 1),
    ];
    rooms[0].slots = vec![slot(SlotKind::Thruster, Orientation::Left, None)];
    rooms[1].slots = vec![slot(SlotKind::Weapon, Orientation::Top, Some("laser_mk1"))];
    rooms[2].slots = vec![
        slot(SlotKind::Weapon, Orientation::Top, None),
        slot(SlotKind::Shield, Orientation::Right, Some("shield_mk1")),
    ];
    rooms[4].slots = vec![slot(
        SlotKind::Thruster,
        Orientation::Left,
        Some("thruster_mk1"),
    )];
    rooms[5].slots = vec![slot(
        SlotKind::Weapon,
        Orientation::Bottom,
        Some("laser_mk1"),
    )];

    ShipLayout {
        name: "cruiser".to_owned(),
        rooms,
        crew: vec![crew("Drel", Race::Rockman, 1), crew("Esk", Race::Slug, 7)],
    }
}
