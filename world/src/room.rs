//! Rooms, their tiles and the power/health rules they enforce.

use std::collections::BTreeMap;

use glam::Vec2;
use into_the_light_core::{
    PowerError, Role, RoomId, RoomSnapshot, SystemStatus, TileCoord, TileRect, WeaponRef,
};

use crate::upgrades::UpgradeSlot;

/// Unit cell of a room.
///
/// `selected` marks a tile claimed as some crewmate's destination and is never
/// set on an occupied tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Tile {
    pub(crate) coord: TileCoord,
    pub(crate) occupied: bool,
    pub(crate) selected: bool,
}

impl Tile {
    pub(crate) const fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            occupied: false,
            selected: false,
        }
    }

    pub(crate) const fn is_free(&self) -> bool {
        !self.occupied && !self.selected
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Room {
    pub(crate) id: RoomId,
    pub(crate) rect: TileRect,
    pub(crate) role: Option<Role>,
    pub(crate) level: u32,
    power: u32,
    health: u32,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) slots: Vec<UpgradeSlot>,
    /// Neighbour room mapped to (own facing tile, neighbour facing tile).
    pub(crate) adjacent: BTreeMap<RoomId, (TileCoord, TileCoord)>,
    pub(crate) targeted_by: Vec<WeaponRef>,
    pub(crate) repair_progress: f32,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        rect: TileRect,
        role: Option<Role>,
        level: u32,
        tiles: Vec<TileCoord>,
    ) -> Self {
        let mut room = Self {
            id,
            rect,
            role,
            level,
            power: 0,
            health: 0,
            tiles: tiles.into_iter().map(Tile::new).collect(),
            slots: Vec::new(),
            adjacent: BTreeMap::new(),
            targeted_by: Vec::new(),
            repair_progress: 0.0,
        };
        room.health = room.max_power();
        room
    }

    /// Power capacity derived from the role table; zero without a role.
    pub(crate) fn max_power(&self) -> u32 {
        self.role.map_or(0, |role| role.max_power(self.level))
    }

    pub(crate) const fn power(&self) -> u32 {
        self.power
    }

    pub(crate) const fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn status(&self) -> Option<SystemStatus> {
        self.role
            .map(|_| SystemStatus::classify(self.health, self.max_power()))
    }

    pub(crate) fn needs_repair(&self) -> bool {
        self.role.is_some() && self.health < self.max_power()
    }

    /// Verifies that `value` is a legal power level given the reactor slack.
    pub(crate) fn check_power(&self, value: u32, usable: u32) -> Result<(), PowerError> {
        if self.role.is_none() {
            return Err(PowerError::NotASystem);
        }
        if value > self.max_power() {
            return Err(PowerError::OutOfRange);
        }
        if value > self.health {
            return Err(PowerError::ExceedsHealth);
        }
        if value > self.power && value - self.power > usable {
            return Err(PowerError::InsufficientPower);
        }
        Ok(())
    }

    /// Stores a power level previously accepted by [`Room::check_power`].
    pub(crate) fn commit_power(&mut self, value: u32) {
        debug_assert!(value <= self.health, "power must never exceed health");
        self.power = value.min(self.health);
    }

    /// Clamps and stores the room's health, returning the power now in excess.
    pub(crate) fn set_health(&mut self, value: u32) -> u32 {
        self.health = value.min(self.max_power());
        self.power.saturating_sub(self.health)
    }

    /// Returns power drawn by an unpowered upgrade to the reactor.
    pub(crate) fn release_power(&mut self, amount: u32) {
        self.power = self.power.saturating_sub(amount);
    }

    pub(crate) fn clamp_power_to_health(&mut self) {
        self.power = self.power.min(self.health);
    }

    pub(crate) fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.iter().any(|tile| tile.coord == coord)
    }

    pub(crate) fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.coord == coord)
    }

    pub(crate) fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|tile| tile.coord == coord)
    }

    pub(crate) fn first_free_tile(&self) -> Option<TileCoord> {
        self.tiles
            .iter()
            .find(|tile| tile.is_free())
            .map(|tile| tile.coord)
    }

    /// Upper-left and lower-right pixel corners of the room's footprint.
    pub(crate) fn pixel_bounds(&self, tile_size: f32) -> (Vec2, Vec2) {
        let min = Vec2::new(self.rect.left() as f32, self.rect.top() as f32) * tile_size;
        let max = Vec2::new(self.rect.right() as f32, self.rect.bottom() as f32) * tile_size;
        (min, max)
    }

    pub(crate) fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            rect: self.rect,
            role: self.role,
            level: self.level,
            power: self.power,
            health: self.health,
            max_power: self.max_power(),
            status: self.status(),
            targeted_by: self.targeted_by.clone(),
        }
    }
}

/// Pixel centre of a tile in its ship's local frame.
pub(crate) fn tile_center(coord: TileCoord, tile_size: f32) -> Vec2 {
    Vec2::new(coord.column() as f32 + 0.5, coord.row() as f32 + 0.5) * tile_size
}
