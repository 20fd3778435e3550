//! Door network construction and door actuation.

use glam::Vec2;
use into_the_light_core::{DoorId, DoorSnapshot, PixelPoint, RoomId, TileCoord};

use crate::room::{tile_center, Room};

#[derive(Clone, Debug)]
pub(crate) struct Door {
    pub(crate) id: DoorId,
    pub(crate) rooms: (RoomId, RoomId),
    pub(crate) tiles: (TileCoord, TileCoord),
    pub(crate) position: Vec2,
    pub(crate) vertical: bool,
    opened: bool,
    /// Seconds until an auto-opened door closes; `None` keeps it as is.
    close_timer: Option<f32>,
}

impl Door {
    pub(crate) const fn opened(&self) -> bool {
        self.opened
    }

    /// Opens the door for passing crew and restarts its close timer.
    pub(crate) fn open_for_passage(&mut self, close_delay: f32) {
        self.opened = true;
        self.close_timer = Some(close_delay);
    }

    /// Flips the door; a manually opened door stays open until toggled again.
    pub(crate) fn toggle(&mut self) -> bool {
        self.opened = !self.opened;
        self.close_timer = None;
        self.opened
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if let Some(remaining) = self.close_timer.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.opened = false;
                self.close_timer = None;
            }
        }
    }

    pub(crate) fn snapshot(&self) -> DoorSnapshot {
        DoorSnapshot {
            id: self.id,
            rooms: self.rooms,
            tiles: self.tiles,
            position: PixelPoint::new(self.position.x, self.position.y),
            vertical: self.vertical,
            opened: self.opened(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Contact {
    Horizontal,
    Vertical,
}

/// Detects which edge, if any, two rooms share.
fn contact(a: &Room, b: &Room) -> Option<Contact> {
    let rows_overlap = b.rect.top() < a.rect.bottom() && b.rect.bottom() > a.rect.top();
    let columns_overlap = b.rect.left() < a.rect.right() && b.rect.right() > a.rect.left();

    if (a.rect.left() == b.rect.right() || a.rect.right() == b.rect.left()) && rows_overlap {
        Some(Contact::Vertical)
    } else if (a.rect.top() == b.rect.bottom() || a.rect.bottom() == b.rect.top())
        && columns_overlap
    {
        Some(Contact::Horizontal)
    } else {
        None
    }
}

/// Closest pair of tiles between two rooms by Manhattan distance.
fn closest_tiles(a: &Room, b: &Room) -> Option<(TileCoord, TileCoord)> {
    let mut best: Option<(u32, TileCoord, TileCoord)> = None;
    for first in &a.tiles {
        for second in &b.tiles {
            let distance = first.coord.manhattan_distance(second.coord);
            if best.map_or(true, |(closest, _, _)| distance < closest) {
                best = Some((distance, first.coord, second.coord));
            }
        }
    }
    best.map(|(_, first, second)| (first, second))
}

/// Links every pair of edge-adjacent rooms with exactly one door.
///
/// The facing tile pair is recorded in both rooms' adjacency maps, reversed
/// for the neighbour.
pub(crate) fn build_doors(rooms: &mut [Room], tile_size: f32) -> Vec<Door> {
    let mut doors = Vec::new();

    for first in 0..rooms.len() {
        for second in (first + 1)..rooms.len() {
            let Some(orientation) = contact(&rooms[first], &rooms[second]) else {
                continue;
            };
            let Some((own, theirs)) = closest_tiles(&rooms[first], &rooms[second]) else {
                continue;
            };

            let first_id = rooms[first].id;
            let second_id = rooms[second].id;
            let _ = rooms[first].adjacent.insert(second_id, (own, theirs));
            let _ = rooms[second].adjacent.insert(first_id, (theirs, own));

            let position = (tile_center(own, tile_size) + tile_center(theirs, tile_size)) * 0.5;
            let id = DoorId::new(u32::try_from(doors.len()).unwrap_or(u32::MAX));
            doors.push(Door {
                id,
                rooms: (first_id, second_id),
                tiles: (own, theirs),
                position,
                vertical: orientation == Contact::Vertical,
                opened: false,
                close_timer: None,
            });
        }
    }

    doors
}
