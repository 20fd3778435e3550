//! Crew members, their movement queues and repair work.

use std::collections::VecDeque;

use glam::Vec2;
use into_the_light_core::{
    CrewActivity, CrewId, CrewSnapshot, Direction, PixelPoint, Race, TileCoord,
};

use crate::room::tile_center;

#[derive(Clone, Debug)]
pub(crate) struct Crewmate {
    pub(crate) id: CrewId,
    pub(crate) name: String,
    pub(crate) race: Race,
    pub(crate) position: Vec2,
    /// Tile held while stationed; `None` while walking.
    pub(crate) occupied: Option<TileCoord>,
    pub(crate) queue: VecDeque<TileCoord>,
    pub(crate) moving_to: Option<TileCoord>,
    pub(crate) heading: Direction,
    pub(crate) repairing: bool,
    pub(crate) selected: bool,
    pub(crate) hovering: bool,
}

/// Result of advancing a crewmate along its queue for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stride {
    Idle,
    Walking,
    Arrived(TileCoord),
}

impl Crewmate {
    pub(crate) fn stationed(
        id: CrewId,
        name: String,
        race: Race,
        tile: TileCoord,
        tile_size: f32,
    ) -> Self {
        Self {
            id,
            name,
            race,
            position: tile_center(tile, tile_size),
            occupied: Some(tile),
            queue: VecDeque::new(),
            moving_to: None,
            heading: Direction::Down,
            repairing: false,
            selected: false,
            hovering: false,
        }
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.moving_to.is_some()
    }

    /// Tile a new route should start from: the next queued tile while walking.
    pub(crate) fn route_origin(&self) -> Option<TileCoord> {
        if self.is_moving() {
            self.queue.front().copied()
        } else {
            self.occupied
        }
    }

    /// Replaces the movement queue. The caller releases the held tile.
    pub(crate) fn assign_route(&mut self, route: VecDeque<TileCoord>, destination: TileCoord) {
        self.queue = route;
        self.moving_to = Some(destination);
        self.occupied = None;
        self.repairing = false;
    }

    /// Moves toward the next queued tile centre, settling the x axis first.
    pub(crate) fn advance(&mut self, dt: f32, speed: f32, tile_size: f32) -> Stride {
        let Some(destination) = self.moving_to else {
            return Stride::Idle;
        };
        let Some(next) = self.queue.front().copied() else {
            return self.arrive(destination);
        };

        let target = tile_center(next, tile_size);
        let budget = speed * dt;
        if self.position.x != target.x {
            let delta = target.x - self.position.x;
            self.heading = if delta > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            };
            self.position.x += delta.clamp(-budget, budget);
        } else if self.position.y != target.y {
            let delta = target.y - self.position.y;
            self.heading = if delta > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            };
            self.position.y += delta.clamp(-budget, budget);
        }

        if self.position == target {
            let _ = self.queue.pop_front();
            if self.queue.is_empty() {
                return self.arrive(destination);
            }
        }
        Stride::Walking
    }

    fn arrive(&mut self, destination: TileCoord) -> Stride {
        self.queue.clear();
        self.moving_to = None;
        self.occupied = Some(destination);
        Stride::Arrived(destination)
    }

    pub(crate) fn activity(&self) -> CrewActivity {
        if self.is_moving() {
            CrewActivity::Moving(self.heading)
        } else if self.repairing {
            CrewActivity::Repairing
        } else {
            CrewActivity::Idle
        }
    }

    pub(crate) fn snapshot(&self) -> CrewSnapshot {
        CrewSnapshot {
            id: self.id,
            name: self.name.clone(),
            race: self.race,
            position: PixelPoint::new(self.position.x, self.position.y),
            occupied_tile: self.occupied,
            moving_to: self.moving_to,
            activity: self.activity(),
            selected: self.selected,
            hovering: self.hovering,
        }
    }
}
