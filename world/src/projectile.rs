//! Projectile ballistics across the two battle screens.

use glam::Vec2;
use into_the_light_core::{
    PixelPoint, ProjectileKind, ProjectileSnapshot, RoomRef, ShipSide, WeaponSpec,
};

/// Phase reached by a projectile after one flight step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    Pending,
    Travelling,
    ReachedExit,
    ReachedTarget,
}

/// Finite line segment flying toward a target room.
///
/// The first leg runs in the attacker's frame toward an exit point beyond its
/// hull. Once there it switches to the defender's frame and flies toward the
/// revealed aim point inside the target room.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) owner: ShipSide,
    pub(crate) kind: ProjectileKind,
    pub(crate) target: RoomRef,
    pub(crate) damage: u32,
    start: Vec2,
    end: Vec2,
    target_pos: Vec2,
    pub(crate) future_pos: Vec2,
    speed: f32,
    length: f32,
    delay: f32,
    pub(crate) switched_screens: bool,
    pub(crate) hit_target: bool,
    pub(crate) missed: bool,
}

impl Projectile {
    pub(crate) fn launch(
        owner: ShipSide,
        spec: &WeaponSpec,
        mount: Vec2,
        exit: Vec2,
        future_pos: Vec2,
        target: RoomRef,
        delay: f32,
    ) -> Self {
        Self {
            owner,
            kind: spec.projectile,
            target,
            damage: spec.damage,
            start: mount,
            end: mount,
            target_pos: exit,
            future_pos,
            speed: spec.speed,
            length: spec.length,
            delay,
            switched_screens: false,
            hit_target: false,
            missed: false,
        }
    }

    /// Leading point of the line, used for collision tests.
    pub(crate) const fn end(&self) -> Vec2 {
        self.end
    }

    pub(crate) fn step(&mut self, dt: f32) -> Flight {
        if self.delay > 0.0 {
            self.delay -= dt;
            return Flight::Pending;
        }

        let offset = self.target_pos - self.end;
        let distance = offset.length();
        let travel = self.speed * dt;
        let direction = offset.normalize_or_zero();
        if travel >= distance {
            self.end = self.target_pos;
        } else {
            self.end += direction * travel;
        }
        if direction != Vec2::ZERO {
            self.start = self.end - direction * self.length;
        }

        if self.end != self.target_pos {
            Flight::Travelling
        } else if self.switched_screens {
            Flight::ReachedTarget
        } else {
            Flight::ReachedExit
        }
    }

    /// Moves the projectile onto the defender's screen.
    pub(crate) fn switch_screens(&mut self, entry: Vec2, aim: Vec2) {
        let direction = (aim - entry).normalize_or_zero();
        self.switched_screens = true;
        self.end = entry;
        self.start = entry - direction * self.length;
        self.target_pos = aim;
    }

    /// Marks the projectile as evaded and sends it past its aim point.
    pub(crate) fn deflect(&mut self, distance: f32) {
        let direction = (self.end - self.start).normalize_or_zero();
        self.missed = true;
        self.target_pos = self.end + direction * distance;
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            owner: self.owner,
            kind: self.kind,
            start: PixelPoint::new(self.start.x, self.start.y),
            end: PixelPoint::new(self.end.x, self.end.y),
            target: self.target,
            switched_screens: self.switched_screens,
            missed: self.missed,
            pending_launch: self.delay > 0.0,
        }
    }
}
