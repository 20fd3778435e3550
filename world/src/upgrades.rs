//! Upgrade slots and the weapons, thrusters and shields mounted in them.

use glam::Vec2;
use into_the_light_core::{
    Orientation, RoomRef, ShieldKind, ThrusterKind, WeaponKind, WeaponSpec, WeaponState,
};

use crate::shield_mask::ShieldMask;

/// Mount point on a room's perimeter.
#[derive(Clone, Debug)]
pub(crate) enum UpgradeSlot {
    Empty { orientation: Orientation },
    Weapon(Weapon),
    Thruster(Thruster),
    Shield(Shield),
}

impl UpgradeSlot {
    pub(crate) fn weapon(&self) -> Option<&Weapon> {
        match self {
            Self::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub(crate) fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        match self {
            Self::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub(crate) fn shield(&self) -> Option<&Shield> {
        match self {
            Self::Shield(shield) => Some(shield),
            _ => None,
        }
    }

    pub(crate) fn shield_mut(&mut self) -> Option<&mut Shield> {
        match self {
            Self::Shield(shield) => Some(shield),
            _ => None,
        }
    }

    pub(crate) fn orientation(&self) -> Orientation {
        match self {
            Self::Empty { orientation } => *orientation,
            Self::Weapon(weapon) => weapon.orientation,
            Self::Thruster(thruster) => thruster.orientation,
            Self::Shield(shield) => shield.orientation,
        }
    }
}

/// Pixel position of a slot mounted on the given edge of a room.
pub(crate) fn mount_point(min: Vec2, max: Vec2, orientation: Orientation) -> Vec2 {
    let center = (min + max) * 0.5;
    match orientation {
        Orientation::Top => Vec2::new(center.x, min.y),
        Orientation::Right => Vec2::new(max.x, center.y),
        Orientation::Bottom => Vec2::new(center.x, max.y),
        Orientation::Left => Vec2::new(min.x, center.y),
    }
}

/// Weapon mounted in a slot together with its charge state machine.
#[derive(Clone, Debug)]
pub(crate) struct Weapon {
    pub(crate) kind: WeaponKind,
    pub(crate) orientation: Orientation,
    pub(crate) mount: Vec2,
    state: WeaponState,
    charge_level: f32,
    pub(crate) target: Option<RoomRef>,
}

impl Weapon {
    pub(crate) fn new(kind: WeaponKind, orientation: Orientation, mount: Vec2) -> Self {
        Self {
            kind,
            orientation,
            mount,
            state: WeaponState::Disabled,
            charge_level: 0.0,
            target: None,
        }
    }

    pub(crate) fn spec(&self) -> WeaponSpec {
        self.kind.spec()
    }

    pub(crate) const fn state(&self) -> WeaponState {
        self.state
    }

    pub(crate) const fn charge_level(&self) -> f32 {
        self.charge_level
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state != WeaponState::Disabled
    }

    /// Powers the weapon; charging restarts from zero.
    pub(crate) fn activate(&mut self) {
        self.state = WeaponState::Charging;
        self.charge_level = 0.0;
    }

    /// Unpowers the weapon and drops its target.
    pub(crate) fn disable(&mut self) -> Option<RoomRef> {
        self.state = WeaponState::Disabled;
        self.target.take()
    }

    /// Advances charge; returns `true` when the weapon just became ready.
    pub(crate) fn update(&mut self, dt: f32, charge_speed: f32) -> bool {
        let step = charge_speed * dt;
        match self.state {
            WeaponState::Charging => {
                let charge_time = self.spec().charge_time;
                self.charge_level += step;
                if self.charge_level >= charge_time {
                    self.charge_level = charge_time;
                    self.state = WeaponState::Ready;
                    return true;
                }
                false
            }
            WeaponState::Disabled => {
                self.charge_level = (self.charge_level - step).max(0.0);
                false
            }
            WeaponState::Ready => false,
        }
    }

    /// Resets the charge cycle after a volley left the weapon.
    pub(crate) fn discharge(&mut self) {
        debug_assert_eq!(self.state, WeaponState::Ready);
        self.state = WeaponState::Charging;
        self.charge_level = 0.0;
    }
}

/// Engine exhaust mounted in a slot.
#[derive(Clone, Debug)]
pub(crate) struct Thruster {
    pub(crate) kind: ThrusterKind,
    pub(crate) orientation: Orientation,
    pub(crate) mount: Vec2,
}

/// Shield generator and its bubble charge.
#[derive(Clone, Debug)]
pub(crate) struct Shield {
    pub(crate) kind: ShieldKind,
    pub(crate) orientation: Orientation,
    charge: u32,
    progress: f32,
    pub(crate) mask: ShieldMask,
}

impl Shield {
    pub(crate) fn new(kind: ShieldKind, orientation: Orientation, mask: ShieldMask) -> Self {
        Self {
            kind,
            orientation,
            charge: 0,
            progress: 0.0,
            mask,
        }
    }

    pub(crate) const fn charge(&self) -> u32 {
        self.charge
    }

    pub(crate) const fn progress(&self) -> f32 {
        self.progress
    }

    /// Drops every bubble and any partial progress.
    pub(crate) fn reset(&mut self) {
        self.charge = 0;
        self.progress = 0.0;
    }

    /// Regenerates bubbles toward `max_charge`, clamping immediately above it.
    pub(crate) fn update(&mut self, dt: f32, max_charge: u32, charge_change: f32, charge_time: f32) {
        if self.charge > max_charge {
            self.charge = max_charge;
            self.progress = 0.0;
            return;
        }
        if self.charge == max_charge {
            self.progress = 0.0;
            return;
        }
        self.progress += dt * charge_change;
        if self.progress >= charge_time {
            self.charge += 1;
            self.progress = 0.0;
        }
    }

    /// Consumes one bubble if the point lands inside an active shield.
    pub(crate) fn try_absorb(&mut self, point: Vec2) -> bool {
        if self.charge == 0 || !self.mask.contains(point) {
            return false;
        }
        self.charge -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_report_the_edge_they_are_mounted_on() {
        let empty = UpgradeSlot::Empty {
            orientation: Orientation::Left,
        };
        assert_eq!(empty.orientation(), Orientation::Left);
        assert!(empty.weapon().is_none());

        let laser = UpgradeSlot::Weapon(Weapon::new(
            WeaponKind::LaserMk1,
            Orientation::Bottom,
            Vec2::ZERO,
        ));
        assert_eq!(laser.orientation(), Orientation::Bottom);
        assert!(laser.weapon().is_some());
    }

    #[test]
    fn laser_is_ready_after_seventh_second() {
        let mut weapon = Weapon::new(WeaponKind::LaserMk1, Orientation::Top, Vec2::ZERO);
        weapon.activate();
        for _ in 0..6 {
            assert!(!weapon.update(1.0, 15.0));
        }
        assert_eq!(weapon.state(), WeaponState::Charging);
        assert!(weapon.update(1.0, 15.0));
        assert_eq!(weapon.state(), WeaponState::Ready);
        assert_eq!(weapon.charge_level(), 100.0);
        assert!(!weapon.update(1.0, 15.0));
    }

    #[test]
    fn disabled_weapon_decays_without_firing() {
        let mut weapon = Weapon::new(WeaponKind::LaserMk1, Orientation::Top, Vec2::ZERO);
        weapon.activate();
        let _ = weapon.update(4.0, 15.0);
        let _ = weapon.disable();
        let _ = weapon.update(1.0, 15.0);
        assert_eq!(weapon.charge_level(), 45.0);
        let _ = weapon.update(10.0, 15.0);
        assert_eq!(weapon.charge_level(), 0.0);
        assert_eq!(weapon.state(), WeaponState::Disabled);
    }

    #[test]
    fn shield_raises_one_bubble_per_charge_time() {
        let mask = ShieldMask::enclosing(Vec2::ZERO, Vec2::splat(64.0), 4.0);
        let mut shield = Shield::new(ShieldKind::ShieldMk1, Orientation::Right, mask);
        shield.update(1.0, 2, 50.0, 100.0);
        assert_eq!(shield.charge(), 0);
        shield.update(1.0, 2, 50.0, 100.0);
        assert_eq!(shield.charge(), 1);
        shield.update(1.0, 0, 50.0, 100.0);
        assert_eq!(shield.charge(), 0);
    }

    #[test]
    fn empty_shield_never_absorbs() {
        let mask = ShieldMask::enclosing(Vec2::ZERO, Vec2::splat(64.0), 4.0);
        let mut shield = Shield::new(ShieldKind::ShieldMk1, Orientation::Right, mask);
        assert!(!shield.try_absorb(Vec2::splat(32.0)));
        shield.update(2.0, 1, 50.0, 100.0);
        assert!(shield.try_absorb(Vec2::splat(32.0)));
        assert_eq!(shield.charge(), 0);
    }

    #[test]
    fn mount_points_sit_on_room_edges() {
        let min = Vec2::new(0.0, 0.0);
        let max = Vec2::new(64.0, 32.0);
        assert_eq!(mount_point(min, max, Orientation::Top), Vec2::new(32.0, 0.0));
        assert_eq!(mount_point(min, max, Orientation::Right), Vec2::new(64.0, 16.0));
        assert_eq!(mount_point(min, max, Orientation::Bottom), Vec2::new(32.0, 32.0));
        assert_eq!(mount_point(min, max, Orientation::Left), Vec2::new(0.0, 16.0));
    }
}
