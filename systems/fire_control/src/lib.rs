#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fires charged weapons holding a live target.

use into_the_light_core::{Command, ShipView, WeaponRef, WeaponState};

/// Fire control computer for one ship.
#[derive(Debug, Default)]
pub struct FireControl {
    fired: Vec<WeaponRef>,
}

impl FireControl {
    /// Creates a new fire control system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a `FireWeapon` command for every ready weapon aimed at `opponent`.
    ///
    /// Weapons whose target belongs to another ship, or to a wreck, are left
    /// alone.
    pub fn handle(&mut self, own: &ShipView, opponent: Option<&ShipView>, out: &mut Vec<Command>) {
        self.fired.clear();
        if own.destroyed {
            return;
        }
        let Some(opponent) = opponent.filter(|opponent| !opponent.destroyed) else {
            return;
        };

        for weapon in &own.weapons {
            if weapon.state != WeaponState::Ready {
                continue;
            }
            let Some(target) = weapon.target else {
                continue;
            };
            if target.ship != opponent.side || opponent.room(target.room).is_none() {
                continue;
            }
            self.fired.push(weapon.weapon);
            out.push(Command::FireWeapon {
                weapon: weapon.weapon,
            });
        }
    }

    /// Weapons ordered to fire by the most recent call to [`FireControl::handle`].
    #[must_use]
    pub fn fired(&self) -> &[WeaponRef] {
        &self.fired
    }
}
