//! Tunable constants that drive the battle simulation.

use serde::{Deserialize, Serialize};

use crate::layout::ConfigurationError;

/// Strategy used to pick the sequence of rooms a crewmate walks through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Hops to the neighbouring room whose door is closest to the destination.
    ///
    /// Rooms already visited are skipped; when the greedy walk dead-ends a
    /// breadth-first room route is used instead.
    #[default]
    Greedy,
    /// Runs Dijkstra over the door graph and always takes the shortest route.
    Shortest,
}

/// Resources carried by the player between battles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Jump fuel.
    pub fuel: u32,
    /// Missile ammunition.
    pub missiles: u32,
    /// Drone parts.
    pub drones: u32,
    /// Scrap currency.
    pub scrap: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            fuel: 16,
            missiles: 8,
            drones: 2,
            scrap: 10,
        }
    }
}

/// Every tunable of the simulation.
///
/// All fields carry defaults, so configuration files only need to name the
/// values they override. Times are in seconds, distances in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side length of a ship tile.
    pub tile_size: f32,
    /// Charge units a powered weapon gains per second.
    pub weapon_charge_speed: f32,
    /// Progress units a shield gains per second toward its next bubble.
    pub shield_charge_change: f32,
    /// Progress units required to raise one shield bubble.
    pub shield_charge_time: f32,
    /// Distance between the hull outline and the shield ellipse.
    pub shield_margin: f32,
    /// Crew walking speed.
    pub crew_speed: f32,
    /// Health units a stationed crewmate repairs per second.
    pub crew_repair_speed: f32,
    /// Seconds a door stays open after a crewmate passed through it.
    pub door_close_delay: f32,
    /// Radius around a door centre that opens it for walking crew.
    pub door_proximity: f32,
    /// Distance outside a ship's bounds where projectiles change screens.
    pub screen_margin: f32,
    /// Maximum offset applied to the revealed aim point.
    pub aim_jitter: f32,
    /// Distance a missed projectile keeps flying past its aim point.
    pub miss_deflection: f32,
    /// Evasion chance granted by powered engines.
    pub evade_base: u32,
    /// Additional evasion chance per unit of engine power.
    pub evade_per_engine_power: u32,
    /// Seconds between a ship's destruction and its removal.
    pub destruction_countdown: f32,
    /// Player reactor output per engine level.
    pub reactor_power_per_engine_level: u32,
    /// Fixed enemy reactor output.
    pub enemy_reactor_power: u32,
    /// Player hull points.
    pub player_hull: u32,
    /// Lowest hull an enemy ship can spawn with.
    pub enemy_hull_min: u32,
    /// Highest hull an enemy ship can spawn with.
    pub enemy_hull_max: u32,
    /// Fraction of the starting hull at which the enemy gives up.
    pub resign_hull_fraction: f32,
    /// Crew routing strategy.
    pub routing: RoutingStrategy,
    /// Seed for the world's random number generator.
    pub seed: u64,
    /// Player inventory at the start of a session.
    pub inventory: InventoryConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            weapon_charge_speed: 15.0,
            shield_charge_change: 50.0,
            shield_charge_time: 100.0,
            shield_margin: 24.0,
            crew_speed: 60.0,
            crew_repair_speed: 0.2,
            door_close_delay: 1.0,
            door_proximity: 10.0,
            screen_margin: 48.0,
            aim_jitter: 8.0,
            miss_deflection: 240.0,
            evade_base: 10,
            evade_per_engine_power: 5,
            destruction_countdown: 3.0,
            reactor_power_per_engine_level: 3,
            enemy_reactor_power: 100,
            player_hull: 30,
            enemy_hull_min: 6,
            enemy_hull_max: 20,
            resign_hull_fraction: 0.25,
            routing: RoutingStrategy::Greedy,
            seed: 0x1f7a_55c3_0e91_d24b,
            inventory: InventoryConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Rejects values the simulation cannot run with.
    ///
    /// Sizes, speeds and charge rates must be positive; offsets, margins and
    /// delays may be zero. Every float must be finite.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let positive = [
            ("tile_size", self.tile_size),
            ("weapon_charge_speed", self.weapon_charge_speed),
            ("shield_charge_change", self.shield_charge_change),
            ("shield_charge_time", self.shield_charge_time),
            ("crew_speed", self.crew_speed),
        ];
        let non_negative = [
            ("shield_margin", self.shield_margin),
            ("crew_repair_speed", self.crew_repair_speed),
            ("door_close_delay", self.door_close_delay),
            ("door_proximity", self.door_proximity),
            ("screen_margin", self.screen_margin),
            ("aim_jitter", self.aim_jitter),
            ("miss_deflection", self.miss_deflection),
            ("destruction_countdown", self.destruction_countdown),
            ("resign_hull_fraction", self.resign_hull_fraction),
        ];
        let invalid = positive
            .iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
            .or_else(|| {
                non_negative
                    .iter()
                    .find(|(_, value)| !value.is_finite() || *value < 0.0)
            });
        if let Some(&(name, _)) = invalid {
            return Err(ConfigurationError::InvalidSetting(name));
        }
        if self.enemy_hull_min > self.enemy_hull_max {
            return Err(ConfigurationError::InvalidHullRange {
                min: self.enemy_hull_min,
                max: self.enemy_hull_max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RoutingStrategy, SimulationConfig};
    use crate::layout::ConfigurationError;

    #[test]
    fn partial_toml_overrides_keep_remaining_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            player_hull = 12
            routing = "shortest"

            [inventory]
            scrap = 40
            "#,
        )
        .expect("config parses");

        assert_eq!(config.player_hull, 12);
        assert_eq!(config.routing, RoutingStrategy::Shortest);
        assert_eq!(config.inventory.scrap, 40);
        assert_eq!(config.inventory.fuel, 16);
        assert_eq!(config.tile_size, 32.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_speeds_and_negative_offsets_are_rejected() {
        let config = SimulationConfig {
            weapon_charge_speed: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvalidSetting("weapon_charge_speed"))
        );

        let config = SimulationConfig {
            aim_jitter: -1.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvalidSetting("aim_jitter"))
        );

        let config = SimulationConfig {
            aim_jitter: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }
}
