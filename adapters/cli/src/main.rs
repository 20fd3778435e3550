#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that fights a headless Into The Light battle.

mod battle;
mod logger;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use into_the_light_core::ShipSide;
use into_the_light_world::{
    query, LayoutSet, SimulationConfig, World, DEFAULT_ENEMY_LAYOUT, DEFAULT_PLAYER_LAYOUT,
};
use serde::Deserialize;

use crate::{
    battle::{Battle, Outcome},
    logger::Logger,
};

/// Runs an autopiloted battle between two ships and prints the result.
#[derive(Debug, Parser)]
#[command(name = "into-the-light", version)]
struct Args {
    /// Layout flown by the player.
    #[arg(long, default_value = DEFAULT_PLAYER_LAYOUT)]
    player: String,
    /// Layout flown by the enemy.
    #[arg(long, default_value = DEFAULT_ENEMY_LAYOUT)]
    enemy: String,
    /// Maximum number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,
    /// Simulated milliseconds per tick.
    #[arg(long)]
    dt_ms: Option<u64>,
    /// Seed overriding the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with simulation and battle settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML file with additional ship layouts.
    #[arg(long)]
    layouts: Option<PathBuf>,
    /// Increases log output; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Contents of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    simulation: SimulationConfig,
    battle: BattleSettings,
}

/// Battle length settings, overridden by the command line.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct BattleSettings {
    ticks: u32,
    dt_ms: u64,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            ticks: 36_000,
            dt_ms: 16,
        }
    }
}

/// Entry point for the Into The Light command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(logger::level_for(args.verbose))
        .map_err(|error| anyhow!("failed to install logger: {error}"))?;

    let mut file = match &args.config {
        Some(path) => read_toml::<ConfigFile>(path)?,
        None => ConfigFile::default(),
    };
    if let Some(seed) = args.seed {
        file.simulation.seed = seed;
    }
    let layouts = match &args.layouts {
        Some(path) => read_toml::<LayoutSet>(path)?,
        None => LayoutSet::default(),
    };

    let player = layouts
        .resolve(&args.player)
        .with_context(|| format!("player layout `{}`", args.player))?;
    let enemy = layouts
        .resolve(&args.enemy)
        .with_context(|| format!("enemy layout `{}`", args.enemy))?;

    let mut world = World::new(file.simulation, &player).context("failed to assemble player")?;
    world
        .spawn_enemy(&enemy)
        .context("failed to assemble enemy")?;
    let enemy_hull = query::ship_view(&world, ShipSide::Enemy).map_or(0, |view| view.max_hull);

    let ticks = args.ticks.unwrap_or(file.battle.ticks);
    let dt = Duration::from_millis(args.dt_ms.unwrap_or(file.battle.dt_ms));
    let mut battle = Battle::new(world);
    let outcome = battle.run(ticks, dt);

    print_summary(&battle, outcome, dt, enemy_hull);
    Ok(())
}

fn read_toml<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_summary(battle: &Battle, outcome: Outcome, dt: Duration, enemy_hull: u32) {
    let world = battle.world();
    let elapsed = dt.as_secs_f64() * f64::from(battle.ticks());
    match outcome {
        Outcome::EnemyDefeated { loot } => {
            println!("Enemy destroyed after {elapsed:.1}s, salvaged {loot} scrap.");
        }
        Outcome::PlayerDestroyed => println!("Player destroyed after {elapsed:.1}s."),
        Outcome::TimeLimit => println!("No decision after {elapsed:.1}s."),
    }

    if let Some(player) = query::ship_view(world, ShipSide::Player) {
        println!(
            "Player {}: hull {}/{}, power {}/{}",
            player.layout, player.hull, player.max_hull, player.current_power, player.max_power
        );
    }
    match query::ship_view(world, ShipSide::Enemy) {
        Some(enemy) => println!(
            "Enemy {}: hull {}/{}{}",
            enemy.layout,
            enemy.hull,
            enemy.max_hull,
            if enemy.resigning { ", resigning" } else { "" }
        ),
        None => println!("Enemy removed (starting hull {enemy_hull})."),
    }

    let inventory = query::inventory(world);
    println!(
        "Inventory: fuel {}, missiles {}, drones {}, scrap {}",
        inventory.fuel(),
        inventory.missiles(),
        inventory.drones(),
        inventory.scrap()
    );
}
