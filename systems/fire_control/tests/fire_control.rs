use std::time::Duration;

use into_the_light_core::{Command, Event, RoomId, RoomRef, ShipSide, WeaponKind, WeaponRef};
use into_the_light_system_fire_control::FireControl;
use into_the_light_world::{self as world, builtin, query, SimulationConfig, World};

fn armed_world() -> (World, WeaponRef) {
    let mut world = World::new(
        SimulationConfig::default(),
        &builtin("scout").expect("scout"),
    )
    .expect("world");
    world
        .spawn_enemy(&builtin("cruiser").expect("cruiser"))
        .expect("enemy");

    let weapon = query::ship_view(&world, ShipSide::Player)
        .expect("player")
        .weapons
        .iter()
        .find(|weapon| weapon.kind == WeaponKind::LaserMk1)
        .map(|weapon| weapon.weapon)
        .expect("laser");

    let mut events = Vec::new();
    world::apply(&mut world, Command::ActivateWeapon { weapon }, &mut events);
    (world, weapon)
}

fn tick_seconds(world: &mut World, seconds: u64) {
    let mut events = Vec::new();
    for _ in 0..seconds {
        world::apply(
            world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
    }
}

fn plan(world: &World, fire_control: &mut FireControl) -> Vec<Command> {
    let own = query::ship_view(world, ShipSide::Player).expect("player");
    let opponent = query::ship_view(world, ShipSide::Enemy);
    let mut commands = Vec::new();
    fire_control.handle(&own, opponent.as_ref(), &mut commands);
    commands
}

#[test]
fn charging_weapons_hold_fire() {
    let (mut world, weapon) = armed_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::TargetRoom {
            weapon,
            target: RoomRef::new(ShipSide::Enemy, RoomId::new(2)),
        },
        &mut events,
    );
    tick_seconds(&mut world, 3);

    let mut fire_control = FireControl::new();
    assert!(plan(&world, &mut fire_control).is_empty());
    assert!(fire_control.fired().is_empty());
}

#[test]
fn ready_weapons_without_target_hold_fire() {
    let (mut world, _) = armed_world();
    tick_seconds(&mut world, 7);
    assert!(plan(&world, &mut FireControl::new()).is_empty());
}

#[test]
fn ready_targeted_weapon_is_fired() {
    let (mut world, weapon) = armed_world();
    let target = RoomRef::new(ShipSide::Enemy, RoomId::new(2));
    let mut events = Vec::new();
    world::apply(&mut world, Command::TargetRoom { weapon, target }, &mut events);
    tick_seconds(&mut world, 7);

    let mut fire_control = FireControl::new();
    let commands = plan(&world, &mut fire_control);
    assert_eq!(commands, vec![Command::FireWeapon { weapon }]);
    assert_eq!(fire_control.fired(), &[weapon]);

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(
        events.first(),
        Some(&Event::WeaponFired {
            weapon,
            target,
            shots: 1,
        })
    );
}

#[test]
fn removed_enemy_silences_fire_control() {
    let (mut world, weapon) = armed_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::TargetRoom {
            weapon,
            target: RoomRef::new(ShipSide::Enemy, RoomId::new(2)),
        },
        &mut events,
    );
    world::apply(&mut world, Command::RemoveEnemy, &mut events);
    tick_seconds(&mut world, 7);

    assert!(plan(&world, &mut FireControl::new()).is_empty());
}
