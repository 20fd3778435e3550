use std::time::Duration;

use into_the_light_core::{
    Command, CrewError, CrewId, Event, PowerError, PowerStep, Role, RoomId, RoomRef, ShipSide,
    ShipView, TileCoord, WeaponKind, WeaponRef, WeaponState,
};
use into_the_light_world::{
    self as world, builtin, query, ShipLayout, SimulationConfig, World, DEFAULT_ENEMY_LAYOUT,
    DEFAULT_PLAYER_LAYOUT,
};

fn battle() -> World {
    battle_with(
        SimulationConfig::default(),
        &builtin(DEFAULT_PLAYER_LAYOUT).expect("player layout"),
    )
}

fn battle_with(config: SimulationConfig, player: &ShipLayout) -> World {
    let mut world = World::new(config, player).expect("world");
    world
        .spawn_enemy(&builtin(DEFAULT_ENEMY_LAYOUT).expect("enemy layout"))
        .expect("enemy");
    world
}

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    send(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    )
}

fn view(world: &World, side: ShipSide) -> ShipView {
    query::ship_view(world, side).expect("ship present")
}

fn power_up(world: &mut World, ship: ShipSide, role: Role, steps: usize) {
    for _ in 0..steps {
        let events = send(
            world,
            Command::ChangeSystemPower {
                ship,
                role,
                step: PowerStep::Increase,
            },
        );
        assert!(
            matches!(events.as_slice(), [Event::PowerChanged { .. }]),
            "{role:?} power request failed: {events:?}"
        );
    }
}

/// Powers the weapon, waits for it to charge and shoots it at `target`.
fn charge_and_fire(world: &mut World, weapon: WeaponRef, target: RoomRef) {
    let _ = send(world, Command::ActivateWeapon { weapon });
    let mut ready = false;
    for _ in 0..30 {
        if tick(world, 1_000).contains(&Event::WeaponReady { weapon }) {
            ready = true;
            break;
        }
    }
    assert!(ready, "{weapon:?} never charged");

    let events = send(world, Command::TargetRoom { weapon, target });
    assert_eq!(events, vec![Event::TargetAssigned { weapon, target }]);
    let events = send(world, Command::FireWeapon { weapon });
    assert!(matches!(events.first(), Some(Event::WeaponFired { .. })));
}

/// Ticks long enough for every projectile in flight to resolve.
fn resolve_volleys(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..100 {
        events.extend(tick(world, 100));
    }
    events
}

fn enemy_damage(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::TookDamage {
                    ship: ShipSide::Enemy,
                    ..
                }
            )
        })
        .count()
}

fn weapons_of_kind(view: &ShipView, kind: WeaponKind) -> Vec<WeaponRef> {
    view.weapons
        .iter()
        .filter(|weapon| weapon.kind == kind)
        .map(|weapon| weapon.weapon)
        .collect()
}

#[test]
fn laser_becomes_ready_on_the_seventh_second() {
    let mut world = battle();
    let weapon = weapons_of_kind(&view(&world, ShipSide::Player), WeaponKind::LaserMk1)[0];

    let events = send(&mut world, Command::ActivateWeapon { weapon });
    assert!(events.contains(&Event::PowerChanged {
        ship: ShipSide::Player,
        role: Role::Weapons,
        power: 1,
    }));

    for second in 1..=7 {
        let events = tick(&mut world, 1_000);
        let ready = events.contains(&Event::WeaponReady { weapon });
        assert_eq!(ready, second == 7, "unexpected readiness at second {second}");
    }

    let snapshot = view(&world, ShipSide::Player)
        .weapons
        .into_iter()
        .find(|snapshot| snapshot.weapon == weapon)
        .expect("weapon snapshot");
    assert_eq!(snapshot.state, WeaponState::Ready);
    assert_eq!(snapshot.charge_level, snapshot.charge_time);
}

#[test]
fn shield_raises_a_bubble_and_drops_it_when_unpowered() {
    let mut world = battle();
    for expected in [2, 4] {
        let events = send(
            &mut world,
            Command::ChangeSystemPower {
                ship: ShipSide::Enemy,
                role: Role::Shields,
                step: PowerStep::Increase,
            },
        );
        assert_eq!(
            events,
            vec![Event::PowerChanged {
                ship: ShipSide::Enemy,
                role: Role::Shields,
                power: expected,
            }]
        );
    }

    let _ = tick(&mut world, 1_000);
    let shield = view(&world, ShipSide::Enemy).shield.expect("shield");
    assert_eq!(shield.max_charge, 2);
    assert_eq!(shield.charge, 0);

    let _ = tick(&mut world, 1_000);
    assert_eq!(view(&world, ShipSide::Enemy).shield.expect("shield").charge, 1);

    for _ in 0..2 {
        let _ = send(
            &mut world,
            Command::ChangeSystemPower {
                ship: ShipSide::Enemy,
                role: Role::Shields,
                step: PowerStep::Decrease,
            },
        );
    }
    let shield = view(&world, ShipSide::Enemy).shield.expect("shield");
    assert_eq!(shield.charge, 0);
    assert_eq!(shield.max_charge, 0);
}

#[test]
fn power_requests_never_exceed_the_reactor() {
    let mut world = battle();
    let mut rejections = Vec::new();

    for role in Role::ALL {
        for _ in 0..4 {
            let before = view(&world, ShipSide::Player);
            let events = send(
                &mut world,
                Command::ChangeSystemPower {
                    ship: ShipSide::Player,
                    role,
                    step: PowerStep::Increase,
                },
            );
            let after = view(&world, ShipSide::Player);
            assert!(after.current_power <= after.max_power);
            for room in &after.rooms {
                assert!(room.power <= room.health);
                assert!(room.health <= room.max_power);
            }

            if let Some(Event::PowerRequestRejected { reason, .. }) = events.first() {
                assert_eq!(before.rooms, after.rooms, "rejected request changed state");
                rejections.push(*reason);
            }
        }
    }

    let player = view(&world, ShipSide::Player);
    assert_eq!(player.current_power, player.max_power);
    assert!(rejections.contains(&PowerError::InsufficientPower));
    assert!(rejections.contains(&PowerError::MissingSystem));
}

#[test]
fn crew_walk_through_the_door_and_claim_their_destination() {
    let mut world = battle();
    let ada = CrewId::new(0);
    let destination = TileCoord::new(12, 3);

    let events = send(
        &mut world,
        Command::MoveCrew {
            ship: ShipSide::Player,
            crew: ada,
            destination,
        },
    );
    assert_eq!(
        events,
        vec![Event::CrewMoving {
            ship: ShipSide::Player,
            crew: ada,
            destination,
        }]
    );

    let blocked = send(
        &mut world,
        Command::MoveCrew {
            ship: ShipSide::Player,
            crew: CrewId::new(1),
            destination,
        },
    );
    assert_eq!(
        blocked,
        vec![Event::CrewOrderRejected {
            ship: ShipSide::Player,
            crew: CrewId::new(1),
            reason: CrewError::TileTaken,
        }]
    );

    let mut arrived = false;
    for _ in 0..100 {
        let events = tick(&mut world, 100);
        if events.contains(&Event::CrewArrived {
            ship: ShipSide::Player,
            crew: ada,
            tile: destination,
        }) {
            arrived = true;
            break;
        }
    }
    assert!(arrived, "crewmate never arrived");

    let crew = view(&world, ShipSide::Player)
        .crew
        .into_iter()
        .find(|member| member.id == ada)
        .expect("crewmate");
    assert_eq!(crew.occupied_tile, Some(destination));
    assert_eq!(crew.moving_to, None);
}

#[test]
fn crew_orders_to_unknown_tiles_are_rejected() {
    let mut world = battle();
    let events = send(
        &mut world,
        Command::MoveCrew {
            ship: ShipSide::Player,
            crew: CrewId::new(0),
            destination: TileCoord::new(40, 40),
        },
    );
    assert_eq!(
        events,
        vec![Event::CrewOrderRejected {
            ship: ShipSide::Player,
            crew: CrewId::new(0),
            reason: CrewError::UnknownTile,
        }]
    );
}

#[test]
fn destroyed_enemy_is_detached_and_removed_with_loot() {
    let mut world = battle();
    let enemy_hull = view(&world, ShipSide::Enemy).max_hull;
    let target = RoomRef::new(ShipSide::Enemy, RoomId::new(1));
    let player = view(&world, ShipSide::Player);
    let weapons = [
        weapons_of_kind(&player, WeaponKind::LaserMk2)[0],
        weapons_of_kind(&player, WeaponKind::LaserMk1)[0],
    ];

    let _ = send(
        &mut world,
        Command::SetAutofire {
            ship: ShipSide::Player,
            enabled: true,
        },
    );
    for weapon in weapons {
        let _ = send(&mut world, Command::ActivateWeapon { weapon });
        let events = send(&mut world, Command::TargetRoom { weapon, target });
        assert_eq!(events, vec![Event::TargetAssigned { weapon, target }]);
    }

    let mut destroyed = false;
    let mut removal_requested = false;
    let mut last_hull = enemy_hull;
    for _ in 0..3_000 {
        let mut events = tick(&mut world, 100);
        for weapon in weapons {
            events.extend(send(&mut world, Command::FireWeapon { weapon }));
        }

        for event in &events {
            match event {
                Event::TookDamage {
                    ship: ShipSide::Enemy,
                    hull,
                    ..
                } => {
                    assert!(*hull < last_hull);
                    last_hull = *hull;
                }
                Event::ShipDestroyed {
                    ship: ShipSide::Enemy,
                } => destroyed = true,
                Event::RemoveEnemy => removal_requested = true,
                _ => {}
            }
        }

        if destroyed && !removal_requested {
            let player = view(&world, ShipSide::Player);
            assert!(player.weapons.iter().all(|weapon| weapon.target.is_none()));
            let enemy = view(&world, ShipSide::Enemy);
            assert!(enemy.destroyed);
            assert!(enemy.rooms.iter().all(|room| room.targeted_by.is_empty()));
            assert_eq!(
                send(
                    &mut world,
                    Command::ChangeSystemPower {
                        ship: ShipSide::Enemy,
                        role: Role::Engines,
                        step: PowerStep::Increase,
                    },
                ),
                vec![Event::PowerRequestRejected {
                    ship: ShipSide::Enemy,
                    role: Role::Engines,
                    reason: PowerError::ShipDestroyed,
                }]
            );
        }
        if removal_requested {
            break;
        }
    }

    assert!(destroyed, "enemy survived the barrage");
    assert!(removal_requested, "wreck countdown never elapsed");
    assert_eq!(last_hull, 0);

    let events = send(&mut world, Command::RemoveEnemy);
    assert_eq!(events, vec![Event::EnemyRemoved { loot: enemy_hull }]);
    assert!(!query::enemy_present(&world));
    assert_eq!(query::inventory(&world).scrap(), 10 + enemy_hull);
    assert!(view(&world, ShipSide::Player).projectiles.is_empty());
}

#[test]
fn charged_shield_absorbs_a_laser() {
    let mut world = battle();
    power_up(&mut world, ShipSide::Enemy, Role::Shields, 2);
    let hull = view(&world, ShipSide::Enemy).hull;
    let weapon = weapons_of_kind(&view(&world, ShipSide::Player), WeaponKind::LaserMk1)[0];

    charge_and_fire(&mut world, weapon, RoomRef::new(ShipSide::Enemy, RoomId::new(1)));
    assert_eq!(view(&world, ShipSide::Enemy).shield.expect("shield").charge, 2);

    let events = resolve_volleys(&mut world);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ShieldAbsorbed {
            ship: ShipSide::Enemy,
            ..
        }
    )));
    assert_eq!(enemy_damage(&events), 0);
    assert_eq!(view(&world, ShipSide::Enemy).hull, hull);
    assert!(view(&world, ShipSide::Player).projectiles.is_empty());
}

#[test]
fn beams_pass_through_a_charged_shield() {
    let mut player = builtin(DEFAULT_PLAYER_LAYOUT).expect("player layout");
    let slot = player
        .rooms
        .iter_mut()
        .flat_map(|room| room.slots.iter_mut())
        .find(|slot| slot.upgrade.as_deref() == Some("laser_mk1"))
        .expect("laser slot");
    slot.upgrade = Some("beam_mk1".to_owned());

    let mut world = battle_with(SimulationConfig::default(), &player);
    power_up(&mut world, ShipSide::Enemy, Role::Shields, 2);
    let hull = view(&world, ShipSide::Enemy).hull;
    let weapon = weapons_of_kind(&view(&world, ShipSide::Player), WeaponKind::BeamMk1)[0];

    charge_and_fire(&mut world, weapon, RoomRef::new(ShipSide::Enemy, RoomId::new(1)));
    let events = resolve_volleys(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ShieldAbsorbed { .. })));
    assert!(events.contains(&Event::TookDamage {
        ship: ShipSide::Enemy,
        room: RoomId::new(1),
        damage: 2,
        hull: hull - 2,
    }));
    assert_eq!(view(&world, ShipSide::Enemy).shield.expect("shield").charge, 2);
}

#[test]
fn powered_engines_dodge_incoming_fire() {
    let config = SimulationConfig {
        evade_base: 80,
        evade_per_engine_power: 10,
        seed: 7,
        ..SimulationConfig::default()
    };
    let mut world = battle_with(config, &builtin(DEFAULT_PLAYER_LAYOUT).expect("player layout"));
    power_up(&mut world, ShipSide::Enemy, Role::Engines, 2);
    assert_eq!(view(&world, ShipSide::Enemy).evade, 100);
    let hull = view(&world, ShipSide::Enemy).hull;
    let target = RoomRef::new(ShipSide::Enemy, RoomId::new(1));
    let weapon = weapons_of_kind(&view(&world, ShipSide::Player), WeaponKind::LaserMk1)[0];

    charge_and_fire(&mut world, weapon, target);
    let events = resolve_volleys(&mut world);

    assert!(events.contains(&Event::ProjectileMissed {
        ship: ShipSide::Enemy,
        room: target.room,
    }));
    assert_eq!(enemy_damage(&events), 0);
    assert_eq!(view(&world, ShipSide::Enemy).hull, hull);
    assert!(view(&world, ShipSide::Player).projectiles.is_empty());
}
