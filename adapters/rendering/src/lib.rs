#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Into The Light adapters.
//!
//! The battle core never loads textures or polls devices. Backends receive a
//! [`Scene`] assembled from ship snapshots, look sprites up through an
//! [`AssetCatalog`] keyed by [`AssetKey`], and translate per-frame input into
//! world commands through [`Scene::commands_for`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use into_the_light_core::{
    Command, CrewActivity, CrewId, DoorId, PixelPoint, PowerStep, ProjectileKind, Race, Role,
    RoomId, RoomRef, ShieldKind, ShipSide, ShipView, SystemStatus, ThrusterKind, TileCoord,
    WeaponKind, WeaponRef, WeaponSnapshot, WeaponState,
};
use std::{error::Error, fmt, time::Duration};

/// Number of animation frames a charging weapon cycles through.
pub const CHARGE_FRAMES: u8 = 4;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Tint used to fill a system room in the given health tier.
    #[must_use]
    pub const fn for_status(status: SystemStatus) -> Self {
        match status {
            SystemStatus::Nominal => Self::from_rgb_u8(104, 196, 112),
            SystemStatus::Damaged => Self::from_rgb_u8(232, 168, 56),
            SystemStatus::Offline => Self::from_rgb_u8(208, 64, 56),
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in screen units.
    pub cursor: Option<Vec2>,
    /// Whether the primary button was pressed on this frame.
    pub primary_click: bool,
    /// Whether the secondary button was pressed on this frame.
    pub secondary_click: bool,
    /// Whether the pause key was pressed on this frame.
    pub pause_toggle: bool,
    /// Power bar added to or removed from one of the player's systems.
    pub power_change: Option<(Role, PowerStep)>,
    /// Weapon picked from the weapon bar.
    pub select_weapon: Option<WeaponRef>,
    /// Crewmate ordered to walk to the tile under the cursor.
    pub crew_order: Option<CrewId>,
    /// Door of the player's ship that was clicked.
    pub door_toggle: Option<DoorId>,
}

/// Animation phase of a weapon sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponPhase {
    /// Weapon is unpowered.
    Off,
    /// Weapon is charging; `frame` counts up to [`CHARGE_FRAMES`].
    Charging {
        /// Zero-based animation frame.
        frame: u8,
    },
    /// Weapon is charged and waiting to fire.
    Ready,
}

impl WeaponPhase {
    /// Derives the animation phase from a weapon snapshot.
    #[must_use]
    pub fn of(weapon: &WeaponSnapshot) -> Self {
        match weapon.state {
            WeaponState::Disabled => Self::Off,
            WeaponState::Ready => Self::Ready,
            WeaponState::Charging => {
                let fraction = if weapon.charge_time > 0.0 {
                    (weapon.charge_level / weapon.charge_time).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let frame = (fraction * f32::from(CHARGE_FRAMES)) as u8;
                Self::Charging {
                    frame: frame.min(CHARGE_FRAMES - 1),
                }
            }
        }
    }
}

/// Lookup key for a texture or animation frame supplied by the asset collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKey {
    /// System icon drawn in the middle of a room.
    System {
        /// System hosted by the room.
        role: Role,
        /// Health tier of the room.
        status: SystemStatus,
    },
    /// Weapon sprite drawn at its mount point.
    Weapon {
        /// Weapon model.
        kind: WeaponKind,
        /// Charge animation phase.
        phase: WeaponPhase,
    },
    /// Crewmate sprite.
    Crew {
        /// Species of the crewmate.
        race: Race,
        /// Animation-relevant activity.
        activity: CrewActivity,
    },
    /// Door sprite.
    Door {
        /// Whether the door is open.
        opened: bool,
    },
    /// Thruster sprite.
    Thruster {
        /// Thruster model.
        kind: ThrusterKind,
        /// Whether the thruster is firing.
        active: bool,
    },
    /// Shield bubble drawn around the hull.
    Shield {
        /// Shield generator model.
        kind: ShieldKind,
        /// Whether at least one bubble is raised.
        raised: bool,
    },
}

/// Supplies backend-specific handles for asset keys.
///
/// Implementations own texture loading and atlasing; the scene only ever asks
/// for handles by key.
pub trait AssetCatalog {
    /// Backend handle for a loaded texture or animation frame.
    type Handle: Clone;

    /// Returns the handle registered for `key`, if any.
    fn handle(&self, key: &AssetKey) -> Option<Self::Handle>;
}

/// Sprite placed in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Asset drawn by the sprite.
    pub key: AssetKey,
    /// Screen position of the sprite's centre.
    pub position: Vec2,
}

/// Straight projectile segment expressed in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileLine {
    /// Ballistic family of the projectile.
    pub kind: ProjectileKind,
    /// Trailing point.
    pub from: Vec2,
    /// Leading point.
    pub to: Vec2,
}

/// One ship placed on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipScene {
    /// Snapshot of the ship.
    pub view: ShipView,
    /// Screen offset of the ship's pixel origin.
    pub offset: Vec2,
    /// Edge length of one tile in pixels.
    pub tile_size: f32,
}

impl ShipScene {
    /// Places a ship snapshot on screen.
    pub fn new(view: ShipView, offset: Vec2, tile_size: f32) -> Result<Self, RenderingError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }
        Ok(Self {
            view,
            offset,
            tile_size,
        })
    }

    /// Converts a point in the ship's pixel frame to screen space.
    #[must_use]
    pub fn to_screen(&self, point: PixelPoint) -> Vec2 {
        self.offset + Vec2::new(point.x, point.y)
    }

    /// Screen-space bounds of a room as `(min, max)` corners.
    #[must_use]
    pub fn room_bounds(&self, id: RoomId) -> Option<(Vec2, Vec2)> {
        let room = self.view.room(id)?;
        let min = Vec2::new(room.rect.left() as f32, room.rect.top() as f32) * self.tile_size;
        let max = Vec2::new(room.rect.right() as f32, room.rect.bottom() as f32) * self.tile_size;
        Some((self.offset + min, self.offset + max))
    }

    /// Returns the room under a screen position.
    #[must_use]
    pub fn room_at(&self, screen: Vec2) -> Option<RoomId> {
        self.view
            .rooms
            .iter()
            .map(|room| room.id)
            .find(|id| {
                self.room_bounds(*id).is_some_and(|(min, max)| {
                    screen.x >= min.x && screen.x < max.x && screen.y >= min.y && screen.y < max.y
                })
            })
    }

    /// Returns the room tile under a screen position.
    #[must_use]
    pub fn tile_at(&self, screen: Vec2) -> Option<TileCoord> {
        self.room_at(screen).map(|_| {
            let local = ((screen - self.offset) / self.tile_size).floor();
            TileCoord::new(local.x as u32, local.y as u32)
        })
    }

    fn push_sprites(&self, out: &mut Vec<Sprite>) {
        for room in &self.view.rooms {
            let (Some(role), Some(status)) = (room.role, room.status) else {
                continue;
            };
            let Some((min, max)) = self.room_bounds(room.id) else {
                continue;
            };
            out.push(Sprite {
                key: AssetKey::System { role, status },
                position: (min + max) * 0.5,
            });
        }

        if let Some(shield) = &self.view.shield {
            if let Some((min, max)) = self.hull_bounds() {
                out.push(Sprite {
                    key: AssetKey::Shield {
                        kind: shield.kind,
                        raised: shield.charge > 0,
                    },
                    position: (min + max) * 0.5,
                });
            }
        }

        out.extend(self.view.thrusters.iter().map(|thruster| Sprite {
            key: AssetKey::Thruster {
                kind: thruster.kind,
                active: thruster.active,
            },
            position: self.to_screen(thruster.mount),
        }));
        out.extend(self.view.weapons.iter().map(|weapon| Sprite {
            key: AssetKey::Weapon {
                kind: weapon.kind,
                phase: WeaponPhase::of(weapon),
            },
            position: self.to_screen(weapon.mount),
        }));
        out.extend(self.view.doors.iter().map(|door| Sprite {
            key: AssetKey::Door {
                opened: door.opened,
            },
            position: self.to_screen(door.position),
        }));
        out.extend(self.view.crew.iter().map(|crew| Sprite {
            key: AssetKey::Crew {
                race: crew.race,
                activity: crew.activity,
            },
            position: self.to_screen(crew.position),
        }));
    }

    fn hull_bounds(&self) -> Option<(Vec2, Vec2)> {
        self.view
            .rooms
            .iter()
            .filter_map(|room| self.room_bounds(room.id))
            .reduce(|(min, max), (room_min, room_max)| (min.min(room_min), max.max(room_max)))
    }
}

/// Scene description combining both ships of a battle.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Player ship, drawn on the left.
    pub player: ShipScene,
    /// Enemy ship, drawn on the right while present.
    pub enemy: Option<ShipScene>,
    /// Whether the simulation is paused.
    pub paused: bool,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(player: ShipScene, enemy: Option<ShipScene>, paused: bool) -> Self {
        Self {
            player,
            enemy,
            paused,
        }
    }

    /// Returns the placed ship fighting on `side`.
    #[must_use]
    pub fn ship(&self, side: ShipSide) -> Option<&ShipScene> {
        match side {
            ShipSide::Player => Some(&self.player),
            ShipSide::Enemy => self.enemy.as_ref(),
        }
    }

    /// Returns the room under a screen position on either ship.
    #[must_use]
    pub fn room_at(&self, screen: Vec2) -> Option<RoomRef> {
        self.enemy
            .iter()
            .chain(std::iter::once(&self.player))
            .find_map(|ship| {
                ship.room_at(screen)
                    .map(|room| RoomRef::new(ship.view.side, room))
            })
    }

    /// Collects every sprite of the scene, player ship first.
    #[must_use]
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut sprites = Vec::new();
        self.player.push_sprites(&mut sprites);
        if let Some(enemy) = &self.enemy {
            enemy.push_sprites(&mut sprites);
        }
        sprites
    }

    /// Projectiles in flight, drawn on whichever screen they currently cross.
    ///
    /// Projectiles still waiting for launch are omitted.
    #[must_use]
    pub fn projectile_lines(&self) -> Vec<ProjectileLine> {
        let mut lines = Vec::new();
        for ship in std::iter::once(&self.player).chain(self.enemy.iter()) {
            for projectile in &ship.view.projectiles {
                if projectile.pending_launch {
                    continue;
                }
                let frame = if projectile.switched_screens {
                    self.ship(projectile.target.ship)
                } else {
                    Some(ship)
                };
                let Some(frame) = frame else {
                    continue;
                };
                lines.push(ProjectileLine {
                    kind: projectile.kind,
                    from: frame.to_screen(projectile.start),
                    to: frame.to_screen(projectile.end),
                });
            }
        }
        lines
    }

    /// Translates one frame of input into world commands.
    ///
    /// Power, selection, crew and door intents act on the player's ship. A
    /// primary click on an enemy room aims the selected weapon at it; a
    /// secondary click clears that weapon's target.
    pub fn commands_for(&self, input: &FrameInput, out: &mut Vec<Command>) {
        if input.pause_toggle {
            out.push(Command::SetPaused {
                paused: !self.paused,
            });
        }
        if let Some((role, step)) = input.power_change {
            out.push(Command::ChangeSystemPower {
                ship: ShipSide::Player,
                role,
                step,
            });
        }
        if let Some(weapon) = input.select_weapon {
            out.push(Command::SelectWeapon { weapon });
        }
        if let Some(crew) = input.crew_order {
            let destination = input.cursor.and_then(|cursor| self.player.tile_at(cursor));
            if let Some(destination) = destination {
                out.push(Command::MoveCrew {
                    ship: ShipSide::Player,
                    crew,
                    destination,
                });
            }
        }
        if let Some(door) = input.door_toggle {
            out.push(Command::ToggleDoor {
                ship: ShipSide::Player,
                door,
            });
        }

        let Some(weapon) = input.select_weapon.or(self.player.view.selected_weapon) else {
            return;
        };
        if input.secondary_click {
            out.push(Command::ClearTarget { weapon });
            return;
        }
        if !input.primary_click {
            return;
        }
        let Some(target) = input.cursor.and_then(|cursor| self.room_at(cursor)) else {
            return;
        };
        if target.ship == ShipSide::Enemy {
            out.push(Command::TargetRoom { weapon, target });
        }
    }
}

/// Resolves sprites into backend handles.
///
/// Fails on the first sprite whose key the catalog does not provide.
pub fn resolve<C>(catalog: &C, sprites: &[Sprite]) -> Result<Vec<(C::Handle, Vec2)>, RenderingError>
where
    C: AssetCatalog,
{
    sprites
        .iter()
        .map(|sprite| {
            catalog
                .handle(&sprite.key)
                .map(|handle| (handle, sprite.position))
                .ok_or(RenderingError::MissingAsset { key: sprite.key })
        })
        .collect()
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Into The Light battles.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may replace the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing or resolving rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive, finite size.
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: f32,
    },
    /// The asset catalog has no handle for a key.
    MissingAsset {
        /// Key that could not be resolved.
        key: AssetKey,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive (received {tile_size})")
            }
            Self::MissingAsset { key } => write!(f, "no asset registered for {key:?}"),
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use into_the_light_world::{self as world, builtin, query, SimulationConfig, World};

    use super::*;

    fn battle() -> World {
        let mut world = World::new(
            SimulationConfig::default(),
            &builtin("scout").expect("scout"),
        )
        .expect("world");
        world
            .spawn_enemy(&builtin("cruiser").expect("cruiser"))
            .expect("enemy");
        world
    }

    fn scene(world: &World) -> Scene {
        let tile_size = query::config(world).tile_size;
        let player = ShipScene::new(
            query::ship_view(world, ShipSide::Player).expect("player"),
            Vec2::ZERO,
            tile_size,
        )
        .expect("player scene");
        let enemy = query::ship_view(world, ShipSide::Enemy).map(|view| {
            ShipScene::new(view, Vec2::new(800.0, 0.0), tile_size).expect("enemy scene")
        });
        Scene::new(player, enemy, query::is_paused(world))
    }

    #[derive(Default)]
    struct MapCatalog(HashMap<AssetKey, u32>);

    impl AssetCatalog for MapCatalog {
        type Handle = u32;

        fn handle(&self, key: &AssetKey) -> Option<u32> {
            self.0.get(key).copied()
        }
    }

    #[test]
    fn ship_scene_rejects_non_positive_tile_size() {
        let view = query::ship_view(&battle(), ShipSide::Player).expect("player");
        let error = ShipScene::new(view, Vec2::ZERO, 0.0).expect_err("zero tile size");
        assert_eq!(error, RenderingError::InvalidTileSize { tile_size: 0.0 });
    }

    #[test]
    fn room_lookup_respects_ship_offsets() {
        let scene = scene(&battle());
        let enemy = scene.enemy.as_ref().expect("enemy scene");
        let (min, max) = enemy.room_bounds(RoomId::new(1)).expect("bounds");

        assert_eq!(
            scene.room_at((min + max) * 0.5),
            Some(RoomRef::new(ShipSide::Enemy, RoomId::new(1)))
        );
        assert_eq!(enemy.room_at(min - Vec2::splat(1000.0)), None);
    }

    #[test]
    fn sprites_cover_every_system_weapon_and_crewmate() {
        let world = battle();
        let scene = scene(&world);
        let sprites = scene.sprites();
        let count = |matches: fn(&AssetKey) -> bool| {
            sprites.iter().filter(|sprite| matches(&sprite.key)).count()
        };

        let player = &scene.player.view;
        let enemy = &scene.enemy.as_ref().expect("enemy").view;
        assert_eq!(
            count(|key| matches!(key, AssetKey::System { .. })),
            player.systems.len() + enemy.systems.len()
        );
        assert_eq!(
            count(|key| matches!(key, AssetKey::Weapon { phase: WeaponPhase::Off, .. })),
            player.weapons.len() + enemy.weapons.len()
        );
        assert_eq!(
            count(|key| matches!(key, AssetKey::Crew { activity: CrewActivity::Idle, .. })),
            player.crew.len() + enemy.crew.len()
        );
        assert_eq!(
            count(|key| matches!(key, AssetKey::Shield { raised: false, .. })),
            2
        );
    }

    #[test]
    fn charging_weapon_advances_through_frames() {
        let mut world = battle();
        let weapon = query::ship_view(&world, ShipSide::Player).expect("player").weapons[0]
            .weapon;
        let mut events = Vec::new();
        world::apply(&mut world, Command::ActivateWeapon { weapon }, &mut events);
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        );

        let view = query::ship_view(&world, ShipSide::Player).expect("player");
        let snapshot = view
            .weapons
            .iter()
            .find(|snapshot| snapshot.weapon == weapon)
            .expect("weapon");
        assert!(matches!(
            WeaponPhase::of(snapshot),
            WeaponPhase::Charging { frame } if frame > 0 && frame < CHARGE_FRAMES
        ));
    }

    #[test]
    fn resolve_reports_the_first_missing_asset() {
        let scene = scene(&battle());
        let sprites = scene.sprites();
        let mut catalog = MapCatalog::default();
        for (index, sprite) in sprites.iter().enumerate().skip(1) {
            let _ = catalog.0.insert(sprite.key, index as u32);
        }

        let missing = sprites[0].key;
        if sprites.iter().skip(1).any(|sprite| sprite.key == missing) {
            assert!(resolve(&catalog, &sprites).is_ok());
        } else {
            assert_eq!(
                resolve(&catalog, &sprites),
                Err(RenderingError::MissingAsset { key: missing })
            );
        }

        let _ = catalog.0.insert(missing, 0);
        assert_eq!(
            resolve(&catalog, &sprites).expect("complete catalog").len(),
            sprites.len()
        );
    }

    #[test]
    fn clicking_an_enemy_room_aims_the_selected_weapon() {
        let mut world = battle();
        let weapon = query::ship_view(&world, ShipSide::Player).expect("player").weapons[0]
            .weapon;
        let mut events = Vec::new();
        world::apply(&mut world, Command::SelectWeapon { weapon }, &mut events);

        let scene = scene(&world);
        let enemy = scene.enemy.as_ref().expect("enemy");
        let (min, max) = enemy.room_bounds(RoomId::new(0)).expect("bounds");
        let input = FrameInput {
            cursor: Some((min + max) * 0.5),
            primary_click: true,
            pause_toggle: true,
            ..FrameInput::default()
        };

        let mut commands = Vec::new();
        scene.commands_for(&input, &mut commands);
        assert_eq!(
            commands,
            vec![
                Command::SetPaused { paused: true },
                Command::TargetRoom {
                    weapon,
                    target: RoomRef::new(ShipSide::Enemy, RoomId::new(0)),
                },
            ]
        );
    }

    #[test]
    fn clicking_an_own_room_issues_nothing() {
        let mut world = battle();
        let weapon = query::ship_view(&world, ShipSide::Player).expect("player").weapons[0]
            .weapon;
        let mut events = Vec::new();
        world::apply(&mut world, Command::SelectWeapon { weapon }, &mut events);

        let scene = scene(&world);
        let (min, max) = scene.player.room_bounds(RoomId::new(0)).expect("bounds");
        let mut commands = Vec::new();
        scene.commands_for(
            &FrameInput {
                cursor: Some((min + max) * 0.5),
                primary_click: true,
                ..FrameInput::default()
            },
            &mut commands,
        );
        assert!(commands.is_empty());

        scene.commands_for(
            &FrameInput {
                secondary_click: true,
                ..FrameInput::default()
            },
            &mut commands,
        );
        assert_eq!(commands, vec![Command::ClearTarget { weapon }]);
    }

    #[test]
    fn launched_projectiles_are_drawn_on_the_attacker_screen() {
        let mut world = battle();
        let weapon = query::ship_view(&world, ShipSide::Player)
            .expect("player")
            .weapons
            .iter()
            .find(|weapon| weapon.kind == WeaponKind::LaserMk1)
            .map(|weapon| weapon.weapon)
            .expect("laser");
        let target = RoomRef::new(ShipSide::Enemy, RoomId::new(0));
        let mut events = Vec::new();
        world::apply(&mut world, Command::ActivateWeapon { weapon }, &mut events);
        world::apply(&mut world, Command::TargetRoom { weapon, target }, &mut events);
        for _ in 0..7 {
            world::apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
        }
        world::apply(&mut world, Command::FireWeapon { weapon }, &mut events);
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );

        let scene = scene(&world);
        let lines = scene.projectile_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, ProjectileKind::Laser);
        assert!(lines[0].to.x < 800.0);
    }

    #[test]
    fn power_selection_and_door_intents_target_the_player_ship() {
        let world = battle();
        let weapon = query::ship_view(&world, ShipSide::Player).expect("player").weapons[1]
            .weapon;
        let scene = scene(&world);
        let mut commands = Vec::new();
        scene.commands_for(
            &FrameInput {
                power_change: Some((Role::Shields, PowerStep::Increase)),
                select_weapon: Some(weapon),
                door_toggle: Some(DoorId::new(2)),
                ..FrameInput::default()
            },
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![
                Command::ChangeSystemPower {
                    ship: ShipSide::Player,
                    role: Role::Shields,
                    step: PowerStep::Increase,
                },
                Command::SelectWeapon { weapon },
                Command::ToggleDoor {
                    ship: ShipSide::Player,
                    door: DoorId::new(2),
                },
            ]
        );
    }

    #[test]
    fn weapon_picked_this_frame_takes_the_click() {
        let world = battle();
        let weapon = query::ship_view(&world, ShipSide::Player).expect("player").weapons[2]
            .weapon;
        let scene = scene(&world);
        let enemy = scene.enemy.as_ref().expect("enemy");
        let (min, max) = enemy.room_bounds(RoomId::new(1)).expect("bounds");
        let mut commands = Vec::new();
        scene.commands_for(
            &FrameInput {
                cursor: Some((min + max) * 0.5),
                primary_click: true,
                select_weapon: Some(weapon),
                ..FrameInput::default()
            },
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![
                Command::SelectWeapon { weapon },
                Command::TargetRoom {
                    weapon,
                    target: RoomRef::new(ShipSide::Enemy, RoomId::new(1)),
                },
            ]
        );
    }

    #[test]
    fn crew_orders_walk_to_the_tile_under_the_cursor() {
        let scene = scene(&battle());
        let (min, _) = scene.player.room_bounds(RoomId::new(1)).expect("bounds");
        let crew = CrewId::new(0);
        let mut commands = Vec::new();
        scene.commands_for(
            &FrameInput {
                cursor: Some(min + Vec2::splat(16.0)),
                crew_order: Some(crew),
                ..FrameInput::default()
            },
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![Command::MoveCrew {
                ship: ShipSide::Player,
                crew,
                destination: TileCoord::new(1, 1),
            }]
        );

        let enemy = scene.enemy.as_ref().expect("enemy");
        let (min, max) = enemy.room_bounds(RoomId::new(0)).expect("bounds");
        commands.clear();
        scene.commands_for(
            &FrameInput {
                cursor: Some((min + max) * 0.5),
                crew_order: Some(crew),
                ..FrameInput::default()
            },
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn status_colors_lighten_towards_white() {
        let damaged = Color::for_status(SystemStatus::Damaged);
        assert_eq!(damaged.lighten(1.0), Color::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(damaged.lighten(0.0), damaged);
    }
}
