//! The simulation: every pool, the player and the wave script, advanced in a
//! fixed order once per tick.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::entities::{
    Enemy, Entity, Field, ParticleBurst, Player, Pool, Projectile, TargetGroup, TickContext,
};
use crate::error::SimError;
use crate::scene::{EnemySpawn, Phase, SceneManager, wave_script};
use crate::surface::{Rgb, Sprite, Surface};

/// Background the field is cleared to before each frame.
pub const CLEAR_COLOR: Rgb = Rgb::new(0x33, 0x33, 0x33);

pub struct World {
    field: Field,
    player: Player,
    player_shots: Pool<Projectile>,
    player_single_shots: Pool<Projectile>,
    enemies: Pool<Enemy>,
    enemy_shots: Pool<Projectile>,
    bursts: Pool<ParticleBurst>,
    scenes: SceneManager<Phase>,
    rng: StdRng,
    player_was_alive: bool,
}

impl World {
    /// Builds every pool at full capacity, starts the entrance flight and the intro.
    pub fn new(config: &GameConfig, now: u64) -> Result<Self, SimError> {
        config.validate()?;
        let field = config.field();

        let mut player = Player::new(config.player.size, config.player.size);
        player.set_speed(config.player.speed)?;
        player.set_fire_interval(config.player.fire_interval)?;

        let shots = &config.shots;
        let player_shots = shot_pool(
            shots.capacity,
            Sprite::ViperShot,
            shots.size,
            shots.speed,
            TargetGroup::Enemies,
        )?;
        let player_single_shots = shot_pool(
            shots.single_capacity,
            Sprite::ViperSingleShot,
            shots.single_size,
            shots.speed,
            TargetGroup::Enemies,
        )?;
        let enemy_shots = shot_pool(
            shots.enemy_capacity,
            Sprite::EnemyShot,
            shots.enemy_size,
            shots.enemy_speed,
            TargetGroup::Player,
        )?;

        let enemy = &config.enemies;
        let enemies = Pool::new(enemy.capacity, |_| {
            Enemy::new(enemy.size, enemy.size, enemy.speed, shots.enemy_speed)
        });

        let burst = &config.bursts;
        let color = burst.rgb()?;
        let bursts = Pool::new(burst.capacity, |_| {
            ParticleBurst::new(
                burst.radius,
                burst.sparks,
                burst.spark_size,
                burst.time_range,
                color,
            )
        });

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut scenes = wave_script();
        scenes.use_phase(config.opening()?, now)?;

        let (start, end) = config.entrance();
        player.set_coming(start, end, now);

        info!(
            "world ready: {}x{} field, {} enemies, {} bursts",
            field.width,
            field.height,
            enemies.capacity(),
            bursts.capacity()
        );

        Ok(Self {
            field,
            player,
            player_shots,
            player_single_shots,
            enemies,
            enemy_shots,
            bursts,
            scenes,
            rng,
            player_was_alive: true,
        })
    }

    /// One simulation step in the fixed order:
    /// scene, player, player shots, single shots, enemies, enemy shots, bursts.
    pub fn tick(&mut self, ctx: &TickContext) {
        for spawn in self.scenes.update(ctx.now, &ctx.field) {
            self.spawn_enemy(spawn);
        }

        let Self {
            player,
            player_shots,
            player_single_shots,
            enemies,
            enemy_shots,
            bursts,
            rng,
            player_was_alive,
            ..
        } = self;

        player.update(ctx, player_shots, player_single_shots);
        for shot in player_shots.iter_mut() {
            update_shot(shot, ctx, enemies, player, bursts, rng);
        }
        for shot in player_single_shots.iter_mut() {
            update_shot(shot, ctx, enemies, player, bursts, rng);
        }
        for enemy in enemies.iter_mut() {
            enemy.update(ctx, enemy_shots);
        }
        for shot in enemy_shots.iter_mut() {
            update_shot(shot, ctx, enemies, player, bursts, rng);
        }
        for burst in bursts.iter_mut() {
            burst.update(ctx.now);
        }

        if *player_was_alive && !player.is_alive() {
            info!("player destroyed at {:?}", player.position());
            *player_was_alive = false;
        }
    }

    /// Clears `surface` and draws everything in update order.
    pub fn draw(&self, surface: &mut dyn Surface, now: u64) {
        surface.clear(CLEAR_COLOR);
        self.player.draw(surface, now);
        for shot in self.player_shots.iter() {
            shot.draw(surface);
        }
        for shot in self.player_single_shots.iter() {
            shot.draw(surface);
        }
        for enemy in self.enemies.iter() {
            enemy.draw(surface);
        }
        for shot in self.enemy_shots.iter() {
            shot.draw(surface);
        }
        for burst in self.bursts.iter() {
            burst.draw(surface);
        }
    }

    /// Places a new enemy in the first free slot, or drops it if there is none.
    pub fn spawn_enemy(&mut self, spawn: EnemySpawn) {
        let EnemySpawn {
            position,
            direction,
            life,
            enemy_type,
        } = spawn;
        match self.enemies.acquire() {
            Some((index, enemy)) => {
                enemy.spawn(position.x, position.y, life, enemy_type);
                enemy.body.set_direction(Some(direction.x), Some(direction.y));
                debug!("enemy {index} ({enemy_type:?}) spawned at {position:?}");
            }
            None => debug!("enemy spawn at {position:?} dropped, pool exhausted"),
        }
    }

    /// Marks every entity drawn with `sprite` as loaded.
    pub fn mark_ready(&mut self, sprite: Sprite) {
        let bodies = std::iter::once(self.player.body_mut())
            .chain(self.player_shots.iter_mut().map(Entity::body_mut))
            .chain(self.player_single_shots.iter_mut().map(Entity::body_mut))
            .chain(self.enemies.iter_mut().map(Entity::body_mut))
            .chain(self.enemy_shots.iter_mut().map(Entity::body_mut));
        for body in bodies.filter(|body| body.sprite() == sprite) {
            body.mark_ready();
        }
    }

    /// True once every entity's sprite has been loaded.
    pub fn is_ready(&self) -> bool {
        self.player.body.is_ready()
            && self.player_shots.iter().all(|shot| shot.body.is_ready())
            && self.player_single_shots.iter().all(|shot| shot.body.is_ready())
            && self.enemies.iter().all(|enemy| enemy.body.is_ready())
            && self.enemy_shots.iter().all(|shot| shot.body.is_ready())
    }

    pub fn is_game_over(&self) -> bool {
        !self.player.is_alive()
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn phase(&self) -> Option<Phase> {
        self.scenes.active()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn player_shots(&self) -> &Pool<Projectile> {
        &self.player_shots
    }

    pub fn player_single_shots(&self) -> &Pool<Projectile> {
        &self.player_single_shots
    }

    pub fn enemies(&self) -> &Pool<Enemy> {
        &self.enemies
    }

    pub fn enemy_shots(&self) -> &Pool<Projectile> {
        &self.enemy_shots
    }

    pub fn enemy_shots_mut(&mut self) -> &mut Pool<Projectile> {
        &mut self.enemy_shots
    }

    pub fn bursts(&self) -> &Pool<ParticleBurst> {
        &self.bursts
    }
}

fn shot_pool(
    capacity: usize,
    sprite: Sprite,
    size: f32,
    speed: f32,
    targets: TargetGroup,
) -> Result<Pool<Projectile>, SimError> {
    let mut pool = Pool::new(capacity, |_| Projectile::new(sprite, size, size));
    for shot in pool.iter_mut() {
        shot.set_speed(speed)?;
        shot.set_targets(targets);
        shot.set_bursts(true);
    }
    Ok(pool)
}

/// Routes a projectile to the target group it was wired to.
fn update_shot(
    shot: &mut Projectile,
    ctx: &TickContext,
    enemies: &mut Pool<Enemy>,
    player: &mut Player,
    bursts: &mut Pool<ParticleBurst>,
    rng: &mut StdRng,
) {
    let bursts = shot.bursts_on_kill().then_some(bursts);
    match shot.targets() {
        Some(TargetGroup::Enemies) => shot.update(ctx, enemies.as_mut_slice(), bursts, rng),
        Some(TargetGroup::Player) => {
            shot.update(ctx, std::slice::from_mut(player), bursts, rng)
        }
        None => shot.update::<Enemy, _>(ctx, &mut [], bursts, rng),
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("field", &self.field)
            .field("phase", &self.scenes.active())
            .field("enemies", &self.enemies.active_count())
            .field("player_shots", &self.player_shots.active_count())
            .field("enemy_shots", &self.enemy_shots.active_count())
            .field("bursts", &self.bursts.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EnemyType, Vector2};
    use crate::input::{InputSnapshot, Key};
    use crate::surface::{DrawCall, RecordingSurface};

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        }
    }

    fn world() -> World {
        World::new(&config(), 0).unwrap()
    }

    fn run(world: &mut World, input: &InputSnapshot, from: u64, ticks: u64) -> u64 {
        let field = world.field();
        let mut now = from;
        for _ in 0..ticks {
            now += 16;
            world.tick(&TickContext::new(now, field, input));
        }
        now
    }

    fn spawn_at(world: &mut World, x: f32, y: f32) {
        world.spawn_enemy(EnemySpawn {
            position: Vector2::new(x, y),
            direction: Vector2::new(0.0, 1.0),
            life: 1.0,
            enemy_type: EnemyType::Default,
        });
    }

    #[test]
    fn test_new_world_allocates_pools_and_starts_intro() {
        let world = world();
        assert_eq!(world.player_shots().capacity(), 10);
        assert_eq!(world.player_single_shots().capacity(), 20);
        assert_eq!(world.enemy_shots().capacity(), 50);
        assert_eq!(world.enemies().capacity(), 10);
        assert_eq!(world.bursts().capacity(), 10);
        assert_eq!(world.phase(), Some(Phase::Intro));
        assert!(world.player().is_entering());
        assert_eq!(world.player().position(), Vector2::new(320.0, 530.0));
        assert!(!world.is_game_over());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config();
        config.shots.single_capacity = 3;
        assert!(World::new(&config, 0).is_err());
    }

    #[test]
    fn test_opening_phase_from_config() {
        let mut config = config();
        config.opening_phase = "invade".into();
        let mut world = World::new(&config, 0).unwrap();
        assert_eq!(world.phase(), Some(Phase::Invade));
        run(&mut world, &InputSnapshot::default(), 0, 1);
        assert_eq!(world.enemies().active_count(), 1);
    }

    #[test]
    fn test_readiness_needs_every_sprite() {
        let mut world = world();
        assert!(!world.is_ready());
        for sprite in &Sprite::ALL[..4] {
            world.mark_ready(*sprite);
        }
        assert!(!world.is_ready());
        world.mark_ready(Sprite::EnemyShot);
        assert!(world.is_ready());
    }

    #[test]
    fn test_intro_then_invade_spawns_enemy() {
        let mut world = world();
        let input = InputSnapshot::default();
        let now = run(&mut world, &input, 0, 125);
        assert_eq!(now, 2_000);
        assert_eq!(world.phase(), Some(Phase::Intro));
        assert_eq!(world.enemies().active_count(), 0);

        // Switch happens on the tick past 2s, the spawn on the one after
        run(&mut world, &input, now, 2);
        assert_eq!(world.phase(), Some(Phase::Invade));
        assert_eq!(world.enemies().active_indices(), vec![0]);
        let enemy = world.enemies().get(0).unwrap();
        assert_eq!(enemy.life(), 2.0);
        assert_eq!(enemy.body.direction, Vector2::new(0.0, 1.0));
    }

    #[test]
    fn test_spawn_dropped_when_enemy_pool_full() {
        let mut config = config();
        config.enemies.capacity = 1;
        let mut world = World::new(&config, 0).unwrap();
        spawn_at(&mut world, 100.0, 100.0);
        spawn_at(&mut world, 200.0, 100.0);
        assert_eq!(world.enemies().active_count(), 1);
        assert_eq!(world.enemies().get(0).unwrap().position(), Vector2::new(100.0, 100.0));
    }

    /// Parks the player at `at`; the entrance ends on the next tick.
    fn park_player(world: &mut World, x: f32, y: f32) {
        let at = Vector2::new(x, y);
        world.player_mut().set_coming(at, at, 0);
    }

    #[test]
    fn test_player_shot_kills_enemy_with_burst() {
        let mut world = world();
        park_player(&mut world, 320.0, 300.0);
        spawn_at(&mut world, 320.0, 280.0);

        let input = InputSnapshot::holding(&[Key::Fire]);
        world.tick(&TickContext::new(16, world.field(), &input));

        assert_eq!(world.player().volleys(), 1);
        assert_eq!(world.enemies().active_count(), 0);
        assert_eq!(world.bursts().active_count(), 1);
        assert_eq!(
            world.bursts().get(0).unwrap().origin(),
            Some(Vector2::new(320.0, 280.0))
        );
        // The main shot is spent, the paired shots fly on
        assert_eq!(world.player_shots().active_count(), 0);
        assert_eq!(world.player_single_shots().active_count(), 2);
    }

    #[test]
    fn test_expired_burst_is_drawn_on_its_last_tick() {
        let mut world = world();
        park_player(&mut world, 320.0, 300.0);
        spawn_at(&mut world, 320.0, 280.0);
        world.tick(&TickContext::new(16, world.field(), &InputSnapshot::holding(&[Key::Fire])));
        assert_eq!(world.bursts().active_count(), 1);

        // 256ms after the kill the burst has run its 250ms
        let now = run(&mut world, &InputSnapshot::default(), 16, 16);
        assert_eq!(world.bursts().active_count(), 0);
        let mut surface = RecordingSurface::new();
        world.draw(&mut surface, now);
        assert_eq!(surface.squares().count(), 15);

        run(&mut world, &InputSnapshot::default(), now, 1);
        let mut surface = RecordingSurface::new();
        world.draw(&mut surface, now + 16);
        assert_eq!(surface.squares().count(), 0);
    }

    #[test]
    fn test_enemy_shot_ends_the_game() {
        let mut world = world();
        park_player(&mut world, 320.0, 380.0);
        let (_, shot) = world.enemy_shots_mut().acquire().unwrap();
        shot.spawn(320.0, 342.0);
        shot.body.set_direction(Some(0.0), Some(1.0));

        let input = InputSnapshot::default();
        let now = run(&mut world, &input, 0, 3);
        assert!(!world.is_game_over());
        let now = run(&mut world, &input, now, 1);
        assert!(world.is_game_over());
        assert_eq!(world.bursts().active_count(), 1);
        assert_eq!(world.enemy_shots().active_count(), 0);

        let before = world.player().position();
        run(&mut world, &InputSnapshot::holding(&[Key::Left, Key::Fire]), now, 10);
        assert_eq!(world.player().position(), before);
        assert_eq!(world.player_shots().active_count(), 0);
    }

    #[test]
    fn test_draw_order_and_clear() {
        let mut world = world();
        spawn_at(&mut world, 100.0, 100.0);
        let mut surface = RecordingSurface::new();
        world.draw(&mut surface, 75);
        assert_eq!(surface.calls[0], DrawCall::Clear(CLEAR_COLOR));
        assert_eq!(surface.sprites(Sprite::Viper).count(), 1);
        assert_eq!(surface.sprites(Sprite::Enemy).count(), 1);
        assert_eq!(surface.sprites(Sprite::ViperShot).count(), 0);
    }
}
