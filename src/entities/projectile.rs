use log::debug;
use rand::Rng;

use super::body::{Body, Entity, collides};
use super::context::TickContext;
use super::particle::ParticleBurst;
use super::pool::{Pool, Poolable};
use crate::error::{SimError, require_positive};
use crate::surface::{Sprite, Surface};

/// Which group of entities a projectile tests for hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetGroup {
    Enemies,
    Player,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub body: Body,
    speed: f32,
    power: f32,
    targets: Option<TargetGroup>,
    bursts_on_kill: bool,
}

impl Projectile {
    /// An inactive projectile, ready to sit in a pool.
    pub fn new(sprite: Sprite, width: f32, height: f32) -> Self {
        Self {
            body: Body::new(sprite, 0.0, 0.0, width, height, 0.0),
            speed: 7.0,
            power: 1.0,
            targets: None,
            bursts_on_kill: false,
        }
    }

    /// Moves to the launch point and comes alive.
    pub fn spawn(&mut self, x: f32, y: f32) {
        self.body.position.set(Some(x), Some(y));
        self.body.life = 1.0;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), SimError> {
        self.speed = require_positive("speed", speed)?;
        Ok(())
    }

    pub fn set_power(&mut self, power: f32) -> Result<(), SimError> {
        self.power = require_positive("power", power)?;
        Ok(())
    }

    pub fn targets(&self) -> Option<TargetGroup> {
        self.targets
    }

    /// Rebinds the hit-test group. Takes effect from the next update.
    pub fn set_targets(&mut self, targets: TargetGroup) {
        self.targets = Some(targets);
    }

    pub fn bursts_on_kill(&self) -> bool {
        self.bursts_on_kill
    }

    /// Whether killing a target plays a burst from the shared burst pool.
    pub fn set_bursts(&mut self, enabled: bool) {
        self.bursts_on_kill = enabled;
    }

    /// One frame: move, leave the field, or hit the first live target in range.
    ///
    /// Targets are tested in slice order. A hit costs the target `power` life and
    /// always spends the projectile, whether or not the target survives.
    pub fn update<T, R>(
        &mut self,
        ctx: &TickContext,
        targets: &mut [T],
        mut bursts: Option<&mut Pool<ParticleBurst>>,
        rng: &mut R,
    ) where
        T: Entity,
        R: Rng + ?Sized,
    {
        if !self.body.is_alive() {
            return;
        }

        self.body.advance(self.speed);
        let position = self.body.position;
        if ctx
            .field
            .is_outside(position.x, position.y, self.body.width(), self.body.height())
        {
            self.body.life = 0.0;
            return;
        }

        for target in targets.iter_mut() {
            if !self.body.is_alive() {
                break;
            }
            if !target.is_alive() || !collides(&self.body, target.body()) {
                continue;
            }

            let target = target.body_mut();
            target.life -= self.power;
            if target.life <= 0.0 {
                match bursts.as_deref_mut().and_then(Pool::acquire) {
                    Some((index, burst)) => {
                        debug!("burst {index} at {:?}", target.position);
                        burst.activate(target.position, ctx.now, rng);
                    }
                    None => debug!("kill at {:?} without a free burst", target.position),
                }
            }
            self.body.life = 0.0;
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if self.body.is_alive() {
            self.body.draw_rotated(surface);
        }
    }
}

impl Entity for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Poolable for Projectile {
    fn is_free(&self) -> bool {
        !self.body.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Field, Vector2};
    use crate::input::InputSnapshot;
    use crate::surface::{RecordingSurface, Rgb};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FIELD: Field = Field::new(640.0, 480.0);

    fn shot_at(x: f32, y: f32) -> Projectile {
        let mut shot = Projectile::new(Sprite::ViperShot, 32.0, 32.0);
        shot.set_targets(TargetGroup::Enemies);
        shot.spawn(x, y);
        shot
    }

    fn target_at(x: f32, y: f32, life: f32) -> Body {
        Body::new(Sprite::Enemy, x, y, 48.0, 48.0, life)
    }

    fn bursts() -> Pool<ParticleBurst> {
        Pool::new(2, |_| ParticleBurst::new(50.0, 15, 30.0, 0.25, Rgb::new(255, 17, 102)))
    }

    fn step(shot: &mut Projectile, targets: &mut [Body], bursts: Option<&mut Pool<ParticleBurst>>) {
        let input = InputSnapshot::default();
        let ctx = TickContext::new(1_000, FIELD, &input);
        shot.update(&ctx, targets, bursts, &mut StdRng::seed_from_u64(1));
    }

    #[test]
    fn test_projectile_new_is_inactive() {
        let shot = Projectile::new(Sprite::ViperShot, 32.0, 32.0);
        assert!(shot.is_free());
        assert_eq!(shot.speed(), 7.0);
        assert_eq!(shot.power(), 1.0);
        assert_eq!(shot.targets(), None);
    }

    #[test]
    fn test_projectile_moves_along_direction() {
        let mut shot = shot_at(100.0, 300.0);
        step(&mut shot, &mut [], None);
        assert_eq!(shot.body.position, Vector2::new(100.0, 293.0));

        shot.body.set_direction(Some(0.0), Some(1.0));
        shot.set_speed(5.0).unwrap();
        step(&mut shot, &mut [], None);
        assert_eq!(shot.body.position, Vector2::new(100.0, 298.0));
    }

    #[test]
    fn test_projectile_dies_leaving_field() {
        let mut shot = shot_at(100.0, -30.0);
        step(&mut shot, &mut [], None);
        assert!(!shot.body.is_alive());
    }

    #[test]
    fn test_exit_margin_is_full_size_and_skips_hits() {
        // 32 wide: alive while within 32 of the edge
        let mut shot = shot_at(100.0, -25.0);
        step(&mut shot, &mut [], None);
        assert_eq!(shot.body.position.y, -32.0);
        assert!(shot.body.is_alive());

        let mut targets = [target_at(100.0, -39.0, 1.0)];
        step(&mut shot, &mut targets, None);
        assert!(!shot.body.is_alive());
        assert_eq!(targets[0].life, 1.0);
    }

    #[test]
    fn test_hit_inside_threshold() {
        // Shot ends the frame at (100, 293); threshold is (32 + 48) / 4 = 20
        let mut shot = shot_at(100.0, 300.0);
        let mut targets = [target_at(100.0, 274.0, 5.0)];
        step(&mut shot, &mut targets, None);
        assert_eq!(targets[0].life, 4.0);
        assert!(!shot.body.is_alive());
    }

    #[test]
    fn test_no_hit_outside_threshold() {
        let mut shot = shot_at(100.0, 300.0);
        let mut targets = [target_at(100.0, 272.0, 5.0)];
        step(&mut shot, &mut targets, None);
        assert_eq!(targets[0].life, 5.0);
        assert!(shot.body.is_alive());
    }

    #[test]
    fn test_dead_targets_are_skipped() {
        let mut shot = shot_at(100.0, 300.0);
        let mut targets = [target_at(100.0, 293.0, 0.0), target_at(100.0, 293.0, 2.0)];
        step(&mut shot, &mut targets, None);
        assert_eq!(targets[0].life, 0.0);
        assert_eq!(targets[1].life, 1.0);
    }

    #[test]
    fn test_single_use_against_first_hit() {
        let mut shot = shot_at(100.0, 300.0);
        let mut targets = [target_at(100.0, 293.0, 3.0), target_at(100.0, 293.0, 3.0)];
        step(&mut shot, &mut targets, None);
        assert_eq!(targets[0].life, 2.0);
        assert_eq!(targets[1].life, 3.0);
    }

    #[test]
    fn test_kill_plays_burst_at_target() {
        let mut shot = shot_at(100.0, 300.0);
        let mut targets = [target_at(100.0, 290.0, 1.0)];
        let mut pool = bursts();
        step(&mut shot, &mut targets, Some(&mut pool));
        assert_eq!(pool.active_indices(), vec![0]);
        assert_eq!(pool.get(0).unwrap().origin(), Some(Vector2::new(100.0, 290.0)));
    }

    #[test]
    fn test_survivor_plays_no_burst() {
        let mut shot = shot_at(100.0, 300.0);
        let mut targets = [target_at(100.0, 290.0, 2.0)];
        let mut pool = bursts();
        step(&mut shot, &mut targets, Some(&mut pool));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_invalid_setters_keep_previous_value() {
        let mut shot = Projectile::new(Sprite::EnemyShot, 16.0, 16.0);
        assert!(shot.set_speed(-1.0).is_err());
        assert!(shot.set_power(0.0).is_err());
        assert_eq!(shot.speed(), 7.0);
        assert_eq!(shot.power(), 1.0);

        // Ignoring the error is the lenient behavior: nothing changes
        let _ = shot.set_speed(f32::NAN);
        assert_eq!(shot.speed(), 7.0);
    }

    #[test]
    fn test_inactive_projectile_is_not_drawn() {
        let mut surface = RecordingSurface::new();
        Projectile::new(Sprite::ViperShot, 32.0, 32.0).draw(&mut surface);
        assert!(surface.calls.is_empty());

        shot_at(10.0, 10.0).draw(&mut surface);
        assert_eq!(surface.sprites(Sprite::ViperShot).count(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_hit_iff_within_quarter_widths(offset in 0.0f32..60.0) {
                let mut shot = shot_at(320.0, 300.0);
                let mut targets = [target_at(320.0, 293.0 - offset, 10.0)];
                let hit = Vector2::new(320.0, 293.0).distance(&targets[0].position) <= 20.0;
                step(&mut shot, &mut targets, None);
                prop_assert_eq!(targets[0].life < 10.0, hit);
                prop_assert_eq!(shot.body.is_alive(), !hit);
            }
        }
    }
}
