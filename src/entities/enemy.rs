use log::debug;

use super::body::{Body, Entity};
use super::context::TickContext;
use super::pool::{Pool, Poolable};
use super::projectile::Projectile;
use crate::surface::{Sprite, Surface};

/// Frame on which a `Default` enemy fires its single shot.
pub const DEFAULT_FIRE_FRAME: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyType {
    /// Flies straight along its direction and fires once.
    #[default]
    Default,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Body,
    pub enemy_type: EnemyType,
    frame: u32,
    speed: f32,
    shot_speed: f32,
}

impl Enemy {
    /// An inactive enemy, ready to sit in a pool.
    pub fn new(width: f32, height: f32, speed: f32, shot_speed: f32) -> Self {
        Self {
            body: Body::new(Sprite::Enemy, 0.0, 0.0, width, height, 0.0),
            enemy_type: EnemyType::Default,
            frame: 0,
            speed,
            shot_speed,
        }
    }

    /// Resets this slot into a live enemy at `(x, y)`.
    pub fn spawn(&mut self, x: f32, y: f32, life: f32, enemy_type: EnemyType) {
        self.body.position.set(Some(x), Some(y));
        self.body.life = life;
        self.enemy_type = enemy_type;
        self.frame = 0;
    }

    /// Frames lived since the last spawn.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn update(&mut self, ctx: &TickContext, shots: &mut Pool<Projectile>) {
        if !self.body.is_alive() {
            return;
        }

        match self.enemy_type {
            EnemyType::Default => {
                if self.frame == DEFAULT_FIRE_FRAME {
                    self.fire(shots, 0.0, 1.0);
                }
                self.body.advance(self.speed);
                if self.body.position.y - self.body.height() > ctx.field.height {
                    self.body.life = 0.0;
                }
            }
        }

        self.frame += 1;
    }

    /// Launches one shot from the first free slot, heading `(x, y)`.
    pub fn fire(&mut self, shots: &mut Pool<Projectile>, x: f32, y: f32) {
        let position = self.body.position;
        match shots.acquire() {
            Some((_, shot)) => {
                shot.spawn(position.x, position.y);
                let _ = shot.set_speed(self.shot_speed);
                shot.body.set_direction(Some(x), Some(y));
            }
            None => debug!("enemy shot dropped, pool exhausted"),
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if self.body.is_alive() {
            self.body.draw(surface, 1.0);
        }
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Poolable for Enemy {
    fn is_free(&self) -> bool {
        !self.body.is_alive()
    }
}
