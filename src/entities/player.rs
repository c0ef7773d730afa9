use std::f32::consts::PI;

use log::{debug, info};

use super::body::{Body, Entity};
use super::context::TickContext;
use super::pool::Pool;
use super::projectile::Projectile;
use super::vector::Vector2;
use crate::clock::elapsed_secs;
use crate::error::{SimError, require_positive};
use crate::input::Key;
use crate::surface::{Sprite, Surface};

/// How fast the entrance flight climbs, in field units per second.
pub const ENTER_SPEED: f32 = 50.0;
/// Power of the main cannon shot.
pub const MAIN_SHOT_POWER: f32 = 2.0;
/// Headings of the paired side shots: 10 degrees either side of straight up.
pub const PAIRED_SHOT_ANGLES: [f32; 2] = [280.0 * PI / 180.0, 260.0 * PI / 180.0];

/// Opacity while the entrance flicker is in its dim half.
const FLICKER_ALPHA: f32 = 0.5;

/// The player's ship: an entrance flight, then free movement and firing.
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    entering: bool,
    enter_start_time: u64,
    enter_start: Vector2,
    enter_end: Vector2,
    speed: f32,
    fire_counter: i32,
    fire_interval: i32,
    volleys: u64,
}

impl Player {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            body: Body::new(Sprite::Viper, 0.0, 0.0, width, height, 0.0),
            entering: false,
            enter_start_time: 0,
            enter_start: Vector2::default(),
            enter_end: Vector2::default(),
            speed: 3.0,
            fire_counter: 0,
            fire_interval: 10,
            volleys: 0,
        }
    }

    /// Starts the entrance flight from `start` up to `end` and brings the ship to life.
    pub fn set_coming(&mut self, start: Vector2, end: Vector2, now: u64) {
        self.entering = true;
        self.enter_start_time = now;
        self.enter_start = start;
        self.enter_end = end;
        self.body.position = start;
        self.body.life = 1.0;
        info!("player entering from {start:?} to {end:?}");
    }

    pub fn is_entering(&self) -> bool {
        self.entering
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), SimError> {
        self.speed = require_positive("speed", speed)?;
        Ok(())
    }

    pub fn fire_interval(&self) -> i32 {
        self.fire_interval
    }

    /// Frames between volleys. Negative intervals are rejected.
    pub fn set_fire_interval(&mut self, frames: i32) -> Result<(), SimError> {
        if frames < 0 {
            return Err(SimError::InvalidArgument {
                name: "fire_interval",
                value: frames as f32,
            });
        }
        self.fire_interval = frames;
        Ok(())
    }

    /// Cooldown counter; firing is allowed once it is back at zero or above.
    pub fn fire_counter(&self) -> i32 {
        self.fire_counter
    }

    /// Number of triggers that launched at least one shot.
    pub fn volleys(&self) -> u64 {
        self.volleys
    }

    pub fn update(
        &mut self,
        ctx: &TickContext,
        main_shots: &mut Pool<Projectile>,
        paired_shots: &mut Pool<Projectile>,
    ) {
        if !self.body.is_alive() {
            return;
        }

        if self.entering {
            self.fly_entrance(ctx.now);
        } else {
            self.steer(ctx);
        }

        if ctx.input.is_held(Key::Fire) && self.fire_counter >= 0 {
            self.fire(main_shots, paired_shots);
        }
        self.fire_counter += 1;
    }

    fn fly_entrance(&mut self, now: u64) {
        let elapsed = elapsed_secs(self.enter_start_time, now);
        let mut y = self.enter_start.y - elapsed * ENTER_SPEED;
        if y <= self.enter_end.y {
            y = self.enter_end.y;
            self.entering = false;
            debug!("player entrance finished after {elapsed:.2}s");
        }
        self.body.position.set(None, Some(y));
    }

    fn steer(&mut self, ctx: &TickContext) {
        let input = ctx.input;
        let position = &mut self.body.position;
        if input.is_held(Key::Left) {
            position.x -= self.speed;
        }
        if input.is_held(Key::Right) {
            position.x += self.speed;
        }
        if input.is_held(Key::Up) {
            position.y -= self.speed;
        }
        if input.is_held(Key::Down) {
            position.y += self.speed;
        }
        let (x, y) = ctx.field.clamp(position.x, position.y);
        position.set(Some(x), Some(y));
    }

    /// Main shot and paired shots are tried independently on the same trigger.
    fn fire(&mut self, main_shots: &mut Pool<Projectile>, paired_shots: &mut Pool<Projectile>) {
        let Vector2 { x, y } = self.body.position;
        let mut fired = false;

        if let Some((_, shot)) = main_shots.acquire() {
            shot.spawn(x, y);
            shot.body.aim_up();
            let _ = shot.set_power(MAIN_SHOT_POWER);
            fired = true;
        }

        if let Some((_, right, left)) = paired_shots.acquire_pair() {
            right.spawn(x, y);
            right.body.set_direction_from_angle(PAIRED_SHOT_ANGLES[0]);
            left.spawn(x, y);
            left.body.set_direction_from_angle(PAIRED_SHOT_ANGLES[1]);
            fired = true;
        }

        if fired {
            self.fire_counter = -self.fire_interval;
            self.volleys += 1;
        }
    }

    /// Opacity for this instant: the entrance flickers every 50ms.
    pub fn alpha_at(&self, now: u64) -> f32 {
        if self.entering && now % 100 < 50 {
            FLICKER_ALPHA
        } else {
            1.0
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, now: u64) {
        if self.body.is_alive() {
            self.body.draw(surface, self.alpha_at(now));
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
