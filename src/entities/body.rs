use std::f32::consts::PI;

use super::vector::Vector2;
use crate::surface::{Sprite, Surface};

/// Heading of artwork drawn without rotation: straight up, 270 degrees.
pub const TEXTURE_UP: f32 = PI * 1.5;

/// State shared by the player, projectiles and enemies.
///
/// `life` is both hit points and the liveness flag: anything at or below zero
/// is inactive and, for pooled kinds, free for reuse.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vector2,
    pub direction: Vector2,
    pub life: f32,
    angle: f32,
    width: f32,
    height: f32,
    sprite: Sprite,
    ready: bool,
}

impl Body {
    pub fn new(sprite: Sprite, x: f32, y: f32, width: f32, height: f32, life: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            direction: Vector2::new(0.0, -1.0),
            life,
            angle: TEXTURE_UP,
            width,
            height,
            sprite,
            ready: false,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn sprite(&self) -> Sprite {
        self.sprite
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Flags the visual resource as loaded. There is no way back.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Partial direction update; the drawing angle is left alone.
    pub fn set_direction(&mut self, x: Option<f32>, y: Option<f32>) {
        self.direction.set(x, y);
    }

    pub fn set_direction_from_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.direction = Vector2::from_angle(angle);
    }

    /// Back to the default heading: straight up.
    pub fn aim_up(&mut self) {
        self.angle = TEXTURE_UP;
        self.direction = Vector2::new(0.0, -1.0);
    }

    /// One frame of constant-velocity motion along `direction`.
    pub fn advance(&mut self, speed: f32) {
        self.position = self.position + self.direction * speed;
    }

    pub fn draw(&self, surface: &mut dyn Surface, alpha: f32) {
        surface.draw_centered(
            self.sprite,
            self.position.x,
            self.position.y,
            self.width,
            self.height,
            alpha,
        );
    }

    pub fn draw_rotated(&self, surface: &mut dyn Surface) {
        surface.draw_rotated_centered(
            self.sprite,
            self.position.x,
            self.position.y,
            self.width,
            self.height,
            self.angle - TEXTURE_UP,
        );
    }
}

/// Anything that can be hit by a projectile.
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn position(&self) -> Vector2 {
        self.body().position
    }

    fn life(&self) -> f32 {
        self.body().life
    }

    fn is_alive(&self) -> bool {
        self.body().is_alive()
    }
}

impl Entity for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}

/// Hit test: distance no more than a quarter of the summed widths.
pub fn collides(a: &Body, b: &Body) -> bool {
    a.position.distance(&b.position) <= (a.width + b.width) / 4.0
}
