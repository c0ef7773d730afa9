use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Visual resource an entity is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    Viper,
    ViperShot,
    ViperSingleShot,
    Enemy,
    EnemyShot,
}

impl Sprite {
    pub const ALL: [Sprite; 5] = [
        Sprite::Viper,
        Sprite::ViperShot,
        Sprite::ViperSingleShot,
        Sprite::Enemy,
        Sprite::EnemyShot,
    ];

    /// Image file backing this sprite, relative to the assets directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Sprite::Viper => "viper.png",
            Sprite::ViperShot => "viper_shot.png",
            Sprite::ViperSingleShot => "viper_single_shot.png",
            Sprite::Enemy => "enemy_small.png",
            Sprite::EnemyShot => "enemy_shot.png",
        }
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self, SimError> {
        let invalid = || SimError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Composites `self` over `background` at the given opacity.
    pub fn blend_over(self, background: Rgb, alpha: f32) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (bg as f32 + (fg as f32 - bg as f32) * alpha).round() as u8;
        Rgb::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

/// The drawing capability the simulation consumes.
///
/// Coordinates are in field units; every sprite is anchored at its center.
pub trait Surface {
    fn clear(&mut self, color: Rgb);

    fn draw_centered(&mut self, sprite: Sprite, x: f32, y: f32, w: f32, h: f32, alpha: f32);

    /// `rotation` is relative to the sprite's artwork, which points up.
    fn draw_rotated_centered(
        &mut self,
        sprite: Sprite,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
    );

    /// Filled square of side `size` centered at `(x, y)`.
    fn fill_square(&mut self, x: f32, y: f32, size: f32, color: Rgb, alpha: f32);
}

/// A single call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Rgb),
    Sprite {
        sprite: Sprite,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        alpha: f32,
    },
    RotatedSprite {
        sprite: Sprite,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
    },
    Square {
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
        alpha: f32,
    },
}

/// Surface that remembers what was drawn, for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprites(&self, wanted: Sprite) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(move |call| match call {
            DrawCall::Sprite { sprite, .. } | DrawCall::RotatedSprite { sprite, .. } => {
                *sprite == wanted
            }
            _ => false,
        })
    }

    pub fn squares(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Square { .. }))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Rgb) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn draw_centered(&mut self, sprite: Sprite, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        self.calls.push(DrawCall::Sprite {
            sprite,
            x,
            y,
            w,
            h,
            alpha,
        });
    }

    fn draw_rotated_centered(
        &mut self,
        sprite: Sprite,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
    ) {
        self.calls.push(DrawCall::RotatedSprite {
            sprite,
            x,
            y,
            w,
            h,
            rotation,
        });
    }

    fn fill_square(&mut self, x: f32, y: f32, size: f32, color: Rgb, alpha: f32) {
        self.calls.push(DrawCall::Square {
            x,
            y,
            size,
            color,
            alpha,
        });
    }
}
