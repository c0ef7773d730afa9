//! Sprite loading
//!
//! Images are decoded on a background thread. The terminal cannot show the
//! pixels, so each sprite is reduced to the average color of its opaque pixels
//! and drawn in that tint. Results come back over a channel and are handed to
//! the world as they arrive.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::thread;

use color_eyre::eyre::WrapErr;
use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use log::{debug, info, warn};

use crate::surface::{Rgb, Sprite};
use crate::world::World;

/// Pixels at or below this alpha do not count towards the tint.
const OPAQUE_THRESHOLD: u8 = 128;

/// Tint used until (or instead of) the sprite's image.
pub fn default_tint(sprite: Sprite) -> Rgb {
    match sprite {
        Sprite::Viper => Rgb::new(0x4c, 0xd9, 0x64),
        Sprite::ViperShot => Rgb::new(0xff, 0xe0, 0x66),
        Sprite::ViperSingleShot => Rgb::new(0x66, 0xe0, 0xff),
        Sprite::Enemy => Rgb::new(0xff, 0x55, 0x55),
        Sprite::EnemyShot => Rgb::new(0xff, 0x66, 0xff),
    }
}

/// One finished sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSprite {
    pub sprite: Sprite,
    pub tint: Rgb,
    /// False when the image was missing or unreadable and the default tint is used.
    pub from_image: bool,
}

/// Tint per sprite.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    tints: HashMap<Sprite, Rgb>,
}

impl Palette {
    pub fn tint(&self, sprite: Sprite) -> Rgb {
        self.tints
            .get(&sprite)
            .copied()
            .unwrap_or_else(|| default_tint(sprite))
    }

    pub fn set(&mut self, sprite: Sprite, tint: Rgb) {
        self.tints.insert(sprite, tint);
    }
}

/// Average color of the opaque pixels in the image at `path`.
pub fn load_tint(path: &Path) -> Result<Option<Rgb>, image::ImageError> {
    let image = image::open(path)?.to_rgba8();
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        if a > OPAQUE_THRESHOLD {
            sum[0] += u64::from(r);
            sum[1] += u64::from(g);
            sum[2] += u64::from(b);
            count += 1;
        }
    }
    if count == 0 {
        return Ok(None);
    }
    let channel = |total: u64| (total / count) as u8;
    Ok(Some(Rgb::new(channel(sum[0]), channel(sum[1]), channel(sum[2]))))
}

fn load_sprite(dir: &Path, sprite: Sprite) -> LoadedSprite {
    let path = dir.join(sprite.file_name());
    match load_tint(&path) {
        Ok(Some(tint)) => LoadedSprite {
            sprite,
            tint,
            from_image: true,
        },
        Ok(None) => {
            warn!("{} has no opaque pixels, using default tint", path.display());
            LoadedSprite {
                sprite,
                tint: default_tint(sprite),
                from_image: false,
            }
        }
        Err(err) => {
            warn!("could not load {}: {err}", path.display());
            LoadedSprite {
                sprite,
                tint: default_tint(sprite),
                from_image: false,
            }
        }
    }
}

/// Loads every sprite in the background and reports each one once.
pub struct AssetLoader {
    receiver: Receiver<LoadedSprite>,
    palette: Palette,
    loaded: HashSet<Sprite>,
    finished: bool,
}

impl AssetLoader {
    pub fn spawn(dir: impl Into<PathBuf>) -> color_eyre::Result<Self> {
        let dir = dir.into();
        let (sender, receiver) = unbounded();
        thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                for sprite in Sprite::ALL {
                    if sender.send(load_sprite(&dir, sprite)).is_err() {
                        break;
                    }
                }
            })
            .wrap_err("starting asset loader thread")?;

        Ok(Self {
            receiver,
            palette: Palette::default(),
            loaded: HashSet::new(),
            finished: false,
        })
    }

    /// Takes whatever has arrived and marks those sprites ready in `world`.
    /// Returns how many sprites arrived.
    pub fn poll(&mut self, world: &mut World) -> usize {
        let mut arrived = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(loaded) => {
                    if loaded.from_image {
                        debug!("{:?} tinted {:?} from its image", loaded.sprite, loaded.tint);
                    } else {
                        debug!("{:?} drawn in its default tint", loaded.sprite);
                    }
                    self.palette.set(loaded.sprite, loaded.tint);
                    self.loaded.insert(loaded.sprite);
                    world.mark_ready(loaded.sprite);
                    arrived += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.finished {
                        info!("assets loaded: {}/{}", self.loaded.len(), Sprite::ALL.len());
                        self.finished = true;
                    }
                    break;
                }
            }
        }
        arrived
    }

    /// Marks every sprite loaded so far as ready in a freshly built world.
    pub fn apply(&self, world: &mut World) {
        for sprite in &self.loaded {
            world.mark_ready(*sprite);
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Sprites received so far, out of the total.
    pub fn progress(&self) -> (usize, usize) {
        (self.loaded.len(), Sprite::ALL.len())
    }
}
