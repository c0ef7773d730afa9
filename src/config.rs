//! Game configuration
//!
//! Loaded from a JSON file. Every section falls back to its defaults, so a file
//! only needs to list the values it changes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use log::info;
use serde::{Deserialize, Serialize};

use crate::entities::{Field, Vector2};
use crate::error::SimError;
use crate::scene::Phase;
use crate::surface::Rgb;

/// File looked up when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "viper.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: f32,
    pub speed: f32,
    /// Frames between volleys
    pub fire_interval: i32,
    /// How far below the bottom edge the entrance starts
    pub enter_below: f32,
    /// How far above the bottom edge the entrance stops
    pub enter_stop_above: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 64.0,
            speed: 3.0,
            fire_interval: 10,
            enter_below: 50.0,
            enter_stop_above: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    pub size: f32,
    pub speed: f32,
    pub single_size: f32,
    pub enemy_size: f32,
    pub enemy_speed: f32,
    pub capacity: usize,
    /// Paired shots are handed out two at a time, so this must be even
    pub single_capacity: usize,
    pub enemy_capacity: usize,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            size: 32.0,
            speed: 7.0,
            single_size: 32.0,
            enemy_size: 16.0,
            enemy_speed: 5.0,
            capacity: 10,
            single_capacity: 20,
            enemy_capacity: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub size: f32,
    pub speed: f32,
    pub capacity: usize,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            size: 48.0,
            speed: 3.0,
            capacity: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub radius: f32,
    pub sparks: usize,
    pub spark_size: f32,
    /// Seconds from ignition to fully spread
    pub time_range: f32,
    pub color: String,
    pub capacity: usize,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            radius: 50.0,
            sparks: 15,
            spark_size: 30.0,
            time_range: 0.25,
            color: "#ff1166".to_string(),
            capacity: 10,
        }
    }
}

impl BurstConfig {
    pub fn rgb(&self) -> Result<Rgb, SimError> {
        Rgb::from_hex(&self.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub player: PlayerConfig,
    pub shots: ShotConfig,
    pub enemies: EnemyConfig,
    pub bursts: BurstConfig,
    /// Fixed seed for burst headings; a fresh one per run when absent
    pub seed: Option<u64>,
    /// Phase the wave script starts in
    pub opening_phase: String,
    pub assets_dir: PathBuf,
    pub fire_sound: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            player: PlayerConfig::default(),
            shots: ShotConfig::default(),
            enemies: EnemyConfig::default(),
            bursts: BurstConfig::default(),
            seed: None,
            opening_phase: Phase::Intro.name().to_string(),
            assets_dir: PathBuf::from("assets"),
            fire_sound: PathBuf::from("assets/fire.wav"),
        }
    }
}

impl GameConfig {
    /// Reads `path`. A missing file gives the defaults, a malformed one is an error.
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).wrap_err_with(|| format!("reading {}", path.display()));
            }
        };

        let config: Self = serde_json::from_str(&text)
            .wrap_err_with(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .wrap_err_with(|| format!("checking {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("field.width", self.field.width),
            ("field.height", self.field.height),
            ("player.size", self.player.size),
            ("player.speed", self.player.speed),
            ("shots.size", self.shots.size),
            ("shots.speed", self.shots.speed),
            ("shots.single_size", self.shots.single_size),
            ("shots.enemy_size", self.shots.enemy_size),
            ("shots.enemy_speed", self.shots.enemy_speed),
            ("enemies.size", self.enemies.size),
            ("enemies.speed", self.enemies.speed),
            ("bursts.time_range", self.bursts.time_range),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.player.fire_interval < 0 {
            return Err(SimError::InvalidConfig(format!(
                "player.fire_interval must not be negative, got {}",
                self.player.fire_interval
            )));
        }
        if self.shots.single_capacity % 2 != 0 {
            return Err(SimError::InvalidConfig(format!(
                "shots.single_capacity must be even, got {}",
                self.shots.single_capacity
            )));
        }
        self.bursts.rgb()?;
        self.opening()?;
        Ok(())
    }

    pub fn opening(&self) -> Result<Phase, SimError> {
        self.opening_phase.parse()
    }

    pub fn field(&self) -> Field {
        Field::new(self.field.width, self.field.height)
    }

    /// Start and end points of the player's entrance flight.
    pub fn entrance(&self) -> (Vector2, Vector2) {
        let x = self.field.width / 2.0;
        let bottom = self.field.height;
        (
            Vector2::new(x, bottom + self.player.enter_below),
            Vector2::new(x, bottom - self.player.enter_stop_above),
        )
    }
}
