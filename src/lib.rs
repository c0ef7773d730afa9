// Library exports for testing
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::GameConfig;
pub use entities::{
    Enemy, EnemyType, Field, GameState, ParticleBurst, Player, Pool, Projectile, TargetGroup,
    TickContext, Vector2,
};
pub use error::SimError;
pub use scene::{EnemySpawn, Phase, SceneManager};
pub use surface::{RecordingSurface, Rgb, Sprite, Surface};
pub use world::World;

pub mod app;
pub mod assets;
pub mod audio;
pub mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod surface;
pub mod world;
