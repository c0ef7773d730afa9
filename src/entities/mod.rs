mod body;
mod context;
mod enemy;
mod game_state;
mod particle;
mod player;
mod pool;
mod projectile;
mod vector;

// Re-export all public types
pub use body::{Body, Entity, TEXTURE_UP, collides};
pub use context::{Field, TickContext};
pub use enemy::{DEFAULT_FIRE_FRAME, Enemy, EnemyType};
pub use game_state::GameState;
pub use particle::{ParticleBurst, SPARK_ALPHA};
pub use player::{ENTER_SPEED, MAIN_SHOT_POWER, PAIRED_SHOT_ANGLES, Player};
pub use pool::{Pool, Poolable};
pub use projectile::{Projectile, TargetGroup};
pub use vector::Vector2;
