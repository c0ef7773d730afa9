/// Top-level state of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Sprites are still loading; the simulation has not started ticking
    Loading,
    Playing,
    Paused,
    GameOver,
}
