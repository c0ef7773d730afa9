use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use log::info;
use ratatui::{Terminal, backend::Backend};
use std::time::{Duration, Instant};

use crate::assets::AssetLoader;
use crate::audio::AudioManager;
use crate::clock::{Clock, MonotonicClock};
use crate::config::GameConfig;
use crate::entities::{GameState, TickContext};
use crate::input::{InputAction, InputManager};
use crate::renderer::{GameRenderer, RenderView};
use crate::world::World;

/// Target duration of one frame.
const FRAME: Duration = Duration::from_millis(16);

/// The main application which holds the state and logic of the application.
pub struct App {
    running: bool,
    game_state: GameState,
    config: GameConfig,
    world: World,
    clock: MonotonicClock,
    /// Volleys already voiced by the fire sound
    voiced_volleys: u64,
    /// Frames info
    frame_count: u64,
    last_frame_time: Instant,
    fps: u32,
    /// Game timers
    game_start_time: Instant,
    final_time_secs: Option<u64>,
    /// internal components
    assets: AssetLoader,
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: Option<AudioManager>,
}

impl App {
    /// Starts loading assets and builds the first world. Play begins once the sprites are in.
    pub fn new(config: GameConfig) -> Result<Self> {
        let clock = MonotonicClock::new();
        let world = World::new(&config, clock.now_ms()).wrap_err("building the world")?;
        let assets = AssetLoader::spawn(&config.assets_dir)?;
        let audio_manager = AudioManager::try_new(&config.fire_sound);

        let now = Instant::now();
        Ok(Self {
            running: true,
            game_state: GameState::Loading,
            config,
            world,
            clock,
            voiced_volleys: 0,
            frame_count: 0,
            last_frame_time: now,
            fps: 0,
            game_start_time: now,
            final_time_secs: None,
            assets,
            input_manager: InputManager::new(),
            renderer: GameRenderer::new(),
            audio_manager,
        })
    }

    /// Run the application's main loop.
    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.running {
            let frame_start = Instant::now();
            let frame_time = frame_start.duration_since(self.last_frame_time);
            self.last_frame_time = frame_start;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            let now = self.clock.now_ms();
            terminal.draw(|frame| {
                let elapsed_time_secs = self
                    .final_time_secs
                    .unwrap_or_else(|| self.game_start_time.elapsed().as_secs());
                let view = RenderView {
                    game_state: self.game_state,
                    world: &self.world,
                    palette: self.assets.palette(),
                    now,
                    area: frame.area(),
                    fps: self.fps,
                    elapsed_time_secs,
                    assets_progress: self.assets.progress(),
                };
                self.renderer.render(frame, &view);
            })?;

            self.input_manager.poll_events(&self.game_state)?;
            let actions = self.input_manager.actions().to_vec();
            self.process_actions(&actions)?;

            match self.game_state {
                GameState::Loading => self.update_loading()?,
                GameState::Playing | GameState::GameOver => self.update_game(),
                GameState::Paused => {}
            }

            std::thread::sleep(FRAME.saturating_sub(frame_start.elapsed()));
        }
        Ok(())
    }

    /// Process input actions and update game state accordingly
    fn process_actions(&mut self, actions: &[InputAction]) -> Result<()> {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.game_state = GameState::Paused;
                    self.input_manager.release_all();
                }
                InputAction::Resume => {
                    self.game_state = GameState::Playing;
                }
                InputAction::Restart => {
                    info!("restarting");
                    self.start_world()?;
                }
            }
        }
        Ok(())
    }

    fn update_loading(&mut self) -> Result<()> {
        self.assets.poll(&mut self.world);
        if self.world.is_ready() {
            // The entrance and the intro timer start when play does
            self.start_world()?;
        }
        Ok(())
    }

    /// Fresh world on the current clock, with every loaded sprite already marked.
    fn start_world(&mut self) -> Result<()> {
        let mut world =
            World::new(&self.config, self.clock.now_ms()).wrap_err("building the world")?;
        self.assets.apply(&mut world);
        self.world = world;
        self.voiced_volleys = 0;
        self.frame_count = 0;
        self.game_start_time = Instant::now();
        self.final_time_secs = None;
        self.game_state = GameState::Playing;
        Ok(())
    }

    /// Update game logic
    fn update_game(&mut self) {
        self.frame_count += 1;

        let input = self.input_manager.snapshot();
        let ctx = TickContext::new(self.clock.now_ms(), self.world.field(), &input);
        self.world.tick(&ctx);

        let volleys = self.world.player().volleys();
        if volleys != self.voiced_volleys {
            self.voiced_volleys = volleys;
            if let Some(audio) = &self.audio_manager {
                audio.play_fire_sound();
            }
        }

        // The field keeps running behind the game over screen
        if self.game_state == GameState::Playing && self.world.is_game_over() {
            let survived = self.game_start_time.elapsed().as_secs();
            info!("game over after {survived}s and {} frames", self.frame_count);
            self.final_time_secs = Some(survived);
            self.game_state = GameState::GameOver;
            self.input_manager.release_all();
        }
    }
}
