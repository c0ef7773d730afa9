//! Phase registry that paces the enemy waves.
//!
//! Phases are keyed by an identifier and mapped to plain transition functions.
//! Each tick the active function sees how long its phase has been running, both
//! in seconds and in frames, and answers with an optional next phase and a list
//! of enemies to spawn. The manager never touches the world itself.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::str::FromStr;

use log::{info, warn};

use crate::clock::elapsed_secs;
use crate::entities::{EnemyType, Field, Vector2};
use crate::error::SimError;

/// Identifier of a phase.
pub trait PhaseKey: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> PhaseKey for T {}

/// What a transition function gets to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTick {
    /// Seconds since the phase was (re)entered.
    pub elapsed: f32,
    /// Ticks since the phase was (re)entered; the first tick sees 0.
    pub frame: i64,
}

/// Request to bring one enemy into play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub position: Vector2,
    pub direction: Vector2,
    pub life: f32,
    pub enemy_type: EnemyType,
}

/// Answer of a transition function for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<K> {
    pub next: Option<K>,
    pub spawns: Vec<EnemySpawn>,
}

impl<K> Transition<K> {
    pub fn stay() -> Self {
        Self {
            next: None,
            spawns: Vec::new(),
        }
    }

    pub fn switch(next: K) -> Self {
        Self {
            next: Some(next),
            spawns: Vec::new(),
        }
    }
}

pub type TransitionFn<K> = fn(PhaseTick, &Field) -> Transition<K>;

pub struct SceneManager<K: PhaseKey> {
    phases: HashMap<K, TransitionFn<K>>,
    active: Option<K>,
    activated_at: u64,
    frame: i64,
}

impl<K: PhaseKey> Default for SceneManager<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PhaseKey> SceneManager<K> {
    pub fn new() -> Self {
        Self {
            phases: HashMap::new(),
            active: None,
            activated_at: 0,
            frame: 0,
        }
    }

    /// Registers `transition` under `key`, replacing any earlier registration.
    pub fn add(&mut self, key: K, transition: TransitionFn<K>) {
        if self.phases.insert(key, transition).is_some() {
            warn!("phase {key:?} was already registered and has been replaced");
        }
    }

    /// Makes `key` the active phase and restarts its timers.
    ///
    /// An unregistered key is rejected and leaves the active phase, its start
    /// time and its frame counter untouched.
    pub fn use_phase(&mut self, key: K, now: u64) -> Result<(), SimError> {
        if !self.phases.contains_key(&key) {
            warn!("phase {key:?} is not registered");
            return Err(SimError::UnknownScene(format!("{key:?}")));
        }
        if self.active != Some(key) {
            info!("entering phase {key:?}");
        }
        self.active = Some(key);
        self.activated_at = now;
        self.frame = -1;
        Ok(())
    }

    pub fn active(&self) -> Option<K> {
        self.active
    }

    pub fn frame(&self) -> i64 {
        self.frame
    }

    pub fn elapsed(&self, now: u64) -> f32 {
        elapsed_secs(self.activated_at, now)
    }

    /// Runs the active phase for one tick and returns the spawns it asked for.
    ///
    /// The frame counter advances before the phase runs, so the first tick after
    /// `use_phase` sees frame 0. A switch requested by the phase re-arms the
    /// counter and the new phase sees frame 0 on the following tick.
    pub fn update(&mut self, now: u64, field: &Field) -> Vec<EnemySpawn> {
        let Some(key) = self.active else {
            return Vec::new();
        };
        let Some(transition) = self.phases.get(&key).copied() else {
            return Vec::new();
        };

        self.frame += 1;
        let tick = PhaseTick {
            elapsed: self.elapsed(now),
            frame: self.frame,
        };
        let Transition { next, spawns } = transition(tick, field);
        if let Some(next) = next {
            // Rejection is logged by use_phase; the current phase keeps running
            let _ = self.use_phase(next, now);
        }
        spawns
    }
}

/// Phases of the demonstration wave script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Intro,
    Invade,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Intro => "intro",
            Phase::Invade => "invade",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = SimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "intro" => Ok(Phase::Intro),
            "invade" => Ok(Phase::Invade),
            other => Err(SimError::UnknownScene(other.to_string())),
        }
    }
}

/// Seconds the intro lasts before the invasion starts.
pub const INTRO_SECONDS: f32 = 2.0;
/// Frame of `invade` on which the phase re-enters itself.
pub const INVADE_CYCLE_FRAMES: i64 = 100;
/// Life of each invading enemy.
pub const INVADER_LIFE: f32 = 2.0;

pub fn intro(tick: PhaseTick, _field: &Field) -> Transition<Phase> {
    if tick.elapsed > INTRO_SECONDS {
        Transition::switch(Phase::Invade)
    } else {
        Transition::stay()
    }
}

/// One enemy at the top center on frame 0, then start over on frame 100.
pub fn invade(tick: PhaseTick, field: &Field) -> Transition<Phase> {
    let mut transition = Transition::stay();
    if tick.frame == 0 {
        transition.spawns.push(EnemySpawn {
            position: Vector2::new(field.width / 2.0, 0.0),
            direction: Vector2::new(0.0, 1.0),
            life: INVADER_LIFE,
            enemy_type: EnemyType::Default,
        });
    }
    if tick.frame == INVADE_CYCLE_FRAMES {
        transition.next = Some(Phase::Invade);
    }
    transition
}

/// The demonstration script: `intro`, then an endless `invade` loop.
pub fn wave_script() -> SceneManager<Phase> {
    let mut scenes = SceneManager::new();
    scenes.add(Phase::Intro, intro);
    scenes.add(Phase::Invade, invade);
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: Field = Field::new(640.0, 480.0);

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
        Missing,
    }

    fn to_b_after_three_frames(tick: PhaseTick, _field: &Field) -> Transition<Key> {
        if tick.frame == 3 {
            Transition::switch(Key::B)
        } else {
            Transition::stay()
        }
    }

    fn stay_b(_tick: PhaseTick, _field: &Field) -> Transition<Key> {
        Transition::stay()
    }

    fn manager() -> SceneManager<Key> {
        let mut scenes = SceneManager::new();
        scenes.add(Key::A, to_b_after_three_frames);
        scenes.add(Key::B, stay_b);
        scenes
    }

    #[test]
    fn test_update_without_active_phase_is_noop() {
        let mut scenes = manager();
        assert!(scenes.update(0, &FIELD).is_empty());
        assert_eq!(scenes.active(), None);
        assert_eq!(scenes.frame(), 0);
    }

    #[test]
    fn test_first_tick_after_use_sees_frame_zero() {
        let mut scenes = manager();
        scenes.use_phase(Key::B, 0).unwrap();
        assert_eq!(scenes.frame(), -1);
        scenes.update(16, &FIELD);
        assert_eq!(scenes.frame(), 0);
        scenes.update(32, &FIELD);
        assert_eq!(scenes.frame(), 1);
    }

    #[test]
    fn test_switch_rearms_timers() {
        let mut scenes = manager();
        scenes.use_phase(Key::A, 0).unwrap();
        for frame in 0..4 {
            scenes.update(frame * 10, &FIELD);
        }
        assert_eq!(scenes.active(), Some(Key::B));
        // Switched on the tick at 30ms
        assert_eq!(scenes.frame(), -1);
        assert_eq!(scenes.elapsed(130), 0.1);
        scenes.update(40, &FIELD);
        assert_eq!(scenes.frame(), 0);
    }

    #[test]
    fn test_unknown_phase_is_rejected_without_side_effects() {
        let mut scenes = manager();
        scenes.use_phase(Key::A, 100).unwrap();
        scenes.update(116, &FIELD);

        let err = scenes.use_phase(Key::Missing, 500).unwrap_err();
        assert_eq!(err, SimError::UnknownScene("Missing".into()));
        assert_eq!(scenes.active(), Some(Key::A));
        assert_eq!(scenes.frame(), 0);
        assert_eq!(scenes.elapsed(1_100), 1.0);
    }

    #[test]
    fn test_ignored_unknown_phase_keeps_running() {
        let mut scenes = manager();
        scenes.use_phase(Key::B, 0).unwrap();
        let _ = scenes.use_phase(Key::Missing, 50);
        scenes.update(60, &FIELD);
        assert_eq!(scenes.active(), Some(Key::B));
        assert_eq!(scenes.frame(), 0);
    }

    #[test]
    fn test_add_replaces_existing() {
        let mut scenes = manager();
        scenes.add(Key::A, stay_b);
        scenes.use_phase(Key::A, 0).unwrap();
        for frame in 0..10 {
            scenes.update(frame, &FIELD);
        }
        assert_eq!(scenes.active(), Some(Key::A));
    }

    #[test]
    fn test_phase_names_round_trip() {
        assert_eq!("intro".parse::<Phase>(), Ok(Phase::Intro));
        assert_eq!("invade".parse::<Phase>(), Ok(Phase::Invade));
        assert_eq!(
            "outro".parse::<Phase>(),
            Err(SimError::UnknownScene("outro".into()))
        );
        assert_eq!(Phase::Invade.to_string(), "invade");
    }

    #[test]
    fn test_intro_switches_only_after_two_seconds() {
        let tick = |elapsed| PhaseTick { elapsed, frame: 0 };
        assert_eq!(intro(tick(2.0), &FIELD).next, None);
        assert_eq!(intro(tick(2.001), &FIELD).next, Some(Phase::Invade));
    }

    #[test]
    fn test_invade_spawns_on_frame_zero_and_cycles_at_hundred() {
        let tick = |frame| PhaseTick {
            elapsed: 0.0,
            frame,
        };
        let first = invade(tick(0), &FIELD);
        assert_eq!(first.next, None);
        assert_eq!(first.spawns.len(), 1);
        assert_eq!(first.spawns[0].position, Vector2::new(320.0, 0.0));
        assert_eq!(first.spawns[0].direction, Vector2::new(0.0, 1.0));
        assert_eq!(first.spawns[0].life, INVADER_LIFE);

        assert_eq!(invade(tick(50), &FIELD), Transition::stay());
        let cycle = invade(tick(100), &FIELD);
        assert_eq!(cycle.next, Some(Phase::Invade));
        assert!(cycle.spawns.is_empty());
    }

    #[test]
    fn test_wave_script_spawns_every_cycle() {
        let mut scenes = wave_script();
        scenes.use_phase(Phase::Invade, 0).unwrap();
        let mut spawn_frames = Vec::new();
        for tick in 0..250u64 {
            if !scenes.update(tick * 16, &FIELD).is_empty() {
                spawn_frames.push(tick);
            }
        }
        // Frames 0..=100 are one cycle and the tick after re-entry is frame 0
        assert_eq!(spawn_frames, vec![0, 101, 202]);
    }
}
