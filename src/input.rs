use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::entities::GameState;

/// Logical keys the simulation reads each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

/// Held/not-held state of every logical key, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl InputSnapshot {
    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Up => self.up,
            Key::Down => self.down,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Fire => self.fire,
        }
    }

    pub fn set(&mut self, key: Key, held: bool) {
        let slot = match key {
            Key::Up => &mut self.up,
            Key::Down => &mut self.down,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::Fire => &mut self.fire,
        };
        *slot = held;
    }

    /// Snapshot with only the given keys held.
    pub fn holding(keys: &[Key]) -> Self {
        let mut snapshot = Self::default();
        for key in keys {
            snapshot.set(*key, true);
        }
        snapshot
    }
}

/// One-shot actions that steer the application rather than the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Pause,
    Resume,
    Restart,
    Quit,
}

/// Manages input polling and translates raw key events into game input
pub struct InputManager {
    held: InputSnapshot,
    oneshot_actions: Vec<InputAction>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            held: InputSnapshot::default(),
            oneshot_actions: Vec::new(),
        }
    }

    /// Polls for all input events and stores one-shot actions
    /// Should be called once per frame before reading the snapshot
    pub fn poll_events(&mut self, game_state: &GameState) -> color_eyre::Result<()> {
        self.oneshot_actions.clear();

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, game_state);
            }
        }

        Ok(())
    }

    /// Processes a key event and updates held keys and one-shot actions
    pub fn handle_key_event(&mut self, key_event: KeyEvent, game_state: &GameState) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, game_state),
            KeyEventKind::Release => {
                if let Some(key) = map_key(key_event.code) {
                    self.held.set(key, false);
                }
            }
            _ => {}
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, game_state: &GameState) {
        // Quit works in any state
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        let pause_key = matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P'));
        match game_state {
            GameState::Playing if pause_key => {
                self.oneshot_actions.push(InputAction::Pause);
                return;
            }
            GameState::Paused if pause_key => {
                self.oneshot_actions.push(InputAction::Resume);
                return;
            }
            GameState::GameOver
                if matches!(key_event.code, KeyCode::Char('r') | KeyCode::Char('R')) =>
            {
                self.oneshot_actions.push(InputAction::Restart);
                return;
            }
            _ => {}
        }

        if *game_state == GameState::Playing
            && let Some(key) = map_key(key_event.code)
        {
            self.held.set(key, true);
            // Opposite directions cancel, last press wins
            match key {
                Key::Up => self.held.down = false,
                Key::Down => self.held.up = false,
                Key::Left => self.held.right = false,
                Key::Right => self.held.left = false,
                Key::Fire => {}
            }
        }
    }

    /// Keys held right now
    pub fn snapshot(&self) -> InputSnapshot {
        self.held
    }

    /// Drops every held key, e.g. when leaving the Playing state
    pub fn release_all(&mut self) {
        self.held = InputSnapshot::default();
    }

    /// One-shot actions gathered by the last poll
    pub fn actions(&self) -> &[InputAction] {
        &self.oneshot_actions
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Key::Up),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Key::Down),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Key::Left),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Key::Right),
        KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Char(' ') => Some(Key::Fire),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_press_and_release_fire() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Char('z')), &GameState::Playing);
        assert!(input.snapshot().is_held(Key::Fire));

        input.handle_key_event(release(KeyCode::Char('z')), &GameState::Playing);
        assert!(!input.snapshot().is_held(Key::Fire));
    }

    #[test]
    fn test_opposite_direction_cancels() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Left), &GameState::Playing);
        input.handle_key_event(press(KeyCode::Right), &GameState::Playing);
        let snapshot = input.snapshot();
        assert!(snapshot.right);
        assert!(!snapshot.left);
    }

    #[test]
    fn test_movement_ignored_while_paused() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Up), &GameState::Paused);
        assert_eq!(input.snapshot(), InputSnapshot::default());
    }

    #[test]
    fn test_state_specific_actions() {
        let mut input = InputManager::new();
        input.handle_key_event(press(KeyCode::Char('p')), &GameState::Playing);
        input.handle_key_event(press(KeyCode::Char('p')), &GameState::Paused);
        input.handle_key_event(press(KeyCode::Char('r')), &GameState::GameOver);
        input.handle_key_event(press(KeyCode::Char('r')), &GameState::Playing);
        input.handle_key_event(press(KeyCode::Esc), &GameState::Paused);
        assert_eq!(
            input.actions(),
            &[
                InputAction::Pause,
                InputAction::Resume,
                InputAction::Restart,
                InputAction::Quit
            ]
        );
    }

    #[test]
    fn test_snapshot_holding() {
        let snapshot = InputSnapshot::holding(&[Key::Left, Key::Fire]);
        assert!(snapshot.is_held(Key::Left));
        assert!(snapshot.is_held(Key::Fire));
        assert!(!snapshot.is_held(Key::Up));
    }
}
