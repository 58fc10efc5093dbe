/// Keyboard state tracker.
///
/// Terminals report key presses (and auto-repeats) but usually not
/// releases, so a key counts as held until `HOLD_TIMEOUT` passes without a
/// new press or repeat. When the terminal supports the keyboard
/// enhancement protocol, explicit Release events are honoured instead.
///
/// Held keys drive walking and the jump control; fresh presses drive the
/// menu and overlay actions.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

/// Longer than the typical initial key-repeat delay so a held key does
/// not flicker off between the first press and the first repeat.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Bindings ──

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_JUMP: &[KeyCode] = &[
    KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'),
];
pub const KEYS_START: &[KeyCode] = &[KeyCode::Enter];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('r'), KeyCode::Char('R')];
/// Leaves the game from any screen.
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];
/// Extra exit keys on the main menu only.
pub const KEYS_MENU_EXIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Last Press/Repeat time per key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events from the last drain, for modifier checks.
    raw_events: Vec<KeyEvent>,

    /// Trust Release events. Only set when the terminal confirmed the
    /// keyboard enhancement protocol.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while event::poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                if !self.is_held_at(key.code, now) {
                    self.fresh_presses.push(key.code);
                }
                self.last_active.insert(key.code, now);
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|&c| self.is_held_at(c, now))
    }

    /// Was any of these keys pressed during the last drain? (edge trigger)
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    /// Keyboard half of the per-tick control intent. A fresh press counts
    /// as held so a quick tap still registers for one tick.
    pub fn frame_input(&self) -> FrameInput {
        let active = |codes: &[KeyCode]| self.any_held(codes) || self.any_pressed(codes);
        FrameInput {
            left: active(KEYS_LEFT),
            right: active(KEYS_RIGHT),
            jump: active(KEYS_JUMP),
        }
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        if self.honor_release {
            return self.last_active.contains_key(&code);
        }
        self.last_active.get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn press_is_fresh_once_then_held() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.record(press(KeyCode::Char(' ')), t0);
        assert!(input.any_pressed(KEYS_JUMP));
        assert!(input.frame_input().jump);

        // auto-repeat is not a fresh press
        input.fresh_presses.clear();
        input.record(press(KeyCode::Char(' ')), t0 + Duration::from_millis(30));
        assert!(!input.any_pressed(KEYS_JUMP));
    }

    #[test]
    fn keys_expire_without_repeats() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.record(press(KeyCode::Left), t0);
        input.expire(t0 + HOLD_TIMEOUT + Duration::from_millis(1));
        assert!(!input.any_held(KEYS_LEFT));
        // the press itself still counts for the tick it arrived in
        assert!(input.frame_input().left);
    }

    #[test]
    fn release_only_counts_when_honoured() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.record(press(KeyCode::Right), t0);
        input.record(release(KeyCode::Right), t0);
        assert!(input.any_held(KEYS_RIGHT));

        input.honor_release = true;
        input.record(release(KeyCode::Right), t0);
        assert!(!input.any_held(KEYS_RIGHT));
    }

    #[test]
    fn ctrl_c_is_detected() {
        let mut input = InputState::new();
        input.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(input.ctrl_c_pressed());
        assert!(!InputState::new().ctrl_c_pressed());
    }
}
