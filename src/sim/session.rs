/// GameSession: phase, level counter, score and the live world.
///
/// ## Phase transitions
///
/// ┌───────────────────┬───────────────────┬──────────────────────────────────┐
/// │ From              │ Trigger           │ To                               │
/// ├───────────────────┼───────────────────┼──────────────────────────────────┤
/// │ MainMenu          │ Start             │ Playing (level 1)                │
/// │ Playing           │ PlayerKilled      │ PlayerDead                       │
/// │ Playing           │ ExitReached       │ Playing (level + 1) or Won       │
/// │ PlayerDead        │ Restart           │ Playing (same level, score 0)    │
/// │ Won               │ Restart           │ Playing (level 1, score 0)       │
/// │ LevelUnavailable  │ Restart           │ Playing (level 1, score 0)       │
/// │ any               │ Quit              │ Terminated                       │
/// │ any load          │ LevelError        │ LevelUnavailable                 │
/// └───────────────────┴───────────────────┴──────────────────────────────────┘
///
/// Loading is all-or-nothing: the new world is decoded completely before
/// it replaces the old one. A failed load drops the old world so stale
/// geometry is never simulated.

use log::{error, info, warn};

use crate::domain::entity::{FrameInput, Player};
use crate::domain::physics;
use super::decode::decode;
use super::event::GameEvent;
use super::level::{LevelError, LevelStore};
use super::step;
use super::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    MainMenu,
    Playing,
    PlayerDead,
    Won,
    /// The requested level could not be loaded; see `last_error`.
    LevelUnavailable,
    Terminated,
}

/// Discrete requests from the menu / overlay controls.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UiSignal {
    Start,
    Restart,
    Quit,
}

pub struct GameSession {
    pub phase: Phase,
    /// 1-based, always within 1..=max_levels.
    pub level: u32,
    pub max_levels: u32,
    pub score: u32,
    pub world: World,
    pub player: Player,
    pub last_error: Option<LevelError>,
    store: Box<dyn LevelStore>,
}

impl GameSession {
    pub fn new(store: Box<dyn LevelStore>, max_levels: u32) -> Self {
        GameSession {
            phase: Phase::MainMenu,
            level: 1,
            max_levels: max_levels.max(1),
            score: 0,
            world: World::default(),
            player: Player::spawn(),
            last_error: None,
            store,
        }
    }

    // ══════════════════════════════════════════════════════════
    // External signals
    // ══════════════════════════════════════════════════════════

    pub fn signal(&mut self, signal: UiSignal) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match (signal, self.phase) {
            (UiSignal::Quit, _) => self.set_phase(Phase::Terminated),
            (UiSignal::Start, Phase::MainMenu) => {
                self.score = 0;
                self.load_level(1, &mut events);
            }
            (UiSignal::Restart, Phase::PlayerDead) => {
                self.score = 0;
                self.load_level(self.level, &mut events);
            }
            (UiSignal::Restart, Phase::Won | Phase::LevelUnavailable) => {
                self.score = 0;
                self.load_level(1, &mut events);
            }
            _ => {}
        }
        events
    }

    // ══════════════════════════════════════════════════════════
    // Tick
    // ══════════════════════════════════════════════════════════

    /// Advance one fixed tick. Never fails: every outcome is a phase change.
    pub fn tick(&mut self, input: FrameInput) -> Vec<GameEvent> {
        match self.phase {
            Phase::Playing => self.tick_playing(input),
            Phase::PlayerDead => {
                physics::drift_ghost(&mut self.player);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn tick_playing(&mut self, input: FrameInput) -> Vec<GameEvent> {
        let mut events = step::step(&mut self.world, &mut self.player, input);
        let mut follow_up = Vec::new();

        for event in &events {
            match event {
                GameEvent::CoinCollected { count, .. } => self.score += count,
                GameEvent::PlayerKilled { by } => {
                    info!("level {}: killed by {:?}", self.level, by);
                    self.set_phase(Phase::PlayerDead);
                }
                GameEvent::ExitReached => self.advance_level(&mut follow_up),
                _ => {}
            }
        }

        events.append(&mut follow_up);
        events
    }

    fn advance_level(&mut self, events: &mut Vec<GameEvent>) {
        if self.level >= self.max_levels {
            info!("all {} levels cleared, score {}", self.max_levels, self.score);
            self.set_phase(Phase::Won);
            events.push(GameEvent::Won { score: self.score });
        } else {
            self.load_level(self.level + 1, events);
        }
    }

    // ══════════════════════════════════════════════════════════
    // Loading
    // ══════════════════════════════════════════════════════════

    fn load_level(&mut self, level: u32, events: &mut Vec<GameEvent>) {
        self.level = level.clamp(1, self.max_levels);

        let grid = match self.store.load(self.level) {
            Ok(grid) => grid,
            Err(e) => {
                error!("cannot load level {}: {e}", self.level);
                self.world = World::default();
                self.last_error = Some(e);
                self.set_phase(Phase::LevelUnavailable);
                events.push(GameEvent::LevelUnavailable { level: self.level });
                return;
            }
        };

        if grid.is_empty() {
            warn!("level {} is empty", self.level);
        } else if grid.padded_cells() > 0 {
            warn!(
                "level {} is not rectangular, padded {} cells",
                self.level,
                grid.padded_cells()
            );
        }

        let world = decode(&grid);
        info!(
            "level {} loaded ({}x{}): {}",
            self.level,
            grid.width(),
            grid.height(),
            world.summary()
        );

        self.world = world;
        self.player = Player::spawn();
        self.last_error = None;
        self.set_phase(Phase::Playing);
        events.push(GameEvent::LevelLoaded { level: self.level });
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            info!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::MemoryStore;

    const IDLE: FrameInput = FrameInput { left: false, right: false, jump: false };

    fn floor_room() -> Vec<Vec<i32>> {
        let mut rows = vec![vec![0; 20]; 20];
        rows[19] = vec![1; 20];
        rows
    }

    fn with_cell(code: i32, col: usize, row: usize) -> Vec<Vec<i32>> {
        let mut rows = floor_room();
        rows[row][col] = code;
        rows
    }

    /// Exit over the spawn point: completes on the first tick.
    fn exit_room() -> Vec<Vec<i32>> {
        with_cell(8, 2, 18)
    }

    fn lava_room() -> Vec<Vec<i32>> {
        with_cell(6, 2, 18)
    }

    fn started(store: MemoryStore, max_levels: u32) -> GameSession {
        let mut s = GameSession::new(Box::new(store), max_levels);
        let events = s.signal(UiSignal::Start);
        assert_eq!(events, vec![GameEvent::LevelLoaded { level: 1 }]);
        s
    }

    #[test]
    fn starts_in_menu_and_ignores_ticks() {
        let mut s = GameSession::new(Box::new(MemoryStore::new()), 10);
        assert_eq!(s.phase, Phase::MainMenu);
        assert!(s.tick(IDLE).is_empty());
        assert_eq!(s.player.rect.y, 870);
        // restart means nothing from the menu
        assert!(s.signal(UiSignal::Restart).is_empty());
        assert_eq!(s.phase, Phase::MainMenu);
    }

    #[test]
    fn hazard_contact_kills_on_next_tick() {
        let mut s = started(MemoryStore::new().with(1, lava_room()), 10);
        assert_eq!(s.phase, Phase::Playing);
        s.tick(IDLE);
        assert_eq!(s.phase, Phase::PlayerDead);
    }

    #[test]
    fn restart_after_death_reloads_same_level_with_zero_score() {
        let mut coin_and_lava = lava_room();
        coin_and_lava[17][2] = 7;
        let store = MemoryStore::new()
            .with(1, exit_room())
            .with(2, coin_and_lava);
        let mut s = started(store, 10);

        s.tick(IDLE);
        assert_eq!(s.level, 2);
        assert_eq!(s.phase, Phase::Playing);

        // coin is collected before the lava check
        s.tick(IDLE);
        assert_eq!(s.phase, Phase::PlayerDead);
        assert_eq!(s.score, 1);

        let events = s.signal(UiSignal::Restart);
        assert_eq!(events, vec![GameEvent::LevelLoaded { level: 2 }]);
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.level, 2);
        assert_eq!(s.score, 0);
        assert_eq!(s.world.coins.len(), 1, "world is rebuilt from the grid");
        assert_eq!(s.player.rect.y, 870);
    }

    #[test]
    fn exits_advance_levels_then_win() {
        let mut store = MemoryStore::new();
        for level in 1..=3 {
            store = store.with(level, exit_room());
        }
        let mut s = started(store, 3);

        let events = s.tick(IDLE);
        assert_eq!(events, vec![GameEvent::ExitReached, GameEvent::LevelLoaded { level: 2 }]);
        s.tick(IDLE);
        assert_eq!(s.level, 3);

        let events = s.tick(IDLE);
        assert_eq!(s.phase, Phase::Won);
        assert_eq!(s.level, 3);
        assert!(events.contains(&GameEvent::Won { score: 0 }));

        // nothing simulates after winning
        assert!(s.tick(IDLE).is_empty());

        s.signal(UiSignal::Restart);
        assert_eq!((s.phase, s.level, s.score), (Phase::Playing, 1, 0));
    }

    #[test]
    fn missing_level_is_surfaced_not_reused() {
        let store = MemoryStore::new().with(1, exit_room());
        let mut s = started(store, 10);

        let events = s.tick(IDLE);
        assert!(events.contains(&GameEvent::LevelUnavailable { level: 2 }));
        assert_eq!(s.phase, Phase::LevelUnavailable);
        assert_eq!(s.level, 2);
        assert!(matches!(s.last_error, Some(LevelError::MissingLevelData { level: 2 })));
        assert!(s.world.exits.is_empty(), "old level must not linger");

        // ticking in the error phase does nothing
        assert!(s.tick(IDLE).is_empty());

        s.signal(UiSignal::Restart);
        assert_eq!((s.phase, s.level), (Phase::Playing, 1));
        assert!(s.last_error.is_none());
    }

    #[test]
    fn missing_first_level_blocks_start() {
        let mut s = GameSession::new(Box::new(MemoryStore::new()), 10);
        s.signal(UiSignal::Start);
        assert_eq!(s.phase, Phase::LevelUnavailable);
        assert_eq!(s.level, 1);
    }

    #[test]
    fn coins_score_one_each() {
        let mut rows = floor_room();
        rows[17][2] = 7;
        rows[18][2] = 7;
        rows[18][12] = 7;
        let mut s = started(MemoryStore::new().with(1, rows), 10);

        let events = s.tick(IDLE);
        assert!(events.contains(&GameEvent::CoinCollected { count: 2, remaining: 1 }));
        assert_eq!(s.score, 2);
        for _ in 0..20 { s.tick(IDLE); }
        assert_eq!(s.score, 2);
    }

    #[test]
    fn ghost_drifts_up_while_dead() {
        let mut s = started(MemoryStore::new().with(1, lava_room()), 10);
        s.tick(IDLE);
        assert_eq!(s.phase, Phase::PlayerDead);
        let y = s.player.rect.y;
        s.tick(IDLE);
        assert_eq!(s.player.rect.y, y - 5);
        for _ in 0..500 { s.tick(IDLE); }
        assert!(s.player.rect.y <= 200 && s.player.rect.y > 195);
    }

    #[test]
    fn quit_terminates_from_any_phase() {
        let mut s = GameSession::new(Box::new(MemoryStore::new()), 10);
        s.signal(UiSignal::Quit);
        assert_eq!(s.phase, Phase::Terminated);

        let mut s = started(MemoryStore::new().with(1, lava_room()), 10);
        s.tick(IDLE);
        s.signal(UiSignal::Quit);
        assert_eq!(s.phase, Phase::Terminated);
        assert!(s.tick(IDLE).is_empty());
    }

    #[test]
    fn malformed_grid_still_loads() {
        let store = MemoryStore::new().with(1, vec![vec![1, 1, 1], vec![8]]);
        let mut s = started(store, 10);
        assert_eq!(s.world.tiles.len(), 3);
        assert_eq!(s.world.exits.len(), 1);

        let empty = MemoryStore::new().with(1, vec![]);
        let mut s2 = started(empty, 10);
        assert_eq!(s2.phase, Phase::Playing);
        assert!(s2.world.tiles.is_empty());
        s.tick(IDLE);
        s2.tick(IDLE);
    }
}
