/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use log::{info, warn};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level::{dir_has_levels, DirStore, EmbeddedStore, LevelStore};
use sim::session::{GameSession, Phase, UiSignal};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_MENU_EXIT, KEYS_QUIT, KEYS_RESTART, KEYS_START};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let store: Box<dyn LevelStore> = if dir_has_levels(&config.levels_dir) {
        Box::new(DirStore::new(&config.levels_dir))
    } else {
        Box::new(EmbeddedStore)
    };
    info!("levels from {}, max level {}", store.describe(), config.max_levels);

    let mut session = GameSession::new(store, config.max_levels);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.audio_enabled { SoundEngine::new() } else { None };

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!("Thanks for playing Tile Jump!");
    println!("Level reached: {}   Coins: {}", session.level, session.score);
}

/// Log to the configured file while the terminal is in raw mode; stderr
/// only when no file is configured or it cannot be created.
fn init_logging(config: &GameConfig) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );

    let mut fallback_reason = None;
    if let Some(path) = &config.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => fallback_reason = Some(format!("cannot open {}: {e}", path.display())),
        }
    }

    if builder.try_init().is_err() {
        return;
    }
    if let Some(reason) = fallback_reason {
        warn!("{reason}; logging to stderr");
    }
    for w in &config.warnings {
        warn!("config: {w}");
    }
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }

    let tick_rate = config.tick_rate();
    let mut last_tick = Instant::now();

    while session.phase != Phase::Terminated {
        kb.drain_events();
        gp.update();

        if let Some(signal) = detect_signal(session.phase, &kb, &gp) {
            let events = session.signal(signal);
            process_sound_events(sound, &events);
            if session.phase == Phase::Terminated {
                break;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let input = merge(kb.frame_input(), gp.frame_input());
            let events = session.tick(input);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn merge(a: FrameInput, b: FrameInput) -> FrameInput {
    FrameInput {
        left: a.left || b.left,
        right: a.right || b.right,
        jump: a.jump || b.jump,
    }
}

/// Map this frame's fresh presses to a menu/overlay signal for `phase`.
fn detect_signal(phase: Phase, kb: &InputState, gp: &GamepadState) -> Option<UiSignal> {
    if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
        return Some(UiSignal::Quit);
    }
    match phase {
        Phase::MainMenu => {
            if kb.any_pressed(KEYS_START) || gp.confirm_pressed() {
                Some(UiSignal::Start)
            } else if kb.any_pressed(KEYS_MENU_EXIT) {
                Some(UiSignal::Quit)
            } else {
                None
            }
        }
        Phase::PlayerDead | Phase::Won | Phase::LevelUnavailable => {
            if kb.any_pressed(KEYS_RESTART) || gp.confirm_pressed() {
                Some(UiSignal::Restart)
            } else {
                None
            }
        }
        Phase::Playing | Phase::Terminated => None,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Sfx {
    Jump,
    Coin,
    GameOver,
    LevelClear,
    Win,
}

/// Effects for one batch of events. Clearing the last level plays only the
/// win fanfare.
fn sound_effects(events: &[GameEvent]) -> Vec<Sfx> {
    let won = events.iter().any(|e| matches!(e, GameEvent::Won { .. }));
    events.iter()
        .filter_map(|event| match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::CoinCollected { .. } => Some(Sfx::Coin),
            GameEvent::PlayerKilled { .. } => Some(Sfx::GameOver),
            GameEvent::ExitReached if won => None,
            GameEvent::ExitReached => Some(Sfx::LevelClear),
            GameEvent::Won { .. } => Some(Sfx::Win),
            GameEvent::LevelLoaded { .. } | GameEvent::LevelUnavailable { .. } => None,
        })
        .collect()
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for effect in sound_effects(events) {
        match effect {
            Sfx::Jump => sfx.play_jump(),
            Sfx::Coin => sfx.play_coin(),
            Sfx::GameOver => sfx.play_game_over(),
            Sfx::LevelClear => sfx.play_level_clear(),
            Sfx::Win => sfx.play_win(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::rules::Lethal;

    #[test]
    fn final_exit_plays_only_the_win_effect() {
        let events = [GameEvent::ExitReached, GameEvent::Won { score: 12 }];
        assert_eq!(sound_effects(&events), vec![Sfx::Win]);
    }

    #[test]
    fn intermediate_exit_plays_level_clear() {
        let events = [
            GameEvent::CoinCollected { count: 1, remaining: 0 },
            GameEvent::ExitReached,
            GameEvent::LevelLoaded { level: 2 },
        ];
        assert_eq!(sound_effects(&events), vec![Sfx::Coin, Sfx::LevelClear]);
    }

    #[test]
    fn death_and_jump_map_to_their_effects() {
        let events = [GameEvent::Jumped, GameEvent::PlayerKilled { by: Lethal::Hazard }];
        assert_eq!(sound_effects(&events), vec![Sfx::Jump, Sfx::GameOver]);
    }
}
