/// Events emitted during a simulation tick.
/// The presentation layer consumes these for sound and the log.

use crate::domain::rules::Lethal;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    CoinCollected { count: u32, remaining: usize },
    PlayerKilled { by: Lethal },
    ExitReached,
    LevelLoaded { level: u32 },
    Won { score: u32 },
    LevelUnavailable { level: u32 },
}
