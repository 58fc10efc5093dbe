/// Trigger rules: what a player rect touching a non-solid body means.
///
/// Pure queries over entity slices. The caller decides what to do with
/// the answer (end the round, advance the level, bump the score).
///
/// ## Trigger Table
/// ┌───────────────────────┬──────────────────┬──────────────────────────┐
/// │ Body                  │ Tested against   │ Outcome                  │
/// ├───────────────────────┼──────────────────┼──────────────────────────┤
/// │ Enemy                 │ pre-move rect    │ death                    │
/// │ Hazard (lava, water)  │ pre-move rect    │ death                    │
/// │ ExitGate              │ pre-move rect    │ level complete           │
/// │ Coin                  │ rect before move │ removed, +1 score each   │
/// └───────────────────────┴──────────────────┴──────────────────────────┘
///
/// Death takes priority over the exit when both fire on the same tick.

use super::entity::{Coin, Enemy, ExitGate, Hazard};
use super::geom::Rect;

/// What killed the player, for the log and the game-over screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Lethal {
    Enemy,
    Hazard,
}

/// First lethal body overlapping `rect`, if any. Enemies are checked first.
pub fn lethal_contact(rect: &Rect, enemies: &[Enemy], hazards: &[Hazard]) -> Option<Lethal> {
    if enemies.iter().any(|e| e.rect.overlaps(rect)) {
        return Some(Lethal::Enemy);
    }
    if hazards.iter().any(|h| h.rect.overlaps(rect)) {
        return Some(Lethal::Hazard);
    }
    None
}

pub fn touches_exit(rect: &Rect, exits: &[ExitGate]) -> bool {
    exits.iter().any(|g| g.rect.overlaps(rect))
}

/// Remove every coin overlapping `rect`. Returns how many were taken.
pub fn collect_coins(rect: &Rect, coins: &mut Vec<Coin>) -> u32 {
    let before = coins.len();
    coins.retain(|c| !c.rect.overlaps(rect));
    (before - coins.len()) as u32
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
