/// The step function: advances one level by one tick.
///
/// Processing order:
///   1. Oscillating bodies (enemies → platforms → ice platforms)
///   2. Coin pickup against the player's current rect
///   3. Intent + gravity
///   4. Static tile resolution
///   5. Lethal contact (enemy, lava, water) → stop here
///   6. Exit contact
///   7. Platform resolution (regular pass, then ice pass)
///   8. Commit
///
/// Trigger checks in 5 and 6 use the rect from before this tick's move.
/// Phase changes are the session's job: the step only reports events.

use crate::domain::entity::{FrameInput, Player};
use crate::domain::physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::World;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, player: &mut Player, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    world.advance_bodies();
    resolve_coin_pickup(world, player, &mut events);

    let mut motion = physics::integrate(player, input);
    if motion.jumped {
        events.push(GameEvent::Jumped);
    }
    physics::resolve_tiles(player, &mut motion, &world.tiles);

    if let Some(by) = rules::lethal_contact(&player.rect, &world.enemies, &world.hazards) {
        events.push(GameEvent::PlayerKilled { by });
        return events;
    }
    if rules::touches_exit(&player.rect, &world.exits) {
        events.push(GameEvent::ExitReached);
    }

    physics::resolve_platforms(player, &mut motion, world.all_platforms());
    physics::commit(player, motion);

    events
}

fn resolve_coin_pickup(world: &mut World, player: &Player, events: &mut Vec<GameEvent>) {
    let count = rules::collect_coins(&player.rect, &mut world.coins);
    if count > 0 {
        events.push(GameEvent::CoinCollected { count, remaining: world.coins.len() });
    }
}
