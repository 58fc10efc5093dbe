/// World: everything one level contains.
///
/// ## Ownership
///
/// A `World` is built in one piece by `decode` and owned by the session.
/// Reloading a level builds a fresh `World` and swaps it in; nothing is
/// patched incrementally, so a half-built world is never observed.
///
/// Tiles are immutable after construction. Bodies (enemies, platforms)
/// move every tick. Coins are removed as they are collected.

use crate::domain::collision::TileSet;
use crate::domain::entity::{Coin, Enemy, ExitGate, Hazard, Platform};

#[derive(Clone, Debug, Default)]
pub struct World {
    pub tiles: TileSet,
    pub enemies: Vec<Enemy>,
    pub platforms: Vec<Platform>,
    pub ice_platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub coins: Vec<Coin>,
    pub exits: Vec<ExitGate>,
}

impl World {
    /// One oscillator step for every moving body: enemies, then platforms,
    /// then ice platforms.
    pub fn advance_bodies(&mut self) {
        for enemy in &mut self.enemies {
            enemy.advance();
        }
        for platform in &mut self.platforms {
            platform.advance();
        }
        for platform in &mut self.ice_platforms {
            platform.advance();
        }
    }

    /// Both platform families, in resolution order.
    pub fn all_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().chain(self.ice_platforms.iter())
    }

    /// One-line entity summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "{} tiles, {} enemies, {} platforms, {} ice platforms, {} hazards, {} coins, {} exits",
            self.tiles.len(),
            self.enemies.len(),
            self.platforms.len(),
            self.ice_platforms.len(),
            self.hazards.len(),
            self.coins.len(),
            self.exits.len(),
        )
    }
}
