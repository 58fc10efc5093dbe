/// Level decoder: integer grid → `World`.
///
/// Pure function of the grid. Each cell code is looked up in the closed
/// code table once; codes with no entry (0 included) spawn nothing.
///
/// Anchors relative to the cell's top-left corner `(x, y)`:
///   solid tile    (x, y)        50×50
///   enemy         (x, y + 15)   50×35   rests on the cell floor
///   platform      (x, y)        50×25
///   hazard        (x, y + 25)   50×25   lower half of the cell
///   coin          centred       25×25
///   exit gate     (x, y − 25)   50×75   rises half a tile above the cell

use crate::domain::entity::{Coin, Enemy, ExitGate, Hazard, MotionMask, Platform};
use crate::domain::tile::{PlatformKind, Spawn, Tile, TILE_SIZE};
use super::level::Grid;
use super::world::World;

pub fn decode(grid: &Grid) -> World {
    let mut world = World::default();

    for (col, row, code) in grid.cells() {
        let Some(spawn) = Spawn::from_code(code) else { continue };
        let (col, row) = (col as i32, row as i32);
        let (x, y) = (col * TILE_SIZE, row * TILE_SIZE);

        match spawn {
            Spawn::Solid(material) => world.tiles.push(Tile::at_cell(col, row, material)),
            Spawn::Enemy(color) => world.enemies.push(Enemy::new(x, y + 15, color)),
            Spawn::Platform(kind, axis) => {
                let platform = Platform::new(x, y, MotionMask::from(axis), kind);
                match kind {
                    PlatformKind::Ice => world.ice_platforms.push(platform),
                    PlatformKind::Dirt | PlatformKind::Cake => world.platforms.push(platform),
                }
            }
            Spawn::Hazard(kind) => world.hazards.push(Hazard::new(x, y + TILE_SIZE / 2, kind)),
            Spawn::Coin => world.coins.push(Coin::centered_at(x + TILE_SIZE / 2, y + TILE_SIZE / 2)),
            Spawn::Exit => world.exits.push(ExitGate::new(x, y - TILE_SIZE / 2)),
        }
    }

    world
}
