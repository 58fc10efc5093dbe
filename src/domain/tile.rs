/// Level grid codes and what each one spawns.
///
/// The mapping is one closed table (`CODE_TABLE`). Every code maps to
/// exactly one `Spawn`; codes not in the table (including 0) spawn nothing.
/// Materials and colors only matter to the renderer: all solid tiles
/// collide the same way, all platforms move the same way.

use super::geom::Rect;

/// Edge length of one grid cell in world units.
pub const TILE_SIZE: i32 = 50;
pub const SCREEN_WIDTH: i32 = 1000;
pub const SCREEN_HEIGHT: i32 = 1000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Material {
    Dirt,
    Grass,
    Tundra,
    TundraBlank,
    Cake,
    CakeBlank,
    ChocoCake,
    ChocoCakeBlank,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyColor {
    Green,
    Blue,
    Purple,
    Red,
}

/// Cosmetic platform family. `Ice` platforms are resolved in their own
/// pass but with the same math as the others.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlatformKind {
    Dirt,
    Cake,
    Ice,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HazardKind {
    Lava,
    Water,
}

/// Construction rule for one grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Spawn {
    Solid(Material),
    Enemy(EnemyColor),
    Platform(PlatformKind, Axis),
    Hazard(HazardKind),
    Coin,
    Exit,
}

const CODE_TABLE: [(i32, Spawn); 22] = [
    (1, Spawn::Solid(Material::Dirt)),
    (2, Spawn::Solid(Material::Grass)),
    (3, Spawn::Enemy(EnemyColor::Green)),
    (4, Spawn::Platform(PlatformKind::Dirt, Axis::Horizontal)),
    (5, Spawn::Platform(PlatformKind::Dirt, Axis::Vertical)),
    (6, Spawn::Hazard(HazardKind::Lava)),
    (7, Spawn::Coin),
    (8, Spawn::Exit),
    (9, Spawn::Solid(Material::Tundra)),
    (10, Spawn::Solid(Material::TundraBlank)),
    (11, Spawn::Platform(PlatformKind::Ice, Axis::Horizontal)),
    (12, Spawn::Platform(PlatformKind::Ice, Axis::Vertical)),
    (13, Spawn::Hazard(HazardKind::Water)),
    (14, Spawn::Solid(Material::Cake)),
    (15, Spawn::Solid(Material::CakeBlank)),
    (16, Spawn::Solid(Material::ChocoCake)),
    (17, Spawn::Solid(Material::ChocoCakeBlank)),
    (18, Spawn::Enemy(EnemyColor::Blue)),
    (19, Spawn::Enemy(EnemyColor::Purple)),
    (20, Spawn::Enemy(EnemyColor::Red)),
    (21, Spawn::Platform(PlatformKind::Cake, Axis::Horizontal)),
    (22, Spawn::Platform(PlatformKind::Cake, Axis::Vertical)),
];

impl Spawn {
    /// Look up the construction rule for a grid code. Unknown codes are `None`.
    pub fn from_code(code: i32) -> Option<Spawn> {
        CODE_TABLE.iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, spawn)| spawn)
    }
}

/// An immovable solid cell. Created at level load, never mutated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
    pub rect: Rect,
    pub material: Material,
}

impl Tile {
    /// Tile occupying grid cell (`col`, `row`).
    pub fn at_cell(col: i32, row: i32, material: Material) -> Self {
        Tile {
            rect: Rect::new(col * TILE_SIZE, row * TILE_SIZE, TILE_SIZE, TILE_SIZE),
            material,
        }
    }
}
