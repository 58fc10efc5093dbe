/// Static collision world: the solid tiles of one level.
///
/// Tiles are only ever added while a level is being decoded. After that
/// the set is read-only until the whole world is replaced.

use super::geom::Rect;
use super::tile::Tile;

#[derive(Clone, Debug, Default)]
pub struct TileSet {
    tiles: Vec<Tile>,
}

impl TileSet {
    pub fn new() -> Self {
        TileSet { tiles: Vec::new() }
    }

    pub(crate) fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    /// Does `rect` overlap any tile?
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.tiles.iter().any(|t| t.rect.overlaps(rect))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
