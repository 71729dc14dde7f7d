//! Working grid for a single generation attempt.

use lemming_defence_core::{CellCoord, Direction, TileMap, TileType};
use rand::Rng;

/// Tile classifications plus the per-cell flags the generator needs while
/// carving. Discarded wholesale when an attempt is rejected.
#[derive(Clone, Debug)]
pub(crate) struct Layout {
    tiles: TileMap,
    split: Vec<bool>,
}

impl Layout {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let tiles = TileMap::new(width, height);
        let split = vec![false; tiles.tiles().len()];
        Self { tiles, split }
    }

    pub(crate) fn width(&self) -> u32 {
        self.tiles.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.tiles.height()
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.split.len()
    }

    pub(crate) fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    pub(crate) fn into_tiles(self) -> TileMap {
        self.tiles
    }

    /// Tile at the cell. Cells outside the grid read as `None`.
    pub(crate) fn get(&self, cell: CellCoord) -> Option<TileType> {
        self.tiles.get(cell)
    }

    pub(crate) fn is(&self, cell: CellCoord, tile: TileType) -> bool {
        self.get(cell) == Some(tile)
    }

    pub(crate) fn set(&mut self, cell: CellCoord, tile: TileType) {
        let _ = self.tiles.set(cell, tile);
    }

    pub(crate) fn step(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction, self.width(), self.height())
    }

    pub(crate) fn is_on_border(&self, cell: CellCoord) -> bool {
        cell.is_on_border(self.width(), self.height())
    }

    pub(crate) fn is_split(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.split[index])
    }

    pub(crate) fn mark_split(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.split[index] = true;
        }
    }

    pub(crate) fn count(&self, tile: TileType) -> usize {
        self.tiles.count(tile)
    }

    /// Uniformly random cell anywhere on the grid.
    pub(crate) fn random_cell<R>(&self, rng: &mut R) -> CellCoord
    where
        R: Rng + ?Sized,
    {
        CellCoord::new(
            rng.gen_range(0..self.width()),
            rng.gen_range(0..self.height()),
        )
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.tiles.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.width()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    pub(crate) fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.width()).ok()?;
        if width == 0 || index >= self.cell_count() {
            return None;
        }

        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}
