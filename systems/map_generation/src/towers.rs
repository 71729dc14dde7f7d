//! Tower backfill.

use lemming_defence_core::{Direction, TileType};
use rand::Rng;

use crate::layout::Layout;

/// Sides tried, in order, around a randomly picked path tile.
const BACKFILL_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Tops up the tower count by placing towers beside random path tiles.
///
/// Each pick lands on a uniformly random cell; picks that miss the path, or
/// hit a path tile with no empty side, are spent without placing anything.
/// Returns whether `target` towers exist once the loop ends.
pub(crate) fn backfill_towers<R>(
    layout: &mut Layout,
    target: usize,
    rng: &mut R,
    max_picks: usize,
) -> bool
where
    R: Rng + ?Sized,
{
    let mut towers = layout.count(TileType::Tower);

    for _ in 0..max_picks {
        if towers >= target {
            break;
        }

        let cell = layout.random_cell(rng);
        if !layout.get(cell).map_or(false, TileType::is_path) {
            continue;
        }

        let side = BACKFILL_ORDER.into_iter().find_map(|direction| {
            layout
                .step(cell, direction)
                .filter(|neighbor| layout.is(*neighbor, TileType::EmptySpace))
        });
        if let Some(side) = side {
            layout.set(side, TileType::Tower);
            towers += 1;
        }
    }

    towers >= target
}

#[cfg(test)]
mod tests {
    use lemming_defence_core::CellCoord;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn towers_only_land_beside_the_path() {
        let mut layout = Layout::new(10, 10);
        layout.set(CellCoord::new(0, 5), TileType::StartPoint);
        for column in 1..9 {
            layout.set(CellCoord::new(column, 5), TileType::HorizontalPath);
        }
        layout.set(CellCoord::new(9, 5), TileType::EndPoint);

        let mut rng = ChaCha8Rng::seed_from_u64(21);
        assert!(backfill_towers(&mut layout, 6, &mut rng, 10_000));
        assert_eq!(layout.count(TileType::Tower), 6);

        for (cell, tile) in layout.tiles().cells() {
            if tile == TileType::Tower {
                assert!(
                    cell.row() == 4 || cell.row() == 6,
                    "tower at {cell:?} is not next to the path"
                );
            }
        }
    }

    #[test]
    fn west_side_is_preferred() {
        let mut layout = Layout::new(8, 8);
        layout.set(CellCoord::new(3, 3), TileType::VerticalPath);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(backfill_towers(&mut layout, 1, &mut rng, 100_000));
        assert_eq!(layout.get(CellCoord::new(2, 3)), Some(TileType::Tower));
    }

    #[test]
    fn exhausted_picks_report_shortfall() {
        let mut layout = Layout::new(8, 8);
        layout.set(CellCoord::new(3, 3), TileType::VerticalPath);
        for direction in Direction::ALL {
            if let Some(cell) = layout.step(CellCoord::new(3, 3), direction) {
                layout.set(cell, TileType::Decor);
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert!(!backfill_towers(&mut layout, 1, &mut rng, 500));
        assert_eq!(layout.count(TileType::Tower), 0);
    }
}
