//! Tile vocabulary shared by map generation, navigation and rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Direction};

/// Classification of a single map cell.
///
/// Declaration order is significant: every variant up to and including
/// [`TileType::SplitFourWays`] is part of the walkable path network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileType {
    /// Final tile of the primary path, always on the border.
    EndPoint,
    /// First tile of the primary path, always on the border.
    StartPoint,
    /// Straight path joining west and east.
    HorizontalPath,
    /// Straight path joining north and south.
    VerticalPath,
    /// Elbow joining north and west.
    ElbowNorthWest,
    /// Elbow joining north and east.
    ElbowNorthEast,
    /// Elbow joining south and west.
    ElbowSouthWest,
    /// Elbow joining south and east.
    ElbowSouthEast,
    /// Three-way junction open to north, south and west.
    SplitNorthSouthWest,
    /// Three-way junction open to north, south and east.
    SplitNorthSouthEast,
    /// Three-way junction open to north, east and west.
    SplitNorthEastWest,
    /// Three-way junction open to south, east and west.
    SplitSouthEastWest,
    /// Junction open in all four directions.
    SplitFourWays,
    /// Unused ground.
    EmptySpace,
    /// Cursor left behind by the carving walk. Never present in finished maps.
    CurrentPosition,
    /// Single decorative prop.
    Decor,
    /// Decorative prop grown in patches.
    DecorPatch,
    /// Tower plot.
    Tower,
}

impl TileType {
    /// Reports whether the tile belongs to the path network, endpoints included.
    #[must_use]
    pub fn is_path(self) -> bool {
        self <= TileType::SplitFourWays
    }

    /// Reports whether the tile is one of the two path endpoints.
    #[must_use]
    pub const fn is_endpoint(self) -> bool {
        matches!(self, TileType::StartPoint | TileType::EndPoint)
    }

    /// Reports whether the tile is any kind of decoration.
    #[must_use]
    pub const fn is_decoration(self) -> bool {
        matches!(self, TileType::Decor | TileType::DecorPatch)
    }

    /// Reports whether the tile is an elbow or a junction.
    #[must_use]
    pub fn is_turn(self) -> bool {
        self.connections()
            .map_or(false, |connections| !connections.is_straight())
    }

    /// Reports whether the tile is a three- or four-way junction.
    #[must_use]
    pub fn is_split(self) -> bool {
        self.connections()
            .map_or(false, |connections| connections.count() > 2)
    }

    /// Sides through which a shaped path tile connects to its neighbours.
    ///
    /// Endpoints and non-path tiles have no fixed shape and return `None`.
    #[must_use]
    pub const fn connections(self) -> Option<Connections> {
        let connections = match self {
            TileType::HorizontalPath => Connections::new(false, true, false, true),
            TileType::VerticalPath => Connections::new(true, false, true, false),
            TileType::ElbowNorthWest => Connections::new(true, false, false, true),
            TileType::ElbowNorthEast => Connections::new(true, true, false, false),
            TileType::ElbowSouthWest => Connections::new(false, false, true, true),
            TileType::ElbowSouthEast => Connections::new(false, true, true, false),
            TileType::SplitNorthSouthWest => Connections::new(true, false, true, true),
            TileType::SplitNorthSouthEast => Connections::new(true, true, true, false),
            TileType::SplitNorthEastWest => Connections::new(true, true, false, true),
            TileType::SplitSouthEastWest => Connections::new(false, true, true, true),
            TileType::SplitFourWays => Connections::new(true, true, true, true),
            _ => return None,
        };
        Some(connections)
    }

    /// Shaped path tile whose openings match the provided connections.
    ///
    /// Fewer than two connections describe no shape and yield `None`.
    #[must_use]
    pub const fn from_connections(connections: Connections) -> Option<Self> {
        let Connections {
            north,
            east,
            south,
            west,
        } = connections;
        let tile = match (north, east, south, west) {
            (true, true, true, true) => TileType::SplitFourWays,
            (true, false, true, true) => TileType::SplitNorthSouthWest,
            (true, true, true, false) => TileType::SplitNorthSouthEast,
            (true, true, false, true) => TileType::SplitNorthEastWest,
            (false, true, true, true) => TileType::SplitSouthEastWest,
            (true, false, false, true) => TileType::ElbowNorthWest,
            (true, true, false, false) => TileType::ElbowNorthEast,
            (false, false, true, true) => TileType::ElbowSouthWest,
            (false, true, true, false) => TileType::ElbowSouthEast,
            (false, true, false, true) => TileType::HorizontalPath,
            (true, false, true, false) => TileType::VerticalPath,
            _ => return None,
        };
        Some(tile)
    }

    /// Character used when rendering the tile as text.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            TileType::StartPoint => 'A',
            TileType::EndPoint => 'Z',
            TileType::HorizontalPath => '─',
            TileType::VerticalPath => '│',
            TileType::ElbowNorthWest => '┘',
            TileType::ElbowNorthEast => '└',
            TileType::ElbowSouthWest => '┐',
            TileType::ElbowSouthEast => '┌',
            TileType::SplitNorthSouthWest => '┤',
            TileType::SplitNorthSouthEast => '├',
            TileType::SplitNorthEastWest => '┴',
            TileType::SplitSouthEastWest => '┬',
            TileType::SplitFourWays => '┼',
            TileType::EmptySpace => ' ',
            TileType::CurrentPosition => 'C',
            TileType::Decor => 'D',
            TileType::DecorPatch => 'd',
            TileType::Tower => 'T',
        }
    }
}

/// Set of sides through which a path tile is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connections {
    /// Open toward decreasing rows.
    pub north: bool,
    /// Open toward increasing columns.
    pub east: bool,
    /// Open toward increasing rows.
    pub south: bool,
    /// Open toward decreasing columns.
    pub west: bool,
}

impl Connections {
    /// Creates a connection set from its four sides.
    #[must_use]
    pub const fn new(north: bool, east: bool, south: bool, west: bool) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    /// Connection set open on exactly the two provided sides.
    #[must_use]
    pub fn between(first: Direction, second: Direction) -> Self {
        Self::default().with(first).with(second)
    }

    /// Copy of the set with the provided side opened.
    #[must_use]
    pub fn with(mut self, direction: Direction) -> Self {
        match direction {
            Direction::North => self.north = true,
            Direction::East => self.east = true,
            Direction::South => self.south = true,
            Direction::West => self.west = true,
        }
        self
    }

    /// Reports whether the provided side is open.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Number of open sides.
    #[must_use]
    pub fn count(&self) -> usize {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.contains(*direction))
            .count()
    }

    fn is_straight(&self) -> bool {
        *self == Self::new(true, false, true, false) || *self == Self::new(false, true, false, true)
    }
}

/// Which interior quadrants of a map contain shaped path tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadrantCoverage {
    /// Upper-left quadrant.
    pub north_west: bool,
    /// Upper-right quadrant.
    pub north_east: bool,
    /// Lower-left quadrant.
    pub south_west: bool,
    /// Lower-right quadrant.
    pub south_east: bool,
}

impl QuadrantCoverage {
    /// Number of quadrants crossed by the path.
    #[must_use]
    pub fn covered(&self) -> usize {
        [
            self.north_west,
            self.north_east,
            self.south_west,
            self.south_east,
        ]
        .into_iter()
        .filter(|covered| *covered)
        .count()
    }
}

/// Dense row-major grid of tile classifications.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<TileType>,
}

impl TileMap {
    /// Creates a map of the provided dimensions filled with empty space.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileType::EmptySpace)
    }

    /// Creates a map of the provided dimensions filled with a single tile type.
    #[must_use]
    pub fn filled(width: u32, height: u32, tile: TileType) -> Self {
        let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![tile; cell_count],
        }
    }

    /// Number of columns in the map.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the map.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies inside the map.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Tile stored at the provided cell, if it lies inside the map.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<TileType> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Replaces the tile at the provided cell, returning the previous value.
    pub fn set(&mut self, cell: CellCoord, tile: TileType) -> Option<TileType> {
        let index = self.index(cell)?;
        let slot = self.tiles.get_mut(index)?;
        Some(std::mem::replace(slot, tile))
    }

    /// Tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    /// Iterates over every cell together with its tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, TileType)> + '_ {
        let width = self.width.max(1);
        self.tiles.iter().enumerate().filter_map(move |(index, tile)| {
            let index = u32::try_from(index).ok()?;
            Some((CellCoord::new(index % width, index / width), *tile))
        })
    }

    /// Number of cells holding the provided tile type.
    #[must_use]
    pub fn count(&self, tile: TileType) -> usize {
        self.count_where(|candidate| candidate == tile)
    }

    /// Number of cells whose tile satisfies the predicate.
    #[must_use]
    pub fn count_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(TileType) -> bool,
    {
        self.tiles.iter().filter(|tile| predicate(**tile)).count()
    }

    /// First cell, in row-major order, holding the provided tile type.
    #[must_use]
    pub fn find(&self, tile: TileType) -> Option<CellCoord> {
        self.cells()
            .find(|(_, candidate)| *candidate == tile)
            .map(|(cell, _)| cell)
    }

    /// Start tile of the primary path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.find(TileType::StartPoint)
    }

    /// End tile of the primary path.
    #[must_use]
    pub fn end(&self) -> Option<CellCoord> {
        self.find(TileType::EndPoint)
    }

    /// Sides of the cell whose neighbours are path tiles.
    #[must_use]
    pub fn path_neighbors(&self, cell: CellCoord) -> Connections {
        let mut connections = Connections::default();
        for direction in Direction::ALL {
            let is_path = cell
                .step(direction, self.width, self.height)
                .and_then(|neighbor| self.get(neighbor))
                .map_or(false, TileType::is_path);
            if is_path {
                connections = connections.with(direction);
            }
        }
        connections
    }

    /// Reports which interior quadrants contain shaped path tiles.
    ///
    /// Border cells and the path endpoints are ignored.
    #[must_use]
    pub fn quadrant_coverage(&self) -> QuadrantCoverage {
        let mid_column = self.width / 2;
        let mid_row = self.height / 2;
        let mut coverage = QuadrantCoverage::default();

        for (cell, tile) in self.cells() {
            if !tile.is_path() || tile.is_endpoint() || cell.is_on_border(self.width, self.height) {
                continue;
            }

            let west = cell.column() < mid_column;
            let north = cell.row() < mid_row;
            match (north, west) {
                (true, true) => coverage.north_west = true,
                (true, false) => coverage.north_east = true,
                (false, true) => coverage.south_west = true,
                (false, false) => coverage.south_east = true,
            }
        }

        coverage
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl fmt::Display for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.width).map_err(|_| fmt::Error)?;
        if width == 0 {
            return Ok(());
        }

        for row in self.tiles.chunks(width) {
            for tile in row {
                write!(f, "{}", tile.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_range_includes_endpoints_and_junctions() {
        assert!(TileType::EndPoint.is_path());
        assert!(TileType::StartPoint.is_path());
        assert!(TileType::SplitFourWays.is_path());
        assert!(!TileType::EmptySpace.is_path());
        assert!(!TileType::CurrentPosition.is_path());
        assert!(!TileType::Tower.is_path());
    }

    #[test]
    fn shapes_and_connections_agree() {
        let shaped = [
            TileType::HorizontalPath,
            TileType::VerticalPath,
            TileType::ElbowNorthWest,
            TileType::ElbowNorthEast,
            TileType::ElbowSouthWest,
            TileType::ElbowSouthEast,
            TileType::SplitNorthSouthWest,
            TileType::SplitNorthSouthEast,
            TileType::SplitNorthEastWest,
            TileType::SplitSouthEastWest,
            TileType::SplitFourWays,
        ];

        for tile in shaped {
            let connections = tile.connections().expect("shaped tiles expose connections");
            assert_eq!(
                TileType::from_connections(connections),
                Some(tile),
                "{tile:?} should round trip through its connections"
            );
        }
    }

    #[test]
    fn single_connection_has_no_shape() {
        let dead_end = Connections::default().with(Direction::North);
        assert_eq!(TileType::from_connections(dead_end), None);
        assert_eq!(TileType::from_connections(Connections::default()), None);
    }

    #[test]
    fn turns_exclude_straights() {
        assert!(!TileType::HorizontalPath.is_turn());
        assert!(!TileType::VerticalPath.is_turn());
        assert!(TileType::ElbowSouthEast.is_turn());
        assert!(TileType::SplitNorthEastWest.is_turn());
        assert!(!TileType::StartPoint.is_turn());
    }

    #[test]
    fn display_renders_one_line_per_row() {
        let mut map = TileMap::new(3, 2);
        let _ = map.set(CellCoord::new(0, 0), TileType::StartPoint);
        let _ = map.set(CellCoord::new(1, 0), TileType::HorizontalPath);
        let _ = map.set(CellCoord::new(2, 0), TileType::EndPoint);
        let _ = map.set(CellCoord::new(1, 1), TileType::Tower);

        assert_eq!(map.to_string(), "A─Z\n T \n");
    }

    #[test]
    fn set_outside_map_is_rejected() {
        let mut map = TileMap::new(2, 2);
        assert_eq!(map.set(CellCoord::new(2, 0), TileType::Tower), None);
        assert_eq!(
            map.set(CellCoord::new(1, 1), TileType::Tower),
            Some(TileType::EmptySpace)
        );
        assert_eq!(map.count(TileType::Tower), 1);
    }

    #[test]
    fn path_neighbors_reports_open_sides() {
        let mut map = TileMap::new(3, 3);
        let _ = map.set(CellCoord::new(1, 0), TileType::VerticalPath);
        let _ = map.set(CellCoord::new(0, 1), TileType::EndPoint);
        let _ = map.set(CellCoord::new(2, 1), TileType::Tower);

        let neighbors = map.path_neighbors(CellCoord::new(1, 1));
        assert_eq!(neighbors, Connections::new(true, false, false, true));
    }

    #[test]
    fn quadrant_coverage_ignores_border_and_endpoints() {
        let mut map = TileMap::new(6, 6);
        let _ = map.set(CellCoord::new(0, 0), TileType::StartPoint);
        let _ = map.set(CellCoord::new(1, 1), TileType::VerticalPath);
        let _ = map.set(CellCoord::new(4, 4), TileType::EndPoint);
        let _ = map.set(CellCoord::new(5, 2), TileType::HorizontalPath);

        let coverage = map.quadrant_coverage();
        assert!(coverage.north_west);
        assert!(!coverage.north_east, "border tiles must be ignored");
        assert!(!coverage.south_east, "endpoints must be ignored");
        assert_eq!(coverage.covered(), 1);
    }

    #[test]
    fn tile_map_round_trips_through_bincode() {
        let mut map = TileMap::new(4, 3);
        let _ = map.set(CellCoord::new(0, 1), TileType::StartPoint);
        let _ = map.set(CellCoord::new(3, 1), TileType::EndPoint);

        let bytes = bincode::serialize(&map).expect("serialize map");
        let decoded: TileMap = bincode::deserialize(&bytes).expect("deserialize map");
        assert_eq!(decoded, map);
        assert_eq!(decoded.start(), Some(CellCoord::new(0, 1)));
    }
}
