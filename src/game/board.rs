//! Board, cell and wall types.

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::game::PlayerId;

/// A coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Get adjacent coordinates (up, down, left, right) on a square board.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, size: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        for side in Side::ALL {
            if let Some(next) = self.step(side, size) {
                result[count as usize] = next;
                count += 1;
            }
        }

        (result, count)
    }

    /// The neighbouring coordinate across `side`, if it is on the board.
    #[must_use]
    #[inline]
    pub fn step(&self, side: Side, size: u16) -> Option<Coord> {
        match side {
            Side::Top if self.y > 0 => Some(Coord::new(self.x, self.y - 1)),
            Side::Right if self.x + 1 < size => Some(Coord::new(self.x + 1, self.y)),
            Side::Bottom if self.y + 1 < size => Some(Coord::new(self.x, self.y + 1)),
            Side::Left if self.x > 0 => Some(Coord::new(self.x - 1, self.y)),
            _ => None,
        }
    }

    /// The side of `self` that faces `other`, if the two are orthogonally adjacent.
    #[must_use]
    pub fn side_towards(&self, other: Coord) -> Option<Side> {
        let dx = i32::from(other.x) - i32::from(self.x);
        let dy = i32::from(other.y) - i32::from(self.y);
        match (dx, dy) {
            (0, -1) => Some(Side::Top),
            (1, 0) => Some(Side::Right),
            (0, 1) => Some(Side::Bottom),
            (-1, 0) => Some(Side::Left),
            _ => None,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four edges of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// Edge towards y - 1.
    Top = 0,
    /// Edge towards x + 1.
    Right = 1,
    /// Edge towards y + 1.
    Bottom = 2,
    /// Edge towards x - 1.
    Left = 3,
}

impl Side {
    /// All sides in clockwise order starting at the top.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The edge on the neighbouring cell that shares this edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Index into a cell's wall array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, as used by the command syntax.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "t" | "up" => Ok(Side::Top),
            "right" | "r" => Ok(Side::Right),
            "bottom" | "b" | "down" => Ok(Side::Bottom),
            "left" | "l" => Ok(Side::Left),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Piece standing on this cell (None = empty).
    pub occupant: Option<PlayerId>,
    /// Wall owners indexed by [`Side::index`] (None = open).
    pub walls: [Option<PlayerId>; 4],
}

impl Cell {
    /// Whether no piece stands on this cell.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Owner of the wall on `side`, if any.
    #[must_use]
    #[inline]
    pub const fn wall(&self, side: Side) -> Option<PlayerId> {
        self.walls[side.index()]
    }

    /// Whether `side` carries a wall.
    ///
    /// Only records placed walls; the board edge is never stored here.
    #[must_use]
    #[inline]
    pub const fn has_wall(&self, side: Side) -> bool {
        self.walls[side.index()].is_some()
    }
}

/// The square game board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Width and height in cells.
    size: u16,
    /// Cells stored in row-major order.
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board with no pieces and no walls.
    ///
    /// Returns `None` if `size` is zero.
    #[must_use]
    pub fn new(size: u16) -> Option<Self> {
        if size == 0 {
            return None;
        }

        let len = usize::from(size) * usize::from(size);
        Some(Self {
            size,
            cells: vec![Cell::default(); len],
        })
    }

    /// Width (and height) of the board.
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.size
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if a coordinate is on the board.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.size && coord.y < self.size
    }

    fn coord_to_index(&self, coord: Coord) -> Result<usize, BoardError> {
        if self.in_bounds(coord) {
            Ok(usize::from(coord.y) * usize::from(self.size) + usize::from(coord.x))
        } else {
            Err(BoardError::OutOfBounds(coord))
        }
    }

    /// Read the cell at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if the coordinate is off the board.
    #[inline]
    pub fn get(&self, coord: Coord) -> Result<&Cell, BoardError> {
        self.coord_to_index(coord).map(|idx| &self.cells[idx])
    }

    /// Occupant of `coord`, treating off-board coordinates as empty.
    #[must_use]
    #[inline]
    pub fn occupant(&self, coord: Coord) -> Option<PlayerId> {
        self.get(coord).ok().and_then(|cell| cell.occupant)
    }

    /// Put `occupant` on the cell (None clears it).
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if the coordinate is off the board.
    pub fn set_occupant(
        &mut self,
        coord: Coord,
        occupant: Option<PlayerId>,
    ) -> Result<(), BoardError> {
        let idx = self.coord_to_index(coord)?;
        self.cells[idx].occupant = occupant;
        Ok(())
    }

    /// Move whatever stands on `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if either coordinate is off the board.
    pub fn move_occupant(&mut self, from: Coord, to: Coord) -> Result<(), BoardError> {
        let src = self.coord_to_index(from)?;
        let dst = self.coord_to_index(to)?;
        let occupant = self.cells[src].occupant.take();
        self.cells[dst].occupant = occupant;
        Ok(())
    }

    /// Write a wall owned by `owner` on `side` of `coord`, mirrored onto the neighbour.
    ///
    /// Always overwrites; checking that the side is open is the caller's job.
    /// The board edge is already a wall, so a boundary side is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if the coordinate is off the board.
    pub fn set_wall(&mut self, coord: Coord, side: Side, owner: PlayerId) -> Result<(), BoardError> {
        self.write_wall(coord, side, Some(owner))
    }

    /// Clear the wall on `side` of `coord` and its mirror.
    ///
    /// Inverse of [`Board::set_wall`] on a previously open edge.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if the coordinate is off the board.
    pub fn remove_wall(&mut self, coord: Coord, side: Side) -> Result<(), BoardError> {
        self.write_wall(coord, side, None)
    }

    fn write_wall(
        &mut self,
        coord: Coord,
        side: Side,
        owner: Option<PlayerId>,
    ) -> Result<(), BoardError> {
        let idx = self.coord_to_index(coord)?;
        let Some(neighbor) = coord.step(side, self.size) else {
            return Ok(());
        };
        let n_idx = self.coord_to_index(neighbor)?;
        self.cells[idx].walls[side.index()] = owner;
        self.cells[n_idx].walls[side.opposite().index()] = owner;
        Ok(())
    }

    /// Whether a wall could still be built on `side` of `coord`.
    ///
    /// False off the board, on the board edge, and on an edge already walled.
    #[must_use]
    #[inline]
    pub fn is_open(&self, coord: Coord, side: Side) -> bool {
        coord.step(side, self.size).is_some()
            && self.get(coord).is_ok_and(|cell| !cell.has_wall(side))
    }

    /// Sides of `coord` where a wall could still be built, in clockwise order.
    pub fn open_sides(&self, coord: Coord) -> impl Iterator<Item = Side> + '_ {
        Side::ALL.into_iter().filter(move |&side| self.is_open(coord, side))
    }

    /// Remove every piece and wall.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Iterate over all coordinates and cells.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let size = usize::from(self.size);
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % size) as u16, (idx / size) as u16);
            (coord, cell)
        })
    }

    /// Coordinates of every piece belonging to `player`, in row-major order.
    pub fn pieces_of(&self, player: PlayerId) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(move |(_, cell)| cell.occupant == Some(player))
            .map(|(coord, _)| coord)
    }

    /// Coordinates of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(coord, _)| coord)
    }

    /// Number of edges walled by `owner`; a shared edge counts once.
    #[must_use]
    pub fn walls_owned_by(&self, owner: PlayerId) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                [Side::Right, Side::Bottom]
                    .into_iter()
                    .filter(|&side| cell.wall(side) == Some(owner))
                    .count()
            })
            .sum()
    }

    /// Total number of walled sides recorded across all cells.
    #[must_use]
    pub fn wall_sides(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.walls.iter().filter(|w| w.is_some()).count())
            .sum()
    }
}
