//! Grid geometry: coordinates, 3x3 zones and 4-adjacency.
//!
//! The city is `width x height` zones; each zone covers a [`ZONE_SIDE`] square of
//! coordinates, so the coordinate grid is `3*height` rows by `3*width` columns.
//! Zones are numbered row-major.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of a zone, in coordinates.
pub const ZONE_SIDE: u32 = 3;

/// Number of coordinates in one zone.
pub const COORDINATES_PER_ZONE: usize = (ZONE_SIDE * ZONE_SIDE) as usize;

/// A single cell of the city grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: u32,
    pub col: u32,
}

impl Coordinate {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// True when `other` is directly above, below, left or right of `self`.
    pub fn is_adjacent(&self, other: &Coordinate) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr + dc == 1
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

/// Zone layout of a city, independent of populations and edge weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityGrid {
    width: u32,
    height: u32,
}

impl CityGrid {
    /// `width` and `height` are measured in zones.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Like [`CityGrid::new`], but `None` when the coordinate rows, columns or
    /// node count would overflow.
    pub fn checked(width: u32, height: u32) -> Option<Self> {
        width.checked_mul(ZONE_SIDE)?;
        height.checked_mul(ZONE_SIDE)?;
        let zones = usize::try_from(width.checked_mul(height)?).ok()?;
        zones.checked_mul(COORDINATES_PER_ZONE)?;
        Some(Self::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rows(&self) -> u32 {
        self.height * ZONE_SIDE
    }

    pub fn cols(&self) -> u32 {
        self.width * ZONE_SIDE
    }

    pub fn zone_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn coordinate_count(&self) -> usize {
        self.zone_count() * COORDINATES_PER_ZONE
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.row < self.rows() && coord.col < self.cols()
    }

    /// Row-major dense index of a coordinate, or `None` when off the grid.
    pub fn index_of(&self, coord: Coordinate) -> Option<usize> {
        self.contains(coord)
            .then(|| (coord.row * self.cols() + coord.col) as usize)
    }

    pub fn coordinate_at(&self, index: usize) -> Coordinate {
        let cols = self.cols() as usize;
        Coordinate::new((index / cols) as u32, (index % cols) as u32)
    }

    pub fn zone_of(&self, coord: Coordinate) -> Option<usize> {
        self.contains(coord).then(|| {
            let zone_row = coord.row / ZONE_SIDE;
            let zone_col = coord.col / ZONE_SIDE;
            (zone_row * self.width + zone_col) as usize
        })
    }

    /// The nine coordinates of `zone`, row by row. Empty for an unknown zone.
    pub fn zone_coordinates(&self, zone: usize) -> Vec<Coordinate> {
        if zone >= self.zone_count() {
            return Vec::new();
        }
        let top = (zone as u32 / self.width) * ZONE_SIDE;
        let left = (zone as u32 % self.width) * ZONE_SIDE;
        (0..ZONE_SIDE)
            .flat_map(|dr| (0..ZONE_SIDE).map(move |dc| Coordinate::new(top + dr, left + dc)))
            .collect()
    }

    /// In-grid 4-neighbours of `coord`.
    pub fn neighbors(&self, coord: Coordinate) -> impl Iterator<Item = Coordinate> + '_ {
        let Coordinate { row, col } = coord;
        [
            row.checked_sub(1).map(|r| Coordinate::new(r, col)),
            Some(Coordinate::new(row + 1, col)),
            col.checked_sub(1).map(|c| Coordinate::new(row, c)),
            Some(Coordinate::new(row, col + 1)),
        ]
        .into_iter()
        .flatten()
        .filter(move |c| self.contains(*c))
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.coordinate_count()).map(|i| self.coordinate_at(i))
    }
}
