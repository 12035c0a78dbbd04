use ndarray::Array2;

/// Single coordinate axis used for grid height, width and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Manhattan distance between two cells.
pub const fn manhattan(a: Coord2, b: Coord2) -> u16 {
    (a.0.abs_diff(b.0) as u16) + (a.1.abs_diff(b.1) as u16)
}

/// Reads the `(rows, cols)` shape of a grid back into coordinate space.
pub fn grid_size<T>(grid: &Array2<T>) -> Coord2 {
    let (rows, cols) = grid.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

/// Which cells count as touching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Neighborhood {
    /// All eight surrounding cells, used for mine counts and flood fills.
    Moore,
    /// The four orthogonal cells, used for walking and path finding.
    Orthogonal,
}

impl Neighborhood {
    const fn displacements(self) -> &'static [(i8, i8)] {
        match self {
            Self::Moore => &MOORE,
            Self::Orthogonal => &ORTHOGONAL,
        }
    }
}

const MOORE: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// right, down, left, up
const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
pub fn offset(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let row = coords.0.checked_add_signed(delta.0)?;
    let col = coords.1.checked_add_signed(delta.1)?;
    (row < bounds.0 && col < bounds.1).then_some((row, col))
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, coords: Coord2, kind: Neighborhood) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, coords: Coord2, kind: Neighborhood) -> NeighborIter {
        NeighborIter::new(coords, grid_size(self), kind)
    }
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    displacements: &'static [(i8, i8)],
    index: usize,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2, kind: Neighborhood) -> Self {
        Self {
            center,
            bounds,
            displacements: kind.displacements(),
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = self.displacements.get(self.index) {
            self.index += 1;
            if let Some(next) = offset(self.center, delta, self.bounds) {
                return Some(next);
            }
        }
        None
    }
}

/// Iterates every coordinate of a `(rows, cols)` grid in row-major order.
pub fn iter_coords((rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}
