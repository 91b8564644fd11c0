use error_chain::bail;
use rand::Rng;
use smallvec::SmallVec;
use std::fmt;

use crate::cells::{Cell, CellType};
use crate::errors::*;
use crate::units::{ColumnsCount, RowsCount};

/// Up to 9 cells: the 3x3 block around a position, clipped at the grid edges.
pub type NeighbourSmallVec<'a, T> = SmallVec<[&'a T; 9]>;

/// Fixed size rectangular container indexed by `(row, column)`.
///
/// Storage is row major. Every access is bounds checked against the dimensions given at
/// construction, which never change.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
}

impl<T: Default> Grid2D<T> {
    pub fn new(rows: RowsCount, columns: ColumnsCount) -> Grid2D<T> {
        Grid2D::from_fn(rows, columns, |_, _| T::default())
    }
}

impl<T> Grid2D<T> {
    /// Build a grid whose slot `(row, column)` holds `f(row, column)`.
    pub fn from_fn<F>(rows: RowsCount, columns: ColumnsCount, mut f: F) -> Grid2D<T>
        where F: FnMut(usize, usize) -> T
    {
        let (RowsCount(rows), ColumnsCount(columns)) = (rows, columns);
        let mut data = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                data.push(f(row, column));
            }
        }

        Grid2D { rows, columns, data }
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        RowsCount(self.rows)
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        ColumnsCount(self.columns)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Is the position within the grid's dimensions
    #[inline]
    pub fn is_valid_position(&self, row: usize, column: usize) -> bool {
        row < self.rows && column < self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Result<&T> {
        let index = self.index(row, column)?;
        Ok(&self.data[index])
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Result<&mut T> {
        let index = self.index(row, column)?;
        Ok(&mut self.data[index])
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        let index = self.index(row, column)?;
        self.data[index] = value;
        Ok(())
    }

    /// Every in-bounds value in the 3x3 block centred on `(row, column)`.
    ///
    /// The centre value itself is included, so an interior position yields 9 values, an
    /// edge 6, a corner 4 and the only cell of a 1x1 grid just itself. Values come out in
    /// row major order of the block.
    pub fn neighbours(&self, row: usize, column: usize) -> Result<NeighbourSmallVec<T>> {
        self.index(row, column)?;

        let mut neighbours = NeighbourSmallVec::new();
        for row_offset in -1isize..=1 {
            for column_offset in -1isize..=1 {
                let neighbour_row = row as isize + row_offset;
                let neighbour_column = column as isize + column_offset;
                if neighbour_row >= 0 && neighbour_column >= 0 &&
                   self.is_valid_position(neighbour_row as usize, neighbour_column as usize) {
                    let index = neighbour_row as usize * self.columns + neighbour_column as usize;
                    neighbours.push(&self.data[index]);
                }
            }
        }

        Ok(neighbours)
    }

    /// A uniformly chosen `(row, column)` position.
    pub fn random_position<R: Rng>(&self, rng: &mut R) -> Result<(usize, usize)> {
        if self.is_empty() {
            bail!(ErrorKind::EmptyGrid);
        }
        Ok((rng.gen_range(0..self.rows), rng.gen_range(0..self.columns)))
    }

    /// The value at a uniformly chosen position.
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Result<&T> {
        let (row, column) = self.random_position(rng)?;
        self.get(row, column)
    }

    /// Visit every position exactly once, in row major order.
    pub fn for_each<F>(&self, mut f: F)
        where F: FnMut(&T, usize, usize)
    {
        for (index, value) in self.data.iter().enumerate() {
            f(value, index / self.columns, index % self.columns);
        }
    }

    /// Replace every slot with `f(current, row, column)`.
    pub fn populate<F>(&mut self, mut f: F)
        where F: FnMut(&T, usize, usize) -> T
    {
        let columns = self.columns;
        for (index, slot) in self.data.iter_mut().enumerate() {
            *slot = f(slot, index / columns, index % columns);
        }
    }

    /// Row major iteration over the values.
    pub fn iter(&self) -> ::std::slice::Iter<T> {
        self.data.iter()
    }

    /// Convert a position to an index in the range 0..grid.size().
    #[inline]
    fn index(&self, row: usize, column: usize) -> Result<usize> {
        if self.is_valid_position(row, column) {
            Ok(row * self.columns + column)
        } else {
            Err(ErrorKind::OutOfBounds(row, column, self.rows, self.columns).into())
        }
    }
}

impl<'a, T> IntoIterator for &'a Grid2D<T> {
    type Item = &'a T;
    type IntoIter = ::std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Grid2D<Cell> {
    /// One text line per row: `#` solid rock, `+` wall, a space for open cave.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.data.chunks(self.columns.max(1)) {
            let line: String = row.iter()
                .map(|cell| match cell.cell_type() {
                    CellType::Open => ' ',
                    CellType::Wall => '+',
                    CellType::Solid | CellType::Reserved => '#',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
