use smallvec::SmallVec;

use crate::coordinates::Coord;
use crate::units::CellPixels;
use crate::utils;

/// Classification of one grid position.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellType {
    /// Solid rock.
    Solid,
    /// Open cave space.
    Open,
    /// Solid rock bordering open space.
    Wall,
    /// Part of the type domain but never produced by generation.
    Reserved,
}

impl CellType {
    /// Fill colour the renderer paints this type with.
    pub fn fill(self) -> &'static str {
        match self {
            CellType::Open => "#fff",
            CellType::Solid | CellType::Wall | CellType::Reserved => "#000",
        }
    }
}

pub type CornerSmallVec = SmallVec<[Coord; 4]>;

/// One grid position with its classification.
///
/// Only the type changes after construction. All pixel geometry is derived from
/// `(row, column, size)` on demand.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    row: usize,
    column: usize,
    size: u32,
    cell_type: CellType,
}

impl Cell {
    pub fn new(row: usize, column: usize, size: CellPixels, cell_type: CellType) -> Cell {
        Cell {
            row,
            column,
            size: size.0,
            cell_type,
        }
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub fn size(&self) -> CellPixels {
        CellPixels(self.size)
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    #[inline]
    pub fn set_cell_type(&mut self, cell_type: CellType) {
        self.cell_type = cell_type;
    }

    #[inline]
    pub fn is(&self, cell_type: CellType) -> bool {
        self.cell_type == cell_type
    }

    pub fn fill(&self) -> &'static str {
        self.cell_type.fill()
    }

    pub fn width(&self) -> u32 {
        self.size
    }

    pub fn height(&self) -> u32 {
        self.size
    }

    pub fn top(&self) -> i64 {
        self.row as i64 * self.size as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top() + self.size as i64
    }

    pub fn left(&self) -> i64 {
        self.column as i64 * self.size as i64
    }

    pub fn right(&self) -> i64 {
        self.left() + self.size as i64
    }

    pub fn top_left(&self) -> Coord {
        Coord::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Coord {
        Coord::new(self.right(), self.top())
    }

    pub fn bottom_right(&self) -> Coord {
        Coord::new(self.right(), self.bottom())
    }

    pub fn bottom_left(&self) -> Coord {
        Coord::new(self.left(), self.bottom())
    }

    /// Corners clockwise from the top left.
    pub fn corners(&self) -> [Coord; 4] {
        [self.top_left(), self.top_right(), self.bottom_right(), self.bottom_left()]
    }

    /// Centre point, rounded down to whole pixels for odd cell sizes.
    pub fn center(&self) -> Coord {
        let (top_left, bottom_right) = (self.top_left(), self.bottom_right());
        Coord::new((top_left.x + bottom_right.x).div_euclid(2),
                   (top_left.y + bottom_right.y).div_euclid(2))
    }

    /// The corners in canonical `"x,y"` form, in `corners` order.
    pub fn corner_keys(&self) -> [String; 4] {
        let [a, b, c, d] = self.corners();
        [a.to_string(), b.to_string(), c.to_string(), d.to_string()]
    }

    /// This cell's corners that are also corners of `other`, in `corners` order.
    ///
    /// Cells abutting along a full side share 2 points, diagonal neighbours 1, distant
    /// cells none. A cell shares all 4 with itself.
    pub fn shared_corners(&self, other: &Cell) -> CornerSmallVec {
        let mut other_keys = utils::fnv_hashset(4);
        other_keys.extend(other.corner_keys().iter().cloned());

        self.corners()
            .iter()
            .zip(self.corner_keys().iter())
            .filter(|&(_, key)| other_keys.contains(key))
            .map(|(&corner, _)| corner)
            .collect()
    }

    /// Does `other` abut this cell along a full side.
    pub fn shares_edge_with(&self, other: &Cell) -> bool {
        self.shared_corners(other).len() == 2
    }
}
