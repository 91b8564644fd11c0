//! Cave generation.
//!
//! One `generate` call runs four stages over a freshly seeded grid:
//!
//! 1. seed every cell open with probability `density` percent, solid otherwise
//! 2. relax: `iterations` times pick one random cell and make it open only if more than 4
//!    cells of its 3x3 block (itself included) are open
//! 3. mark as walls the solid cells with at least 2 open cells in their block
//! 4. find open cells flanked by exactly two walls along full sides and emit a corner
//!    smoothing triangle path for each
//!
//! Stage 2 touches a single cell per iteration, not the whole board, so each step sees the
//! effects of all earlier steps.

use error_chain::bail;
use log::{debug, info};
use rand::Rng;
use smallvec::SmallVec;

use crate::cells::{Cell, CellType, CornerSmallVec};
use crate::coordinates::Coord;
use crate::errors::*;
use crate::grid::Grid2D;
use crate::paths::Path;
use crate::units::{CellPixels, ColumnsCount, RowsCount};

/// A relaxed cell turns open when its block holds more open cells than this.
pub const RELAX_OPEN_THRESHOLD: usize = 4;

/// Open cells a solid cell's block needs before it becomes a wall.
pub const WALL_MIN_OPEN_NEIGHBOURS: usize = 2;

/// Full-side wall neighbours an open cell needs to be a semi-wall.
pub const SEMI_WALL_EDGE_WALLS: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub columns: usize,
    pub rows: usize,
    /// Pixels per cell side.
    pub cell_size: u32,
    /// Percentage chance, 0 to 100, that a seeded cell starts open.
    pub density: u8,
    pub iterations: usize,
}

impl Default for GenerationParams {
    fn default() -> GenerationParams {
        GenerationParams {
            columns: 50,
            rows: 50,
            cell_size: 70,
            density: 55,
            iterations: 25_000,
        }
    }
}

impl GenerationParams {
    /// Zero rows or columns are allowed here; relaxing such a grid fails with `EmptyGrid`.
    pub fn validate(&self) -> Result<()> {
        if self.density > 100 {
            bail!(ErrorKind::InvalidParameters(format!("density {} is above 100 percent",
                                                       self.density)));
        }
        if self.cell_size == 0 {
            bail!(ErrorKind::InvalidParameters(String::from("cell size must be at least 1 pixel")));
        }
        Ok(())
    }
}

/// The output of one generation pass.
#[derive(Debug, Clone)]
pub struct Cave {
    pub grid: Grid2D<Cell>,
    /// Non-empty corner triangle paths, in row major order of their cells.
    pub paths: Vec<String>,
    pub cell_size: CellPixels,
}

/// An open cell with two walls abutting it along full sides.
#[derive(Debug, Clone, PartialEq)]
pub struct SemiWall {
    pub cell: Cell,
    /// The two corner points shared with each of the two walls.
    pub shared_edges: [CornerSmallVec; 2],
}

impl SemiWall {
    /// The corner both shared edges meet at. `None` when the walls are on opposite sides.
    pub fn right_angle_vertex(&self) -> Option<Coord> {
        let (first, second) = (&self.shared_edges[0], &self.shared_edges[1]);
        first.iter().find(|point| second.contains(point)).cloned()
    }

    /// `[other vertex, right angle vertex, other vertex]`, or `None` for degenerate geometry.
    pub fn triangle(&self) -> Option<[Coord; 3]> {
        let right_angle = self.right_angle_vertex()?;
        let others: SmallVec<[Coord; 4]> = self.shared_edges[0]
            .iter()
            .chain(self.shared_edges[1].iter())
            .filter(|&&point| point != right_angle)
            .cloned()
            .collect();

        match others.as_slice() {
            [first, second] => Some([*first, right_angle, *second]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaveGenerator {
    params: GenerationParams,
}

impl CaveGenerator {
    pub fn new(params: GenerationParams) -> Result<CaveGenerator> {
        params.validate()?;
        Ok(CaveGenerator { params })
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Run the whole pipeline. The same `rng` state always produces the same cave.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<Cave> {
        let mut grid = self.seed(rng);
        self.relax(&mut grid, rng)?;
        let walls_count = mark_walls(&mut grid)?;
        let semi_walls = semi_walls(&grid)?;
        let paths = triangle_paths(&semi_walls)?;

        info!("generated {} x {} cave: {} open, {} walls, {} corner triangles",
              self.params.rows,
              self.params.columns,
              grid.iter().filter(|cell| cell.is(CellType::Open)).count(),
              walls_count,
              paths.len());

        Ok(Cave {
            grid,
            paths,
            cell_size: CellPixels(self.params.cell_size),
        })
    }

    /// Stage 1: a new grid of open and solid cells.
    pub fn seed<R: Rng>(&self, rng: &mut R) -> Grid2D<Cell> {
        let size = CellPixels(self.params.cell_size);
        let density = u32::from(self.params.density);

        let grid = Grid2D::from_fn(RowsCount(self.params.rows),
                                   ColumnsCount(self.params.columns),
                                   |row, column| {
            let cell_type = if rng.gen_range(0..100) < density {
                CellType::Open
            } else {
                CellType::Solid
            };
            Cell::new(row, column, size, cell_type)
        });

        debug!("seeded {} cells at {}% density", grid.size(), density);
        grid
    }

    /// Stage 2: reclassify `iterations` randomly chosen cells, one at a time.
    pub fn relax<R: Rng>(&self, grid: &mut Grid2D<Cell>, rng: &mut R) -> Result<()> {
        for _ in 0..self.params.iterations {
            let (row, column) = grid.random_position(rng)?;
            let open_count = count_neighbours(grid, row, column, CellType::Open)?;
            let cell_type = if open_count > RELAX_OPEN_THRESHOLD {
                CellType::Open
            } else {
                CellType::Solid
            };
            grid.get_mut(row, column)?.set_cell_type(cell_type);
        }

        debug!("relaxed {} cells", self.params.iterations);
        Ok(())
    }
}

/// How many cells of `cell_type` are in the 3x3 block at `(row, column)`, centre included.
pub fn count_neighbours(grid: &Grid2D<Cell>,
                        row: usize,
                        column: usize,
                        cell_type: CellType)
                        -> Result<usize> {
    Ok(grid.neighbours(row, column)?.iter().filter(|cell| cell.is(cell_type)).count())
}

/// Stage 3: turn solid cells bordering open space into walls. Returns the walls marked.
///
/// A single pass over a snapshot of the grid; marking a wall never changes any cell's
/// open count so the result is the same as marking in place.
pub fn mark_walls(grid: &mut Grid2D<Cell>) -> Result<usize> {
    let mut becomes_wall = Vec::with_capacity(grid.size());
    for cell in grid.iter() {
        let is_wall = cell.is(CellType::Solid) &&
                      count_neighbours(grid, cell.row(), cell.column(), CellType::Open)? >=
                      WALL_MIN_OPEN_NEIGHBOURS;
        becomes_wall.push(is_wall);
    }

    let ColumnsCount(columns) = grid.columns();
    grid.populate(|&cell, row, column| {
        let mut cell = cell;
        if becomes_wall[row * columns + column] {
            cell.set_cell_type(CellType::Wall);
        }
        cell
    });

    let walls_count = becomes_wall.iter().filter(|&&wall| wall).count();
    debug!("marked {} walls", walls_count);
    Ok(walls_count)
}

/// Stage 4 detection: every open cell with exactly two walls abutting it along full sides.
pub fn semi_walls(grid: &Grid2D<Cell>) -> Result<Vec<SemiWall>> {
    let mut semi_walls = vec![];

    for cell in grid.iter().filter(|cell| cell.is(CellType::Open)) {
        let neighbours = grid.neighbours(cell.row(), cell.column())?;
        let walls: SmallVec<[&Cell; 9]> = neighbours.iter()
            .cloned()
            .filter(|neighbour| neighbour.is(CellType::Wall))
            .collect();
        if walls.len() < SEMI_WALL_EDGE_WALLS {
            continue;
        }

        let shared_edges: SmallVec<[CornerSmallVec; 4]> = walls.iter()
            .map(|wall| cell.shared_corners(wall))
            .filter(|shared| shared.len() == 2)
            .collect();

        if shared_edges.len() == SEMI_WALL_EDGE_WALLS {
            semi_walls.push(SemiWall {
                cell: *cell,
                shared_edges: [shared_edges[0].clone(), shared_edges[1].clone()],
            });
        }
    }

    debug!("found {} semi-walls", semi_walls.len());
    Ok(semi_walls)
}

/// Stage 4 assembly: the closed triangle outline for one semi-wall.
pub fn triangle_path(semi_wall: &SemiWall) -> Result<Path> {
    match semi_wall.triangle() {
        Some(triangle) => Ok(Path::polygon(&triangle)),
        None => {
            bail!(ErrorKind::DegenerateGeometry(semi_wall.cell.row(), semi_wall.cell.column()))
        }
    }
}

/// Path text for every semi-wall, skipping the degenerate ones.
pub fn triangle_paths(semi_walls: &[SemiWall]) -> Result<Vec<String>> {
    let mut paths = Vec::with_capacity(semi_walls.len());
    for semi_wall in semi_walls {
        match triangle_path(semi_wall) {
            Ok(path) => paths.push(path.to_string()),
            Err(Error(ErrorKind::DegenerateGeometry(..), _)) => {
                debug!("no corner triangle for semi-wall at ({}, {})",
                       semi_wall.cell.row(),
                       semi_wall.cell.column());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(paths)
}

/// Control points for a curved corner from `start` to `end`, one random point in each of the
/// two control triangles either side of the corner.
///
/// Generation only emits straight-edged triangles; this keeps the curve maths available for
/// a smoothed corner variant.
pub fn curve_control_points<R: Rng>(start: Coord,
                                    end: Coord,
                                    cell_size: CellPixels,
                                    rng: &mut R)
                                    -> [Coord; 2] {
    let offset = f64::from(cell_size.0) / 6.0;
    let (x_smaller, x_bigger) = (start.x.min(end.x) as f64, start.x.max(end.x) as f64);
    let (y_smaller, y_bigger) = (start.y.min(end.y) as f64, start.y.max(end.y) as f64);

    let one = (x_smaller + offset, y_smaller + offset);
    let two = (x_bigger - offset, y_bigger - offset);
    let three = (x_smaller + offset, y_bigger - offset);
    let four = (x_smaller - offset, y_bigger + offset);

    [random_point_in_triangle(one, three, four, rng),
     random_point_in_triangle(two, three, four, rng)]
}

fn random_point_in_triangle<R: Rng>(a: (f64, f64),
                                    b: (f64, f64),
                                    c: (f64, f64),
                                    rng: &mut R)
                                    -> Coord {
    let (u, v) = (rng.gen::<f64>(), rng.gen::<f64>());
    let (s, t) = if u <= v { (u, v) } else { (v, u) };

    Coord::new((s * a.0 + (t - s) * b.0 + (1.0 - t) * c.0).floor() as i64,
               (s * a.1 + (t - s) * b.1 + (1.0 - t) * c.1).floor() as i64)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::utils;

    const CELL: u32 = 10;

    fn params(rows: usize, columns: usize, density: u8, iterations: usize) -> GenerationParams {
        GenerationParams {
            columns,
            rows,
            cell_size: CELL,
            density,
            iterations,
        }
    }

    fn generator(rows: usize, columns: usize, density: u8, iterations: usize) -> CaveGenerator {
        CaveGenerator::new(params(rows, columns, density, iterations)).unwrap()
    }

    // `#` solid, `+` wall, `.` open
    fn grid_from_text(lines: &[&str]) -> Grid2D<Cell> {
        let columns = lines.first().map_or(0, |line| line.len());
        Grid2D::from_fn(RowsCount(lines.len()), ColumnsCount(columns), |row, column| {
            let cell_type = match lines[row].as_bytes()[column] {
                b'#' => CellType::Solid,
                b'+' => CellType::Wall,
                b'.' => CellType::Open,
                other => panic!("unknown cell glyph {}", other as char),
            };
            Cell::new(row, column, CellPixels(CELL), cell_type)
        })
    }

    fn positions(semi_walls: &[SemiWall]) -> Vec<(usize, usize)> {
        semi_walls.iter().map(|s| (s.cell.row(), s.cell.column())).collect()
    }

    fn kind_of<T>(result: Result<T>) -> Option<ErrorKind> {
        result.err().map(|e| e.0)
    }

    #[test]
    fn default_params_match_form_defaults() {
        let p = GenerationParams::default();
        assert_eq!((p.columns, p.rows, p.cell_size, p.density, p.iterations),
                   (50, 50, 70, 55, 25_000));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn invalid_params_rejected() {
        match kind_of(CaveGenerator::new(params(3, 3, 101, 0))) {
            Some(ErrorKind::InvalidParameters(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        let mut zero_size = params(3, 3, 50, 0);
        zero_size.cell_size = 0;
        match kind_of(CaveGenerator::new(zero_size)) {
            Some(ErrorKind::InvalidParameters(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn full_density_seeds_all_open() {
        let mut rng = utils::seeded_rng(3);
        let grid = generator(8, 9, 100, 0).seed(&mut rng);
        assert_eq!(grid.size(), 72);
        assert!(grid.iter().all(|cell| cell.is(CellType::Open)));
    }

    #[test]
    fn zero_density_seeds_all_solid() {
        let mut rng = utils::seeded_rng(3);
        let grid = generator(8, 9, 0, 0).seed(&mut rng);
        assert!(grid.iter().all(|cell| cell.is(CellType::Solid)));
    }

    #[test]
    fn seeded_cells_know_their_position() {
        let mut rng = utils::seeded_rng(3);
        let grid = generator(4, 6, 50, 0).seed(&mut rng);
        grid.for_each(|cell, row, column| {
            assert_eq!((cell.row(), cell.column()), (row, column));
            assert_eq!(cell.size(), CellPixels(CELL));
        });
    }

    #[test]
    fn zero_iterations_leave_seed_unchanged() {
        let g = generator(12, 12, 55, 0);
        let mut rng = utils::seeded_rng(5);
        let seeded = g.seed(&mut rng);
        let mut relaxed = seeded.clone();
        g.relax(&mut relaxed, &mut rng).unwrap();
        assert_eq!(relaxed, seeded);
    }

    #[test]
    fn relaxing_lone_cell_closes_it() {
        // A 1x1 block only ever holds one open cell, never more than the threshold.
        let g = generator(1, 1, 100, 5);
        let mut grid = grid_from_text(&["."]);
        g.relax(&mut grid, &mut utils::seeded_rng(11)).unwrap();
        assert!(grid.get(0, 0).unwrap().is(CellType::Solid));
    }

    #[test]
    fn relaxing_changes_at_most_the_picked_cell() {
        let g = generator(3, 3, 100, 1);
        let mut grid = grid_from_text(&["...", ".#.", "..."]);
        // The centre sees 8 open cells and opens, edges see 5 and stay open, corners see 3
        // and close.
        g.relax(&mut grid, &mut utils::seeded_rng(2)).unwrap();
        let changed = grid.iter()
            .filter(|cell| {
                let was_open = !(cell.row() == 1 && cell.column() == 1);
                cell.is(CellType::Open) != was_open
            })
            .count();
        assert!(changed <= 1);
    }

    #[test]
    fn relax_on_empty_grid_fails() {
        let g = generator(0, 5, 50, 3);
        match kind_of(g.generate(&mut utils::seeded_rng(1))) {
            Some(ErrorKind::EmptyGrid) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_grid_without_iterations_generates_nothing() {
        let cave = generator(0, 0, 50, 0).generate(&mut utils::seeded_rng(1)).unwrap();
        assert!(cave.grid.is_empty());
        assert!(cave.paths.is_empty());
    }

    #[test]
    fn mark_walls_on_solid_cells_next_to_open_space() {
        let mut grid = grid_from_text(&["###", "##.", "##."]);
        let walls = mark_walls(&mut grid).unwrap();
        assert_eq!(walls, 2);
        assert_eq!(grid, grid_from_text(&["###", "#+.", "#+."]));
    }

    #[test]
    fn single_open_neighbour_is_not_enough_for_a_wall() {
        let mut grid = grid_from_text(&["###", "###", "##."]);
        assert_eq!(mark_walls(&mut grid).unwrap(), 0);
        assert_eq!(grid, grid_from_text(&["###", "###", "##."]));
    }

    #[test]
    fn mark_walls_is_deterministic() {
        let g = generator(20, 20, 55, 300);
        let mut rng = utils::seeded_rng(17);
        let mut grid = g.seed(&mut rng);
        g.relax(&mut grid, &mut rng).unwrap();

        let mut first = grid.clone();
        let mut second = grid.clone();
        mark_walls(&mut first).unwrap();
        mark_walls(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn all_open_grid_has_no_walls_or_triangles() {
        let cave = generator(3, 3, 100, 0).generate(&mut utils::seeded_rng(8)).unwrap();
        assert!(cave.grid.iter().all(|cell| cell.is(CellType::Open)));
        assert!(cave.paths.is_empty());
    }

    #[test]
    fn single_cell_cave() {
        let cave = generator(1, 1, 70, 10).generate(&mut utils::seeded_rng(4)).unwrap();
        assert_eq!(cave.grid.size(), 1);
        assert!(cave.paths.is_empty());
    }

    #[test]
    fn semi_walls_at_concave_corners() {
        let grid = grid_from_text(&[".+.", "+..", "..."]);
        let found = semi_walls(&grid).unwrap();
        assert_eq!(positions(&found), vec![(0, 0), (1, 1)]);

        let paths = triangle_paths(&found).unwrap();
        assert_eq!(paths, vec!["M 10,0 L 10,10 L 0,10 z", "M 20,10 L 10,10 L 10,20 z"]);
    }

    #[test]
    fn three_edge_walls_do_not_qualify() {
        let grid = grid_from_text(&[".+.", "+.+", "..."]);
        assert_eq!(positions(&semi_walls(&grid).unwrap()), vec![(0, 0), (0, 2)]);
    }

    #[test]
    fn diagonal_walls_do_not_qualify() {
        let grid = grid_from_text(&["+..", "...", "..+"]);
        assert!(semi_walls(&grid).unwrap().is_empty());
    }

    #[test]
    fn walls_must_flank_an_open_cell() {
        let grid = grid_from_text(&["#+", "+#"]);
        assert!(semi_walls(&grid).unwrap().is_empty());
    }

    #[test]
    fn opposite_walls_are_degenerate() {
        let grid = grid_from_text(&[".+.", "...", ".+."]);
        let found = semi_walls(&grid).unwrap();
        assert_eq!(positions(&found), vec![(1, 1)]);
        assert_eq!(found[0].right_angle_vertex(), None);
        assert_eq!(found[0].triangle(), None);

        match kind_of(triangle_path(&found[0])) {
            Some(ErrorKind::DegenerateGeometry(1, 1)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(triangle_paths(&found).unwrap().is_empty());
    }

    #[test]
    fn triangle_vertex_order() {
        let grid = grid_from_text(&["...", "..+", ".+."]);
        let found = semi_walls(&grid).unwrap();
        assert_eq!(positions(&found), vec![(1, 1), (2, 2)]);
        // (1, 1): right wall shares its right side, bottom wall its bottom side
        assert_eq!(found[0].triangle(),
                   Some([Coord::new(20, 10), Coord::new(20, 20), Coord::new(10, 20)]));
    }

    #[test]
    fn generated_cave_invariants() {
        let g = generator(30, 40, 55, 2_000);
        let cave = g.generate(&mut utils::seeded_rng(2024)).unwrap();
        let grid = &cave.grid;
        assert_eq!(grid.rows(), RowsCount(30));
        assert_eq!(grid.columns(), ColumnsCount(40));

        for cell in grid {
            let open = count_neighbours(grid, cell.row(), cell.column(), CellType::Open).unwrap();
            match cell.cell_type() {
                CellType::Wall => assert!(open >= WALL_MIN_OPEN_NEIGHBOURS),
                CellType::Solid => assert!(open < WALL_MIN_OPEN_NEIGHBOURS),
                CellType::Open => {}
                CellType::Reserved => panic!("reserved cell type produced"),
            }
        }

        let found = semi_walls(grid).unwrap();
        let expected: Vec<(usize, usize)> = grid.iter()
            .filter(|cell| cell.is(CellType::Open))
            .filter(|cell| {
                grid.neighbours(cell.row(), cell.column())
                    .unwrap()
                    .iter()
                    .filter(|n| n.is(CellType::Wall) && cell.shares_edge_with(n))
                    .count() == 2
            })
            .map(|cell| (cell.row(), cell.column()))
            .collect();
        assert_eq!(positions(&found), expected);

        let degenerate = found.iter().filter(|s| s.triangle().is_none()).count();
        assert_eq!(cave.paths.len(), found.len() - degenerate);
        assert!(cave.paths.iter().all(|path| !path.is_empty()));
    }

    #[test]
    fn same_seed_same_cave() {
        let g = generator(25, 25, 55, 1_000);
        let a = g.generate(&mut utils::seeded_rng(77)).unwrap();
        let b = g.generate(&mut utils::seeded_rng(77)).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.paths, b.paths);
    }

    #[test]
    fn control_points_inside_control_triangles() {
        let mut rng = utils::seeded_rng(9);
        let (start, end) = (Coord::new(60, 0), Coord::new(0, 60));
        for _ in 0..200 {
            let [first, second] = curve_control_points(start, end, CellPixels(60), &mut rng);
            // triangle one/three/four spans x -10..10, y 10..70
            assert!(first.x >= -10 && first.x <= 10, "{:?}", first);
            assert!(first.y >= 10 && first.y <= 70, "{:?}", first);
            // triangle two/three/four spans x -10..50, y 50..70
            assert!(second.x >= -10 && second.x <= 50, "{:?}", second);
            assert!(second.y >= 50 && second.y <= 70, "{:?}", second);
        }
    }
}
