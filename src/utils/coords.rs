use std::iter::FusedIterator;
use serde::{Deserialize, Serialize};

use super::Size;

// ----------------------------------------------
// Cell
// ----------------------------------------------

// X,Y position in the city grid of cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    // Clamps at the i32 limits, so cells at the edge of the
    // coordinate space are their own neighbor past that edge.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy) }
    }

    // 4 cardinal neighbors, always in North, South, East, West order.
    // North is -Y (top-left origin).
    #[inline]
    pub const fn neighbors(self) -> [Cell; 4] {
        [
            self.offset(0, -1), // north
            self.offset(0,  1), // south
            self.offset(1,  0), // east
            self.offset(-1, 0), // west
        ]
    }

    // Square neighborhood of every cell at most `hops` steps away on each axis,
    // including this cell itself. `hops <= 0` yields just this cell.
    #[inline]
    pub fn cells_within(self, hops: i32) -> CellRange {
        let hops = hops.max(0);
        CellRange::new(self.offset(-hops, -hops), self.offset(hops, hops))
    }

    #[inline]
    pub const fn manhattan_distance(self, other: Cell) -> i32 {
        let distance = self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y));
        if distance > i32::MAX as u32 { i32::MAX } else { distance as i32 }
    }

    // Straight-line distance, used for proximity queries.
    #[inline]
    pub fn distance(self, other: Cell) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ----------------------------------------------
// CellRange
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    // Inclusive range, e.g.: [start..=end]
    pub start: Cell,
    pub end: Cell,
}

impl CellRange {
    #[inline]
    pub const fn new(start: Cell, end: Cell) -> Self {
        Self { start, end }
    }

    // Rectangle of `size` cells anchored at `origin` (top-left).
    // A non-positive width or height gives an empty range.
    #[inline]
    pub const fn from_footprint(origin: Cell, size: Size) -> Self {
        Self::new(origin, origin.offset(size.width - 1, size.height - 1))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.x > self.end.x || self.start.y > self.end.y
    }

    #[inline]
    pub fn iter(&self) -> CellRangeIter {
        CellRangeIter::new(*self)
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        if cell.x < self.start.x || cell.y < self.start.y {
            return false;
        }
        if cell.x > self.end.x || cell.y > self.end.y {
            return false;
        }
        true
    }

    #[inline]
    pub fn intersects(&self, other: &CellRange) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.start.x <= other.end.x && other.start.x <= self.end.x &&
        self.start.y <= other.end.y && other.start.y <= self.end.y
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}; {},{}]",
               self.start.x,
               self.start.y,
               self.end.x,
               self.end.y)
    }
}

// ----------------------------------------------
// CellRangeIter
// ----------------------------------------------

// Row-major walk over a CellRange: x varies fastest.
#[derive(Copy, Clone)]
pub struct CellRangeIter {
    range:  CellRange,
    curr_y: i32,
    curr_x: i32,
    done:   bool,
}

impl CellRangeIter {
    #[inline]
    pub fn new(range: CellRange) -> Self {
        Self {
            range,
            curr_y: range.start.y,
            curr_x: range.start.x,
            done: range.is_empty(),
        }
    }
}

impl Iterator for CellRangeIter {
    type Item = Cell;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = Cell::new(self.curr_x, self.curr_y);

        // Determine next x,y:
        if self.curr_x < self.range.end.x {
            self.curr_x += 1;
        } else if self.curr_y < self.range.end.y {
            self.curr_y += 1;
            self.curr_x = self.range.start.x;
        } else {
            self.done = true;
        }

        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len();
        (remaining, Some(remaining))
    }
}

// Returns exactly how many elements are left.
impl ExactSizeIterator for CellRangeIter {
    #[inline]
    fn len(&self) -> usize {
        if self.done {
            return 0;
        }

        // Widened so ranges spanning most of the i32 space don't overflow.
        let dx = self.range.end.x as i64 - self.range.start.x as i64 + 1;
        let dy = self.range.end.y as i64 - self.range.start.y as i64 + 1;

        let y_offset = self.curr_y as i64 - self.range.start.y as i64;
        let x_offset = self.curr_x as i64 - self.range.start.x as i64;

        let remaining = dx * dy - (y_offset * dx + x_offset);
        usize::try_from(remaining).unwrap_or(usize::MAX)
    }
}

// Guarantees next() always stays None after exhaustion.
impl FusedIterator for CellRangeIter {}

// Support for-each style iteration.
impl IntoIterator for &CellRange {
    type Item = Cell;
    type IntoIter = CellRangeIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand_pcg::Pcg64;
    use rand::SeedableRng;

    #[test]
    fn test_manhattan_distance_properties() {
        let mut rng = Pcg64::seed_from_u64(0xCAFE1CAFE2CAFE3A);

        for _ in 0..256 {
            let a = Cell::new(rng.random_range(-500..500), rng.random_range(-500..500));
            let b = Cell::new(rng.random_range(-500..500), rng.random_range(-500..500));

            assert_eq!(a.manhattan_distance(b), b.manhattan_distance(a));
            assert_eq!(a.manhattan_distance(a), 0);
            assert!(a.manhattan_distance(b) >= 0);
        }

        assert_eq!(Cell::new(0, 0).manhattan_distance(Cell::new(3, -4)), 7);
    }

    #[test]
    fn test_offsets_clamp_at_coordinate_limits() {
        let edge = Cell::new(i32::MAX - 1, i32::MIN + 1);
        assert_eq!(edge.neighbors(), [
            Cell::new(i32::MAX - 1, i32::MIN),
            Cell::new(i32::MAX - 1, i32::MIN + 2),
            Cell::new(i32::MAX, i32::MIN + 1),
            Cell::new(i32::MAX - 2, i32::MIN + 1),
        ]);

        let corner = Cell::new(i32::MAX, i32::MIN);
        assert_eq!(corner.offset(1, -1), corner);

        let padded = edge.cells_within(3);
        assert_eq!(padded.start, Cell::new(i32::MAX - 4, i32::MIN));
        assert_eq!(padded.end, Cell::new(i32::MAX, i32::MIN + 4));
        assert_eq!(padded.iter().len(), 5 * 5);
        assert_eq!(padded.iter().count(), 5 * 5);

        assert_eq!(Cell::new(i32::MIN, 0).manhattan_distance(Cell::new(i32::MAX, 0)), i32::MAX);
        assert_eq!(Cell::new(i32::MIN, 0).distance(Cell::new(0, 0)), 2147483648.0);
    }

    #[test]
    fn test_neighbors_order() {
        let cell = Cell::new(5, 5);
        assert_eq!(cell.neighbors(), [
            Cell::new(5, 4),
            Cell::new(5, 6),
            Cell::new(6, 5),
            Cell::new(4, 5),
        ]);
    }

    #[test]
    fn test_cells_within() {
        let cell = Cell::new(2, 2);

        let within_zero: Vec<Cell> = cell.cells_within(0).iter().collect();
        assert_eq!(within_zero, [cell]);

        let within_one = cell.cells_within(1);
        assert_eq!(within_one.iter().len(), 9);
        assert!(within_one.contains(Cell::new(1, 1)));
        assert!(within_one.contains(Cell::new(3, 3)));
        assert!(!within_one.contains(Cell::new(4, 2)));

        assert_eq!(cell.cells_within(3).iter().count(), 49);
    }

    #[test]
    fn test_footprint_range() {
        let range = CellRange::from_footprint(Cell::new(5, 5), Size::new(2, 2));
        let cells: Vec<Cell> = range.iter().collect();
        assert_eq!(cells, [
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(5, 6),
            Cell::new(6, 6),
        ]);

        let degenerate = CellRange::from_footprint(Cell::new(5, 5), Size::new(0, 3));
        assert!(degenerate.is_empty());
        assert_eq!(degenerate.iter().count(), 0);
    }

    #[test]
    fn test_range_iter_len() {
        let range = CellRange::new(Cell::new(0, 0), Cell::new(2, 1));
        let mut iter = range.iter();
        assert_eq!(iter.len(), 6);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.count(), 4);
    }

    #[test]
    fn test_range_intersects() {
        let a = CellRange::new(Cell::new(0, 0), Cell::new(2, 2));
        let b = CellRange::new(Cell::new(2, 2), Cell::new(4, 4));
        let c = CellRange::new(Cell::new(3, 0), Cell::new(4, 1));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
