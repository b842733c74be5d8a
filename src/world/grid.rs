use std::ops::{Index, IndexMut};
use slab::Slab;

use crate::{
    log,
    utils::{Size, coords::{Cell, CellRange}},
};

use super::{BuildingSite, NearbyBuilding, StructureKind, World};

// ----------------------------------------------
// Grid
// ----------------------------------------------

// 2D grid of cells. For each Cell in the grid stores a generic payload.
// Grid can be indexed with `grid[cell]`.
struct Grid<T> {
    size: Size,
    cells: Vec<T>, // WxH cells.
}

impl<T> Grid<T> {
    #[inline]
    fn new(size: Size, cells: Vec<T>) -> Self {
        debug_assert!(cells.len() == (size.width * size.height) as usize);
        Self { size, cells }
    }

    #[inline]
    fn get(&self, cell: Cell) -> Option<&T> {
        self.cell_to_grid_index(cell).map(|index| &self.cells[index])
    }

    #[inline]
    fn cell_to_grid_index(&self, cell: Cell) -> Option<usize> {
        if !self.is_cell_within_bounds(cell) {
            return None;
        }
        let index = cell.x + (cell.y * self.size.width);
        Some(index as usize)
    }

    #[inline]
    fn is_cell_within_bounds(&self, cell: Cell) -> bool {
        if (cell.x < 0 || cell.x >= self.size.width) ||
           (cell.y < 0 || cell.y >= self.size.height) {
            return false;
        }
        true
    }
}

// Immutable indexing
impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, cell: Cell) -> &Self::Output {
        let index = self.cell_to_grid_index(cell)
            .unwrap_or_else(|| panic!("Unexpected invalid grid cell: {cell}"));
        &self.cells[index]
    }
}

// Mutable indexing
impl<T> IndexMut<Cell> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, cell: Cell) -> &mut Self::Output {
        let index = self.cell_to_grid_index(cell)
            .unwrap_or_else(|| panic!("Unexpected invalid grid cell: {cell}"));
        &mut self.cells[index]
    }
}

// ----------------------------------------------
// GridWorld
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingId(usize);

struct PlacedBuilding {
    anchor: Cell,
    site: BuildingSite,
}

impl PlacedBuilding {
    #[inline]
    fn footprint(&self) -> CellRange {
        CellRange::from_footprint(self.anchor, self.site.size)
    }
}

// Fixed-size in-memory city map: one structure kind per cell
// plus the list of placed buildings.
pub struct GridWorld {
    grid: Grid<Option<StructureKind>>,
    buildings: Slab<PlacedBuilding>,
}

impl GridWorld {
    pub fn new(size: Size) -> Self {
        debug_assert!(size.is_valid());
        let cell_count = size.area().max(0) as usize;
        Self {
            grid: Grid::new(size, vec![None; cell_count]),
            buildings: Slab::new(),
        }
    }

    // Grid fully covered by one structure kind, e.g. all road.
    pub fn with_structure(size: Size, kind: StructureKind) -> Self {
        debug_assert!(kind.is_single_kind(), "Expected single structure kind flag!");
        let mut world = Self::new(size);
        world.grid.cells.fill(Some(kind));
        world
    }

    // Build from a row-major list of cells (None = empty lot).
    pub fn with_structure_grid(size: Size, cells: Vec<Option<StructureKind>>) -> Self {
        debug_assert!(size.is_valid());
        Self {
            grid: Grid::new(size, cells),
            buildings: Slab::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.grid.size
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.grid.is_cell_within_bounds(cell)
    }

    // Out of bounds cells are ignored.
    #[inline]
    pub fn set_structure(&mut self, cell: Cell, kind: Option<StructureKind>) {
        if self.grid.is_cell_within_bounds(cell) {
            self.grid[cell] = kind;
        }
    }

    pub fn place_road(&mut self, cells: CellRange) {
        for cell in &cells {
            self.set_structure(cell, Some(StructureKind::Road));
        }
    }

    // Places a building with its top-left corner at `anchor`. The whole footprint
    // must be in bounds and must not overlap another building.
    pub fn place_building(&mut self, anchor: Cell, site: BuildingSite) -> Result<BuildingId, String> {
        debug_assert!(site.kind.intersects(StructureKind::buildings()), "Unexpected building kind: {}", site.kind);

        let placed = PlacedBuilding { anchor, site };
        let footprint = placed.footprint();

        if footprint.is_empty() {
            return Err(format!("Building '{}' has an empty footprint {}!", placed.site.name, placed.site.size));
        }

        if !self.contains(footprint.start) || !self.contains(footprint.end) {
            return Err(format!("Building '{}' footprint {footprint} is out of bounds!", placed.site.name));
        }

        if let Some((_, other)) = self.buildings.iter().find(|(_, other)| other.footprint().intersects(&footprint)) {
            return Err(format!("Building '{}' at {footprint} overlaps '{}'!", placed.site.name, other.site.name));
        }

        for cell in &footprint {
            self.grid[cell] = Some(placed.site.kind);
        }

        let id = BuildingId(self.buildings.insert(placed));
        log::verbose!(log::channel!("world"), "Placed building {id:?} at {footprint}.");
        Ok(id)
    }

    // Frees the footprint cells back to empty lots.
    pub fn remove_building(&mut self, id: BuildingId) -> Result<BuildingSite, String> {
        let Some(placed) = self.buildings.try_remove(id.0) else {
            return Err(format!("Building slot [{}] is already vacant!", id.0));
        };

        for cell in &placed.footprint() {
            self.grid[cell] = None;
        }

        Ok(placed.site)
    }

    #[inline]
    pub fn building(&self, id: BuildingId) -> Option<&BuildingSite> {
        self.buildings.get(id.0).map(|placed| &placed.site)
    }

    #[inline]
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }
}

impl World for GridWorld {
    type Building = BuildingSite;

    #[inline]
    fn structure_at(&self, cell: Cell) -> Option<StructureKind> {
        self.grid.get(cell).copied().flatten()
    }

    fn nearest_buildings(&self, cell: Cell, max_distance: f64) -> Vec<NearbyBuilding<'_, BuildingSite>> {
        let mut nearby: Vec<(usize, NearbyBuilding<'_, BuildingSite>)> = self.buildings
            .iter()
            .filter_map(|(index, placed)| {
                let distance = cell.distance(placed.anchor);
                (distance <= max_distance).then_some((index, NearbyBuilding {
                    cell: placed.anchor,
                    distance,
                    building: &placed.site,
                }))
            })
            .collect();

        // Nearest first, slab order breaks ties so results are stable.
        nearby.sort_by(|(index_a, a), (index_b, b)| {
            a.distance.total_cmp(&b.distance).then(index_a.cmp(index_b))
        });

        nearby.into_iter().map(|(_, building)| building).collect()
    }
}
