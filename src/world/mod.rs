use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{
    bitflags_with_display,
    utils::{Size, coords::{Cell, CellRange}},
};

pub mod grid;
pub use grid::{BuildingId, GridWorld};


// ----------------------------------------------
// StructureKind
// ----------------------------------------------

bitflags_with_display! {
    // What occupies a map cell. A cell always holds a single flag;
    // combinations are only used as masks.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StructureKind: u8 {
        const Road        = 1 << 0;
        const Residential = 1 << 1;
        const Commercial  = 1 << 2;
        const Industrial  = 1 << 3;
        const Civic       = 1 << 4;
        const PowerLine   = 1 << 5;
        const PowerPlant  = 1 << 6;
    }
}

impl StructureKind {
    #[inline]
    pub const fn drivable() -> Self {
        Self::Road
    }

    #[inline]
    pub const fn buildings() -> Self {
        Self::from_bits_retain(
            Self::Residential.bits() |
            Self::Commercial.bits()  |
            Self::Industrial.bits()  |
            Self::Civic.bits()       |
            Self::PowerPlant.bits()
        )
    }

    #[inline]
    pub const fn is_single_kind(self) -> bool {
        self.bits().count_ones() == 1
    }

    #[inline]
    pub fn is_drivable(self) -> bool {
        self == Self::drivable()
    }
}

// ----------------------------------------------
// Tradeable
// ----------------------------------------------

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumCount, EnumIter,
         IntoPrimitive, Serialize, Deserialize)]
pub enum Tradeable {
    Money,
    Labor,
    Goods,
    WholesaleGoods,
    RawMaterials,
}

pub const TRADEABLE_COUNT: usize = Tradeable::COUNT;

// ----------------------------------------------
// TradeStock
// ----------------------------------------------

// Quantity per Tradeable kind, indexed by the enum discriminant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStock {
    counts: [u32; TRADEABLE_COUNT],
}

impl TradeStock {
    #[inline]
    pub const fn new() -> Self {
        Self { counts: [0; TRADEABLE_COUNT] }
    }

    #[inline]
    pub fn count(&self, kind: Tradeable) -> u32 {
        let index: u8 = kind.into();
        self.counts[index as usize]
    }

    #[inline]
    pub fn set(&mut self, kind: Tradeable, count: u32) {
        let index: u8 = kind.into();
        self.counts[index as usize] = count;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Tradeable, u32)> + '_ {
        Tradeable::iter().map(|kind| (kind, self.count(kind)))
    }
}

// ----------------------------------------------
// Building / World interfaces
// ----------------------------------------------

pub trait Building {
    // Footprint width x height in cells, anchored at the building's placement cell.
    fn size(&self) -> Size;

    // How many units of `kind` this building can sell right now.
    fn available_to_sell(&self, kind: Tradeable) -> u32;

    // How many units of `kind` this building wants to buy right now.
    fn available_to_buy(&self, kind: Tradeable) -> u32;
}

// Result of a proximity query. `cell` is the building's placement (anchor) cell.
pub struct NearbyBuilding<'world, B> {
    pub cell: Cell,
    pub distance: f64,
    pub building: &'world B,
}

impl<B: Building> NearbyBuilding<'_, B> {
    #[inline]
    pub fn footprint(&self) -> CellRange {
        CellRange::from_footprint(self.cell, self.building.size())
    }
}

// Clone/Copy without requiring B: Clone.
impl<B> Clone for NearbyBuilding<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for NearbyBuilding<'_, B> {}

pub trait World {
    type Building: Building;

    // What structure occupies `cell`, if anything.
    fn structure_at(&self, cell: Cell) -> Option<StructureKind>;

    // Buildings whose anchor cell is within `max_distance` of `cell`,
    // sorted nearest first.
    fn nearest_buildings(&self, cell: Cell, max_distance: f64) -> Vec<NearbyBuilding<'_, Self::Building>>;

    #[inline]
    fn is_drivable(&self, cell: Cell) -> bool {
        self.structure_at(cell).is_some_and(StructureKind::is_drivable)
    }
}

// ----------------------------------------------
// BuildingSite
// ----------------------------------------------

// Plain building record used by GridWorld.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingSite {
    pub name: String,
    pub kind: StructureKind,
    pub size: Size,
    pub selling: TradeStock,
    pub buying: TradeStock,
}

impl BuildingSite {
    pub fn new(name: &str, kind: StructureKind, size: Size) -> Self {
        debug_assert!(kind.is_single_kind(), "Expected single structure kind flag!");
        Self {
            name: name.into(),
            kind,
            size,
            selling: TradeStock::new(),
            buying: TradeStock::new(),
        }
    }

    #[inline]
    pub fn sells(mut self, kind: Tradeable, count: u32) -> Self {
        self.selling.set(kind, count);
        self
    }

    #[inline]
    pub fn buys(mut self, kind: Tradeable, count: u32) -> Self {
        self.buying.set(kind, count);
        self
    }
}

impl Building for BuildingSite {
    #[inline]
    fn size(&self) -> Size {
        self.size
    }

    #[inline]
    fn available_to_sell(&self, kind: Tradeable) -> u32 {
        self.selling.count(kind)
    }

    #[inline]
    fn available_to_buy(&self, kind: Tradeable) -> u32 {
        self.buying.count(kind)
    }
}
