use crate::types::{Coord, GhostKind};
use crate::world::is_within;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Player,
    Ghost(GhostKind),
    Fixture(usize),
}

#[derive(Clone, Debug)]
pub struct SpatialIndex {
    rows: i32,
    cols: i32,
    cells: Vec<Option<EntityRef>>,
}

impl SpatialIndex {
    pub fn new(rows: i32, cols: i32) -> Self {
        let len = (rows.max(0) as usize) * (cols.max(0) as usize);
        Self {
            rows,
            cols,
            cells: vec![None; len],
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn contains(&self, at: Coord) -> bool {
        is_within(self.rows, self.cols, at)
    }

    pub fn get(&self, at: Coord) -> Option<EntityRef> {
        self.cells[self.slot(at)]
    }

    pub fn set(&mut self, at: Coord, entity: EntityRef) {
        let slot = self.slot(at);
        self.cells[slot] = Some(entity);
    }

    pub fn unset(&mut self, at: Coord) {
        let slot = self.slot(at);
        self.cells[slot] = None;
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Coord, EntityRef)> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().filter_map(move |(slot, cell)| {
            cell.map(|entity| {
                let slot = slot as i32;
                (Coord::new(slot / cols, slot % cols), entity)
            })
        })
    }

    fn slot(&self, at: Coord) -> usize {
        assert!(
            self.contains(at),
            "cell {at:?} outside {}x{} index",
            self.rows,
            self.cols
        );
        (at.row * self.cols + at.col) as usize
    }
}
