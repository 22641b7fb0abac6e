/// Tiles and their variants.
/// Variant semantics are queried via methods, not stored as flags,
/// so merge eligibility is centralized in `rules`.

/// Process-unique tile identity. Assigned by the tile factory, never reused.
pub type TileId = u64;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Variant {
    #[default]
    Normal,
    Wild,    // merges with anything
    Doubler, // equal values only, quadruples the result
}

impl Variant {
    pub fn is_wild(self) -> bool {
        matches!(self, Variant::Wild)
    }

    pub fn is_doubler(self) -> bool {
        matches!(self, Variant::Doubler)
    }

    /// Does this variant change merge eligibility or outcome?
    pub fn is_special(self) -> bool {
        !matches!(self, Variant::Normal)
    }
}

/// Grid coordinate. `row` grows downward, `col` grows rightward.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }
}

/// A numbered tile. Owned by exactly one board cell.
///
/// Moving a tile rewrites `row`/`col` in place; merging mutates the
/// stationary target's `value`/`variant` and drops the moving tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
    pub variant: Variant,
    pub row: usize,
    pub col: usize,
    /// Set once this tile has absorbed another during the current move.
    pub merged: bool,
}

impl Tile {
    pub fn new(id: TileId, value: u32, variant: Variant, pos: Pos) -> Self {
        Tile {
            id,
            value,
            variant,
            row: pos.row,
            col: pos.col,
            merged: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }

    #[inline]
    pub fn set_pos(&mut self, pos: Pos) {
        self.row = pos.row;
        self.col = pos.col;
    }
}
