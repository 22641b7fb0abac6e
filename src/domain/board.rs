/// Board: fixed N×N grid of optional tiles.
///
/// Pure container with positional lookup. No game rules live here;
/// the only invariants enforced are structural:
///   - a cell holds at most one tile
///   - a tile's stored (row, col) always equals the cell holding it
///
/// All tile mutations go through `place()` / `take()` / `relocate()`,
/// which keep the stored position in sync.

use super::tile::{Pos, Tile};

pub const BOARD_SIZE: usize = 4;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    cells: [[Option<Tile>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

// ── Queries ──

impl Board {
    pub fn new() -> Self {
        Board { cells: [[None; BOARD_SIZE]; BOARD_SIZE] }
    }

    /// Is (row, col) inside the grid? Takes signed coordinates so callers
    /// can step off the edge without underflow.
    #[inline]
    pub fn in_bounds(row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Option<&Tile> {
        self.cells.get(pos.row)?.get(pos.col)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        self.cells.get_mut(pos.row)?.get_mut(pos.col)?.as_mut()
    }

    #[inline]
    pub fn is_empty_at(&self, pos: Pos) -> bool {
        self.get(pos).is_none()
    }

    /// Every cell without a tile, row-major.
    pub fn empty_cells(&self) -> Vec<Pos> {
        all_positions().filter(|&p| self.is_empty_at(p)).collect()
    }

    pub fn is_full(&self) -> bool {
        self.empty_cells().is_empty()
    }

    /// The up-to-8 cells surrounding `pos`, clipped to the grid.
    pub fn neighbors8(pos: Pos) -> Vec<Pos> {
        let mut out = Vec::with_capacity(8);
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 { continue; }
                let r = pos.row as isize + dr;
                let c = pos.col as isize + dc;
                if Board::in_bounds(r, c) {
                    out.push(Pos::new(r as usize, c as usize));
                }
            }
        }
        out
    }

    /// Tile with the greatest value. Ties go to the first one in row-major order.
    pub fn highest_value_tile(&self) -> Option<&Tile> {
        let mut best: Option<&Tile> = None;
        for tile in self.tiles() {
            if best.map_or(true, |b| tile.value > b.value) {
                best = Some(tile);
            }
        }
        best
    }

    /// Largest tile value on the board, 0 when empty.
    pub fn max_value(&self) -> u32 {
        self.highest_value_tile().map_or(0, |t| t.value)
    }

    /// Occupied tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flat_map(|row| row.iter().flatten())
    }

    #[allow(dead_code)]
    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    #[allow(dead_code)]
    pub fn value_sum(&self) -> u64 {
        self.tiles().map(|t| t.value as u64).sum()
    }
}

// ── Mutation ──

impl Board {
    /// Put `tile` into the cell named by its own (row, col).
    /// An occupied or out-of-range cell refuses the tile and hands it back.
    pub fn place(&mut self, tile: Tile) -> Result<(), Tile> {
        if !Board::in_bounds(tile.row as isize, tile.col as isize)
            || self.cells[tile.row][tile.col].is_some()
        {
            return Err(tile);
        }
        self.cells[tile.row][tile.col] = Some(tile);
        Ok(())
    }

    /// Remove and return the tile at `pos`.
    pub fn take(&mut self, pos: Pos) -> Option<Tile> {
        self.cells.get_mut(pos.row)?.get_mut(pos.col)?.take()
    }

    /// Move the tile at `from` into the empty cell `to`, updating its position.
    /// Returns false (and changes nothing) if `from` is empty or `to` is taken.
    pub fn relocate(&mut self, from: Pos, to: Pos) -> bool {
        if from == to {
            return self.get(from).is_some();
        }
        if self.get(from).is_none() || !Board::in_bounds(to.row as isize, to.col as isize) || !self.is_empty_at(to) {
            return false;
        }
        if let Some(mut tile) = self.take(from) {
            tile.set_pos(to);
            self.cells[to.row][to.col] = Some(tile);
            return true;
        }
        false
    }

    /// Remove every tile, returning them in row-major order.
    pub fn drain(&mut self) -> Vec<Tile> {
        let mut out = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for p in all_positions() {
            if let Some(t) = self.take(p) {
                out.push(t);
            }
        }
        out
    }

    /// Reset the per-move merge guard on every tile.
    pub fn clear_merged_flags(&mut self) {
        for cell in self.cells.iter_mut().flat_map(|r| r.iter_mut()) {
            if let Some(t) = cell {
                t.merged = false;
            }
        }
    }
}

/// All N² coordinates, row-major.
pub fn all_positions() -> impl Iterator<Item = Pos> {
    (0..BOARD_SIZE).flat_map(|r| (0..BOARD_SIZE).map(move |c| Pos::new(r, c)))
}

// ── Test fixtures ──

#[cfg(test)]
impl Board {
    /// Build a board from a diagram, one string per row.
    /// Tokens: `.` empty, `8` normal, `w8` wild, `d8` doubler.
    /// Ids are assigned row-major starting at 1.
    pub fn from_diagram(rows: &[&str]) -> Board {
        use super::tile::Variant;

        let mut board = Board::new();
        let mut next_id = 1;
        for (r, line) in rows.iter().enumerate() {
            for (c, tok) in line.split_whitespace().enumerate() {
                if tok == "." { continue; }
                let (variant, digits) = match tok.as_bytes()[0] {
                    b'w' => (Variant::Wild, &tok[1..]),
                    b'd' => (Variant::Doubler, &tok[1..]),
                    _ => (Variant::Normal, tok),
                };
                let value: u32 = digits.parse().expect("bad diagram token");
                board
                    .place(Tile::new(next_id, value, variant, Pos::new(r, c)))
                    .expect("diagram overlaps");
                next_id += 1;
            }
        }
        board
    }

    /// Row of values (0 = empty), for compact assertions.
    pub fn values_row(&self, row: usize) -> [u32; BOARD_SIZE] {
        let mut out = [0; BOARD_SIZE];
        for (c, v) in out.iter_mut().enumerate() {
            *v = self.get(Pos::new(row, c)).map_or(0, |t| t.value);
        }
        out
    }
}
