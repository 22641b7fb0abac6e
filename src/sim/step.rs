/// The slide function: resolves one directional move over the whole board.
///
/// Processing order:
///   1. Clear every tile's merge guard
///   2. Build traversal order (far side first)
///   3. For each tile: find farthest empty cell + first blocker
///   4. Merge into the blocker if the rules allow, else slide to farthest
///
/// Processing the far side first means a tile never leapfrogs one that
/// has not moved yet. A tile that absorbed another this move is guarded
/// by its `merged` flag, so `[2 2 2 2]` left yields `[4 4 . .]`.

use crate::domain::board::{Board, BOARD_SIZE};
use crate::domain::rules;
use crate::domain::tile::Pos;
use super::event::MoveEvent;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// (d_row, d_col) unit vector.
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::Up    => (-1, 0),
            Direction::Down  => (1, 0),
            Direction::Left  => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Did any tile change cell or merge?
    pub moved: bool,
    /// Sum of merge gains this move.
    pub gained: u32,
    pub events: Vec<MoveEvent>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn apply_move(board: &mut Board, dir: Direction) -> MoveOutcome {
    board.clear_merged_flags();

    let (rows, cols) = traversals(dir);
    let mut out = MoveOutcome::default();

    for &row in &rows {
        for &col in &cols {
            let origin = Pos::new(row, col);
            if board.is_empty_at(origin) { continue; }
            slide_tile(board, origin, dir, &mut out);
        }
    }

    out
}

/// Would `dir` change anything? Pure: works on a scratch copy.
#[allow(dead_code)]
pub fn can_move(board: &Board, dir: Direction) -> bool {
    let mut scratch = board.clone();
    apply_move(&mut scratch, dir).moved
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

/// Row and column visiting order: start from the side tiles slide toward.
fn traversals(dir: Direction) -> (Vec<usize>, Vec<usize>) {
    let mut rows: Vec<usize> = (0..BOARD_SIZE).collect();
    let mut cols: Vec<usize> = (0..BOARD_SIZE).collect();
    let (dr, dc) = dir.vector();
    if dr == 1 { rows.reverse(); }
    if dc == 1 { cols.reverse(); }
    (rows, cols)
}

/// Walk from `start` while the next cell is in bounds and empty.
/// Returns (farthest empty cell reached, first blocker if in bounds).
fn find_farthest(board: &Board, start: Pos, dir: Direction) -> (Pos, Option<Pos>) {
    let (dr, dc) = dir.vector();
    let mut previous = start;
    loop {
        let r = previous.row as isize + dr;
        let c = previous.col as isize + dc;
        if !Board::in_bounds(r, c) {
            return (previous, None);
        }
        let cell = Pos::new(r as usize, c as usize);
        if !board.is_empty_at(cell) {
            return (previous, Some(cell));
        }
        previous = cell;
    }
}

fn slide_tile(board: &mut Board, origin: Pos, dir: Direction, out: &mut MoveOutcome) {
    let (farthest, next) = find_farthest(board, origin, dir);

    let merge = next.and_then(|next| {
        let tile = board.get(origin)?;
        let target = board.get(next)?;
        rules::can_merge_into(tile, target)
            .then(|| (next, target.id, rules::resolve_merge(tile, target)))
    });

    if let Some((next, target_id, outcome)) = merge {
        let moving = match board.take(origin) {
            Some(t) => t,
            None => return,
        };
        if let Some(target) = board.get_mut(next) {
            target.value = outcome.value;
            target.variant = outcome.variant;
            target.merged = true;
        }
        out.events.push(MoveEvent::Merged {
            id: moving.id,
            from: origin,
            to: next,
            target: target_id,
            value: outcome.value,
            variant: outcome.variant,
            celebratory: outcome.celebratory,
        });
        out.gained = out.gained.saturating_add(outcome.gain);
        out.moved = true;
        return;
    }

    let id = match board.get(origin) {
        Some(t) => t.id,
        None => return,
    };
    if farthest != origin && board.relocate(origin, farthest) {
        out.moved = true;
    }
    out.events.push(MoveEvent::Moved { id, from: origin, to: farthest });
}
