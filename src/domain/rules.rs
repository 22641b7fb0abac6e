/// Merge rules and the game-over predicate, truth-table driven.
///
/// Pure functions over tiles and boards with no side effects.
/// These encode "what is legal" and "what it yields" without
/// performing the merge.
///
/// ## Merge Eligibility
/// ┌──────────────────────────────┬───────────┐
/// │ Condition (priority order)    │ Merge?    │
/// ├──────────────────────────────┼───────────┤
/// │ target already merged (move)  │ DENY      │
/// │ either tile Wild              │ ALLOW     │
/// │ values equal                  │ ALLOW     │
/// │ Otherwise                     │ DENY      │
/// └──────────────────────────────┴───────────┘
///
/// ## Merge Outcome
/// ┌──────────────────────┬──────────────────────┬─────────┬─────────────┐
/// │ Condition (priority)  │ Value                 │ Variant │ Celebratory │
/// ├──────────────────────┼──────────────────────┼─────────┼─────────────┤
/// │ either Wild           │ 2 × max(a, b)         │ Normal  │ yes         │
/// │ either Doubler        │ 4 × target            │ Normal  │ yes         │
/// │ Otherwise             │ 2 × target            │ Normal  │ no          │
/// └──────────────────────┴──────────────────────┴─────────┴─────────────┘
///
/// Gain always equals the resulting value. Values saturate at `u32::MAX`.

use super::board::{all_positions, Board, BOARD_SIZE};
use super::tile::{Pos, Tile, Variant};

/// Result of merging `moving` into `target`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MergeOutcome {
    pub value: u32,
    pub variant: Variant,
    pub gain: u32,
    pub celebratory: bool,
}

/// Variant/value eligibility, ignoring the per-move merge guard.
pub fn can_merge(a: &Tile, b: &Tile) -> bool {
    if a.variant.is_wild() || b.variant.is_wild() {
        return true;
    }
    // Doublers and normals share the equal-value rule.
    a.value == b.value
}

/// Can `moving` slide into `target` this move?
pub fn can_merge_into(moving: &Tile, target: &Tile) -> bool {
    !target.merged && can_merge(moving, target)
}

pub fn resolve_merge(moving: &Tile, target: &Tile) -> MergeOutcome {
    let has_wild = moving.variant.is_wild() || target.variant.is_wild();
    let has_doubler = moving.variant.is_doubler() || target.variant.is_doubler();

    let (value, celebratory) = if has_wild {
        (moving.value.max(target.value).saturating_mul(2), true)
    } else if has_doubler {
        (target.value.saturating_mul(4), true)
    } else {
        (target.value.saturating_mul(2), false)
    };

    MergeOutcome {
        value,
        variant: Variant::Normal,
        gain: value,
        celebratory,
    }
}

/// Does any orthogonally adjacent pair satisfy `can_merge`?
pub fn any_merge_available(board: &Board) -> bool {
    for p in all_positions() {
        let tile = match board.get(p) {
            Some(t) => t,
            None => continue,
        };
        // Right and down cover every unordered pair once.
        let right = (p.col + 1 < BOARD_SIZE).then(|| Pos::new(p.row, p.col + 1));
        let down = (p.row + 1 < BOARD_SIZE).then(|| Pos::new(p.row + 1, p.col));
        for q in [right, down].into_iter().flatten() {
            if let Some(other) = board.get(q) {
                if can_merge(tile, other) {
                    return true;
                }
            }
        }
    }
    false
}

/// Over ⟺ no empty cell and no adjacent mergeable pair.
pub fn is_game_over(board: &Board) -> bool {
    board.is_full() && !any_merge_available(board)
}
