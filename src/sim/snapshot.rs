/// Read-only view of a session, handed to the renderer after each action.

use crate::domain::tile::{Pos, Tile, TileId, Variant};
use super::event::MoveEvent;
use super::phase::GameState;
use super::power::PowerKind;
use super::score::LeaderboardEntry;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileView {
    pub id: TileId,
    pub value: u32,
    pub variant: Variant,
    pub row: usize,
    pub col: usize,
    /// Target of a merge during the last slide.
    pub merged: bool,
}

impl TileView {
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }
}

impl From<&Tile> for TileView {
    fn from(t: &Tile) -> Self {
        TileView {
            id: t.id,
            value: t.value,
            variant: t.variant,
            row: t.row,
            col: t.col,
            merged: t.merged,
        }
    }
}

/// One-shot banner raised by a terminal evaluation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Notice {
    Won { score: u32, top_tile: u32 },
    Over { score: u32, top_tile: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Row-major.
    pub tiles: Vec<TileView>,
    /// Per-tile results of the last slide (empty after a power or restart).
    pub moves: Vec<MoveEvent>,
    pub spawned: Option<TileId>,
    pub score: u32,
    pub best: u32,
    pub top_tile: u32,
    pub state: GameState,
    pub powers: [(PowerKind, u32); 3],
    pub notice: Option<Notice>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[cfg(test)]
impl Snapshot {
    pub fn tile_at(&self, pos: Pos) -> Option<&TileView> {
        self.tiles.iter().find(|t| t.pos() == pos)
    }
}
