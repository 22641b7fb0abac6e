/// Events emitted while resolving one action.
/// The presentation layer consumes these for animation/sound;
/// the engine never holds a drawable handle.

use crate::domain::tile::{Pos, TileId, Variant};
use super::power::PowerKind;
use super::score::RunLabel;

/// Per-tile outcome of a slide, in processing order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveEvent {
    /// Tile stayed alive and now sits at `to` (`from == to` for tiles that did not budge).
    Moved { id: TileId, from: Pos, to: Pos },
    /// Tile slid into `target` at `to` and disappeared; `target` now holds `value`.
    Merged {
        id: TileId,
        from: Pos,
        to: Pos,
        target: TileId,
        value: u32,
        variant: Variant,
        celebratory: bool,
    },
}

impl MoveEvent {
    /// Did the tile change cell (or vanish into a merge)?
    pub fn is_effective(&self) -> bool {
        match *self {
            MoveEvent::Moved { from, to, .. } => from != to,
            MoveEvent::Merged { .. } => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Move(MoveEvent),
    Spawned { id: TileId, pos: Pos, value: u32, variant: Variant },
    Bombed { center: Pos, removed: Vec<TileId> },
    Shuffled { tiles: usize },
    PowerUsed { kind: PowerKind, remaining: u32 },
    ScoreGained(u32),
    NewBest(u32),
    Won { score: u32, top_tile: u32 },
    GameOver { score: u32, top_tile: u32 },
    RunRecorded { label: RunLabel, rank: Option<usize> },
    Restarted,
}
