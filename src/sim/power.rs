/// Power-ups: spawn-wild, bomb-highest, shuffle.
///
/// Each power mutates the board directly and reports whether it did
/// anything. Gating (can_act, remaining uses) and post-action
/// evaluation live in the session; the functions here only know the board.
///
/// ## Failure table
/// ┌──────────────┬────────────────────────────┐
/// │ Power         │ Fails (no-op) when          │
/// ├──────────────┼────────────────────────────┤
/// │ spawn_wild    │ board full                  │
/// │ bomb_highest  │ board empty                 │
/// │ shuffle       │ board empty                 │
/// └──────────────┴────────────────────────────┘

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PowerConfig;
use crate::domain::board::{all_positions, Board};
use crate::domain::spawn::TileFactory;
use crate::domain::tile::{Pos, Tile, TileId, Variant};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PowerKind {
    Wild,
    Bomb,
    Shuffle,
}

impl PowerKind {
    pub const ALL: [PowerKind; 3] = [PowerKind::Wild, PowerKind::Bomb, PowerKind::Shuffle];

    pub fn token(self) -> &'static str {
        match self {
            PowerKind::Wild => "wild",
            PowerKind::Bomb => "bomb",
            PowerKind::Shuffle => "shuffle",
        }
    }
}

impl fmt::Display for PowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for PowerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PowerKind::ALL
            .into_iter()
            .find(|k| k.token().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

// ── Inventory ──

/// Remaining uses per power. Never replenished within a game.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PowerInventory {
    wild: u32,
    bomb: u32,
    shuffle: u32,
}

impl PowerInventory {
    pub fn new(defaults: PowerConfig) -> Self {
        PowerInventory {
            wild: defaults.wild,
            bomb: defaults.bomb,
            shuffle: defaults.shuffle,
        }
    }

    pub fn remaining(&self, kind: PowerKind) -> u32 {
        match kind {
            PowerKind::Wild => self.wild,
            PowerKind::Bomb => self.bomb,
            PowerKind::Shuffle => self.shuffle,
        }
    }

    /// Spend one use. Returns false (and changes nothing) at zero.
    pub fn consume(&mut self, kind: PowerKind) -> bool {
        let slot = match kind {
            PowerKind::Wild => &mut self.wild,
            PowerKind::Bomb => &mut self.bomb,
            PowerKind::Shuffle => &mut self.shuffle,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn counts(&self) -> [(PowerKind, u32); 3] {
        PowerKind::ALL.map(|k| (k, self.remaining(k)))
    }
}

// ══════════════════════════════════════════════════════════════
// Powers
// ══════════════════════════════════════════════════════════════

/// Drop a wild tile into a random empty cell.
pub fn spawn_wild<R: Rng + ?Sized>(
    board: &mut Board,
    factory: &mut TileFactory,
    top_tile: u32,
    rng: &mut R,
) -> Option<Tile> {
    factory.spawn(board, top_tile, Some(Variant::Wild), rng)
}

/// Remove the highest tile and everything in its 8-neighbourhood.
/// Returns (center, removed ids) or None on an empty board.
pub fn bomb_highest(board: &mut Board) -> Option<(Pos, Vec<TileId>)> {
    let center = board.highest_value_tile()?.pos();
    let mut removed = Vec::with_capacity(9);
    for p in std::iter::once(center).chain(Board::neighbors8(center)) {
        if let Some(t) = board.take(p) {
            removed.push(t.id);
        }
    }
    Some((center, removed))
}

/// Reassign every tile to a uniformly random cell.
/// Returns the number of tiles shuffled, or None on an empty board.
pub fn shuffle<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Option<usize> {
    let tiles = board.drain();
    if tiles.is_empty() {
        return None;
    }

    let mut coords: Vec<Pos> = all_positions().collect();
    coords.shuffle(rng);

    let count = tiles.len();
    for (mut tile, pos) in tiles.into_iter().zip(coords) {
        tile.set_pos(pos);
        let placed = board.place(tile);
        debug_assert!(placed.is_ok(), "shuffle coordinates are distinct");
    }
    Some(count)
}
