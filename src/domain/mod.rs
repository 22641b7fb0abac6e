/// Domain layer: tiles, the board, merge rules and the spawn policy.
/// Pure data and pure functions; randomness is always passed in.

pub mod board;
pub mod rules;
pub mod spawn;
pub mod tile;
