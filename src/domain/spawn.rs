/// Tile factory: identity assignment and the random spawn policy.
///
/// Spawn policy (one variant roll, first threshold met wins):
///   peak tile ≥ wild_threshold    → wild_chance    of Wild
///   peak tile ≥ doubler_threshold → doubler_chance of Doubler
///   otherwise                     → Normal
/// Value is 4 with `four_chance`, else 2, independent of variant.
/// The peak tile is the highest value reached this game.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SpawnConfig;
use super::board::Board;
use super::tile::{Tile, TileId, Variant};

pub struct TileFactory {
    next_id: TileId,
    policy: SpawnConfig,
}

impl TileFactory {
    pub fn new(policy: SpawnConfig) -> Self {
        TileFactory { next_id: 1, policy }
    }

    /// Spawn a tile into a random empty cell.
    /// Returns None (and draws nothing) when the board is full.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        top_tile: u32,
        forced: Option<Variant>,
        rng: &mut R,
    ) -> Option<Tile> {
        let empties = board.empty_cells();
        let &pos = empties.choose(rng)?;

        let value = if rng.gen_bool(self.policy.four_chance) { 4 } else { 2 };
        let variant = match forced {
            Some(v) => v,
            None => self.roll_variant(top_tile, rng),
        };

        let tile = Tile::new(self.next_id, value, variant, pos);
        self.next_id += 1;
        board.place(tile).ok()?;
        Some(tile)
    }

    fn roll_variant<R: Rng + ?Sized>(&self, top_tile: u32, rng: &mut R) -> Variant {
        let p = &self.policy;
        if top_tile >= p.wild_threshold {
            if rng.gen_bool(p.wild_chance) { Variant::Wild } else { Variant::Normal }
        } else if top_tile >= p.doubler_threshold {
            if rng.gen_bool(p.doubler_chance) { Variant::Doubler } else { Variant::Normal }
        } else {
            Variant::Normal
        }
    }
}

#[cfg(test)]
impl TileFactory {
    /// Id the next spawned tile will receive.
    pub fn peek_id(&self) -> TileId {
        self.next_id
    }

    /// Skip past ids already taken by a fixture board.
    pub fn reserve_through(&mut self, id: TileId) {
        self.next_id = self.next_id.max(id + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn factory() -> TileFactory {
        TileFactory::new(SpawnConfig::default())
    }

    fn always(mut cfg: SpawnConfig) -> TileFactory {
        cfg.wild_chance = 1.0;
        cfg.doubler_chance = 1.0;
        TileFactory::new(cfg)
    }

    #[test]
    fn spawn_fills_an_empty_cell_with_two_or_four() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut f = factory();
        let mut b = Board::new();
        let t = f.spawn(&mut b, 0, None, &mut rng).unwrap();
        assert!(t.value == 2 || t.value == 4);
        assert_eq!(t.variant, Variant::Normal);
        assert_eq!(b.get(t.pos()), Some(&t));
        assert_eq!(b.tile_count(), 1);
    }

    #[test]
    fn spawn_on_full_board_returns_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut f = factory();
        let mut b = Board::from_diagram(&[
            "2 4 2 4",
            "4 2 4 2",
            "2 4 2 4",
            "4 2 4 2",
        ]);
        let before = b.clone();
        assert!(f.spawn(&mut b, 4, None, &mut rng).is_none());
        assert_eq!(b, before);
        assert_eq!(f.peek_id(), 1);
    }

    #[test]
    fn ids_are_monotonic_and_unique() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut f = factory();
        let mut b = Board::new();
        let ids: Vec<TileId> = (0..16)
            .map(|_| f.spawn(&mut b, 0, None, &mut rng).unwrap().id)
            .collect();
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
        assert!(b.is_full());
    }

    #[test]
    fn forced_variant_wins_over_policy() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut f = always(SpawnConfig::default());
        let mut b = Board::new();
        let t = f.spawn(&mut b, 128, Some(Variant::Doubler), &mut rng).unwrap();
        assert_eq!(t.variant, Variant::Doubler);
    }

    #[test]
    fn wild_threshold_takes_priority() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut f = always(SpawnConfig::default());
        let mut b = Board::new();
        assert_eq!(f.spawn(&mut b, 64, None, &mut rng).unwrap().variant, Variant::Wild);
        assert_eq!(f.spawn(&mut b, 32, None, &mut rng).unwrap().variant, Variant::Doubler);
        assert_eq!(f.spawn(&mut b, 16, None, &mut rng).unwrap().variant, Variant::Normal);
    }

    #[test]
    fn low_progress_never_spawns_specials() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut f = factory();
        for _ in 0..200 {
            let mut b = Board::new();
            let t = f.spawn(&mut b, 16, None, &mut rng).unwrap();
            assert_eq!(t.variant, Variant::Normal);
        }
    }

    #[test]
    fn four_chance_is_roughly_ten_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut f = factory();
        let fours = (0..2000)
            .filter(|_| {
                let mut b = Board::new();
                f.spawn(&mut b, 0, None, &mut rng).unwrap().value == 4
            })
            .count();
        assert!((100..=300).contains(&fours), "fours = {fours}");
    }
}
