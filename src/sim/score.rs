/// Score, best score, top tile, and the top-5 run history.
///
/// Both halves persist through the `KeyValueStore`:
///   best-2048         decimal string
///   leaderboard-2048  TOML document `[[entries]] score/top_tile/label/timestamp`
///
/// Unreadable values never reach the player: a bad best reads as 0,
/// a bad leaderboard reads as empty.

use serde::{Deserialize, Serialize};

use crate::config::ScoreMode;
use crate::domain::board::Board;
use super::save::{KeyValueStore, StoreError, KEY_BEST, KEY_LEADERBOARD};

pub const LEADERBOARD_SIZE: usize = 5;

// ══════════════════════════════════════════════════════════════
// ScoreTracker
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ScoreTracker {
    score: u32,
    best: u32,
    top_tile: u32,
    /// Highest value seen on the board this game. A bomb can lower
    /// `top_tile` but never this.
    peak_tile: u32,
    mode: ScoreMode,
}

impl ScoreTracker {
    pub fn new(mode: ScoreMode, best: u32) -> Self {
        ScoreTracker { score: 0, best, top_tile: 0, peak_tile: 0, mode }
    }

    /// Start from the persisted best. In highest-tile mode a best that
    /// no tile could have is rounded down to a power of two.
    pub fn load(mode: ScoreMode, store: &dyn KeyValueStore) -> Self {
        let best = match store.get(KEY_BEST) {
            None => 0,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("stored best score {raw:?} is unreadable, using 0");
                0
            }),
        };
        let best = match mode {
            ScoreMode::Cumulative => best,
            ScoreMode::HighestTile => floor_tile_value(best),
        };
        ScoreTracker::new(mode, best)
    }

    pub fn score(&self) -> u32 { self.score }
    pub fn best(&self) -> u32 { self.best }
    pub fn top_tile(&self) -> u32 { self.top_tile }
    pub fn peak_tile(&self) -> u32 { self.peak_tile }

    /// New game. Best survives.
    pub fn reset(&mut self) {
        self.score = 0;
        self.top_tile = 0;
        self.peak_tile = 0;
    }

    pub fn add_gain(&mut self, gain: u32) {
        if self.mode == ScoreMode::Cumulative {
            self.score = self.score.saturating_add(gain);
        }
    }

    pub fn refresh_top(&mut self, board: &Board) {
        self.top_tile = board.max_value();
        self.peak_tile = self.peak_tile.max(self.top_tile);
        if self.mode == ScoreMode::HighestTile {
            self.score = self.top_tile;
        }
    }

    /// Raise best to score if exceeded, and persist.
    /// Returns the new best when it changed.
    pub fn update_best(&mut self, store: &mut dyn KeyValueStore) -> Option<u32> {
        if self.score <= self.best {
            return None;
        }
        self.best = self.score;
        if let Err(e) = store.set(KEY_BEST, &self.best.to_string()) {
            log::warn!("could not persist best score: {e}");
        }
        Some(self.best)
    }
}

/// Largest power of two not above `raw`; 0 below the smallest tile.
fn floor_tile_value(raw: u32) -> u32 {
    if raw < 2 {
        0
    } else {
        1 << (u32::BITS - 1 - raw.leading_zeros())
    }
}

// ══════════════════════════════════════════════════════════════
// Leaderboard
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunLabel {
    Win,
    Over,
}

impl RunLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RunLabel::Win => "win",
            RunLabel::Over => "over",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    pub top_tile: u32,
    pub label: RunLabel,
    /// Unix seconds.
    pub timestamp: u64,
}

impl LeaderboardEntry {
    fn rank_key(&self) -> (u32, u32) {
        (self.score, self.top_tile)
    }
}

#[derive(Serialize, Deserialize, Default)]
struct LeaderboardDoc {
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut board = Leaderboard::default();
        let Some(raw) = store.get(KEY_LEADERBOARD) else {
            return board;
        };
        match toml::from_str::<LeaderboardDoc>(&raw) {
            Ok(doc) => {
                board.entries = doc.entries;
                board.normalize();
            }
            Err(e) => log::warn!("stored leaderboard is unreadable ({e}), starting empty"),
        }
        board
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Append, re-sort descending by (score, top_tile), keep the top 5.
    /// Returns the entry's 0-based rank, or None if it fell off the end.
    /// Ties rank below entries already present.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let key = entry.rank_key();
        let rank = self.entries.iter().filter(|e| e.rank_key() >= key).count();
        self.entries.push(entry);
        self.normalize();
        (rank < LEADERBOARD_SIZE).then_some(rank)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let doc = LeaderboardDoc { entries: self.entries.clone() };
        let text = toml::to_string(&doc)?;
        store.set(KEY_LEADERBOARD, &text)
    }

    fn normalize(&mut self) {
        // sort_by is stable: equal keys keep insertion order.
        self.entries.sort_by(|a, b| b.rank_key().cmp(&a.rank_key()));
        self.entries.truncate(LEADERBOARD_SIZE);
    }
}

/// Close out a run: refresh best, then log the run on the leaderboard.
/// Returns the run's rank if it made the top 5.
pub fn record_run(
    tracker: &mut ScoreTracker,
    leaderboard: &mut Leaderboard,
    store: &mut dyn KeyValueStore,
    label: RunLabel,
    timestamp: u64,
) -> Option<usize> {
    tracker.update_best(store);
    let rank = leaderboard.insert(LeaderboardEntry {
        score: tracker.score(),
        top_tile: tracker.top_tile(),
        label,
        timestamp,
    });
    if let Err(e) = leaderboard.save(store) {
        log::warn!("could not persist leaderboard: {e}");
    }
    log::info!(
        "run recorded: {} score={} top={} rank={:?}",
        label.as_str(),
        tracker.score(),
        tracker.top_tile(),
        rank
    );
    rank
}

/// Seconds since the Unix epoch; 0 if the clock is before it.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::save::MemoryStore;

    fn entry(score: u32, top_tile: u32) -> LeaderboardEntry {
        LeaderboardEntry { score, top_tile, label: RunLabel::Over, timestamp: 0 }
    }

    // ── ScoreTracker ──

    #[test]
    fn cumulative_mode_sums_gains() {
        let mut t = ScoreTracker::new(ScoreMode::Cumulative, 0);
        t.add_gain(4);
        t.add_gain(16);
        assert_eq!(t.score(), 20);
    }

    #[test]
    fn highest_tile_mode_tracks_the_board() {
        let mut t = ScoreTracker::new(ScoreMode::HighestTile, 0);
        t.add_gain(4);
        assert_eq!(t.score(), 0);
        t.refresh_top(&Board::from_diagram(&["2 64 . .", ". . . .", ". . . .", ". . . 8"]));
        assert_eq!(t.score(), 64);
        assert_eq!(t.top_tile(), 64);
    }

    #[test]
    fn best_is_persisted_only_when_beaten() {
        let mut store = MemoryStore::new();
        let mut t = ScoreTracker::new(ScoreMode::Cumulative, 100);
        t.add_gain(50);
        assert_eq!(t.update_best(&mut store), None);
        assert_eq!(store.get(KEY_BEST), None);
        t.add_gain(60);
        assert_eq!(t.update_best(&mut store), Some(110));
        assert_eq!(store.get(KEY_BEST).as_deref(), Some("110"));
    }

    #[test]
    fn reset_keeps_best() {
        let mut store = MemoryStore::new();
        let mut t = ScoreTracker::new(ScoreMode::Cumulative, 0);
        t.add_gain(32);
        t.update_best(&mut store);
        t.reset();
        assert_eq!(t.score(), 0);
        assert_eq!(t.best(), 32);
    }

    #[test]
    fn load_reads_best_and_fails_open() {
        let mut store = MemoryStore::new();
        store.set(KEY_BEST, " 2048 ").unwrap();
        assert_eq!(ScoreTracker::load(ScoreMode::Cumulative, &store).best(), 2048);
        store.set(KEY_BEST, "lots").unwrap();
        assert_eq!(ScoreTracker::load(ScoreMode::Cumulative, &store).best(), 0);
    }

    #[test]
    fn highest_tile_mode_rounds_stored_best_down() {
        let mut store = MemoryStore::new();
        store.set(KEY_BEST, "3000").unwrap();
        assert_eq!(ScoreTracker::load(ScoreMode::HighestTile, &store).best(), 2048);
        assert_eq!(ScoreTracker::load(ScoreMode::Cumulative, &store).best(), 3000);
        store.set(KEY_BEST, "1").unwrap();
        assert_eq!(ScoreTracker::load(ScoreMode::HighestTile, &store).best(), 0);
        store.set(KEY_BEST, "512").unwrap();
        assert_eq!(ScoreTracker::load(ScoreMode::HighestTile, &store).best(), 512);
    }

    #[test]
    fn peak_survives_a_lower_board() {
        let mut t = ScoreTracker::new(ScoreMode::Cumulative, 0);
        t.refresh_top(&Board::from_diagram(&["64 . . .", ". . . .", ". . . .", ". . . 2"]));
        t.refresh_top(&Board::from_diagram(&[". . . .", ". . . .", ". . . .", ". . . 2"]));
        assert_eq!(t.top_tile(), 2);
        assert_eq!(t.peak_tile(), 64);
        t.reset();
        assert_eq!(t.peak_tile(), 0);
    }

    // ── Leaderboard ──

    #[test]
    fn seven_inserts_keep_five_sorted() {
        let mut lb = Leaderboard::default();
        for score in [30, 500, 10, 250, 90, 700, 40] {
            lb.insert(entry(score, 8));
        }
        let scores: Vec<u32> = lb.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, [700, 500, 250, 90, 40]);
    }

    #[test]
    fn ties_on_score_break_on_top_tile() {
        let mut lb = Leaderboard::default();
        lb.insert(entry(100, 16));
        assert_eq!(lb.insert(entry(100, 64)), Some(0));
        assert_eq!(lb.entries()[0].top_tile, 64);
        assert_eq!(lb.entries()[1].top_tile, 16);
    }

    #[test]
    fn insert_reports_rank_or_none() {
        let mut lb = Leaderboard::default();
        for score in [50, 40, 30, 20, 10] {
            lb.insert(entry(score, 4));
        }
        assert_eq!(lb.insert(entry(35, 4)), Some(2));
        assert_eq!(lb.insert(entry(1, 2)), None);
        assert_eq!(lb.entries().len(), LEADERBOARD_SIZE);
        // A full tie goes below the existing entry.
        assert_eq!(lb.insert(entry(50, 4)), Some(1));
    }

    #[test]
    fn round_trips_through_store() {
        let mut store = MemoryStore::new();
        let mut lb = Leaderboard::default();
        lb.insert(LeaderboardEntry { score: 300, top_tile: 128, label: RunLabel::Win, timestamp: 1_700_000_000 });
        lb.insert(entry(20, 8));
        lb.save(&mut store).unwrap();

        let loaded = Leaderboard::load(&store);
        assert_eq!(loaded.entries(), lb.entries());
        assert!(store.get(KEY_LEADERBOARD).unwrap().contains("label = \"win\""));
    }

    #[test]
    fn corrupt_leaderboard_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(KEY_LEADERBOARD, "[[entries]]\nscore = \"many\"").unwrap();
        assert!(Leaderboard::load(&store).entries().is_empty());
        store.set(KEY_LEADERBOARD, "}{").unwrap();
        assert!(Leaderboard::load(&store).entries().is_empty());
    }

    #[test]
    fn oversized_stored_list_is_trimmed_and_sorted() {
        let mut store = MemoryStore::new();
        let mut text = String::new();
        for score in [1, 9, 3, 7, 5, 8, 2] {
            text.push_str(&format!(
                "[[entries]]\nscore = {score}\ntop_tile = 2\nlabel = \"over\"\ntimestamp = 0\n\n"
            ));
        }
        store.set(KEY_LEADERBOARD, &text).unwrap();
        let scores: Vec<u32> = Leaderboard::load(&store).entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, [9, 8, 7, 5, 3]);
    }

    #[test]
    fn best_never_decreases_across_runs() {
        let mut store = MemoryStore::new();
        let mut lb = Leaderboard::default();
        let mut t = ScoreTracker::new(ScoreMode::Cumulative, 0);
        let mut last_best = 0;
        for score in [900, 700, 400, 100] {
            t.reset();
            t.add_gain(score);
            record_run(&mut t, &mut lb, &mut store, RunLabel::Over, 0);
            assert!(t.best() >= last_best);
            last_best = t.best();
        }
        assert_eq!(t.best(), 900);
        assert_eq!(store.get(KEY_BEST).as_deref(), Some("900"));
    }

    #[test]
    fn record_run_persists_the_list() {
        let mut store = MemoryStore::new();
        let mut lb = Leaderboard::default();
        let mut t = ScoreTracker::new(ScoreMode::Cumulative, 0);
        t.add_gain(64);
        assert_eq!(record_run(&mut t, &mut lb, &mut store, RunLabel::Win, 42), Some(0));
        let loaded = Leaderboard::load(&store);
        assert_eq!(loaded.entries().len(), 1);
        assert_eq!(loaded.entries()[0].label, RunLabel::Win);
        assert_eq!(loaded.entries()[0].timestamp, 42);
    }
}
