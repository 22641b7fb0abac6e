/// GameSession: one player's running game plus everything that outlives it.
///
/// The host loop owns exactly one session and feeds it `Action`s.
/// Every entry point returns the events it produced; a rejected or
/// ineffective action returns an empty list and changes nothing.
///
/// ## Action pipeline
///
///   can_act? ──no──▶ []
///      │
///   resolve on the board (slide: on a scratch copy first)
///      │ nothing happened ──▶ []
///      ▼
///   Animating → score / top tile / spawn → best
///      ▼
///   evaluate: win (once per game) ▸ over ▸ idle
///
/// Restart is always accepted. The tile factory survives restarts, so
/// tile ids stay unique for the whole process.

use rand::RngCore;

use crate::config::{GameConfig, PowerConfig, RulesConfig};
use crate::domain::board::Board;
use crate::domain::rules;
use crate::domain::spawn::TileFactory;
use crate::domain::tile::TileId;
use super::action::Action;
use super::event::{GameEvent, MoveEvent};
use super::phase::{GameState, GameStateMachine};
use super::power::{self, PowerInventory, PowerKind};
use super::save::KeyValueStore;
use super::score::{self, Leaderboard, LeaderboardEntry, RunLabel, ScoreTracker};
use super::snapshot::{Notice, Snapshot, TileView};
use super::step::{self, Direction};

pub struct GameSession {
    rules: RulesConfig,
    power_defaults: PowerConfig,

    board: Board,
    factory: TileFactory,
    machine: GameStateMachine,
    tracker: ScoreTracker,
    leaderboard: Leaderboard,
    powers: PowerInventory,
    /// Set by the first win of a game; cleared on restart.
    win_announced: bool,

    // ── Last-action view for the renderer ──
    last_moves: Vec<MoveEvent>,
    last_spawned: Option<TileId>,
    notice: Option<Notice>,

    rng: Box<dyn RngCore>,
    store: Box<dyn KeyValueStore>,
}

impl GameSession {
    /// Load best score and leaderboard from `store`, then start a game.
    pub fn new(config: &GameConfig, store: Box<dyn KeyValueStore>, rng: Box<dyn RngCore>) -> Self {
        let tracker = ScoreTracker::load(config.rules.score_mode, &*store);
        let leaderboard = Leaderboard::load(&*store);
        let mut session = GameSession {
            rules: config.rules.clone(),
            power_defaults: config.powers,
            board: Board::new(),
            factory: TileFactory::new(config.spawn.clone()),
            machine: GameStateMachine::new(),
            tracker,
            leaderboard,
            powers: PowerInventory::new(config.powers),
            win_announced: false,
            last_moves: Vec::new(),
            last_spawned: None,
            notice: None,
            rng,
            store,
        };
        session.start_game();
        session
    }

    // ── Accessors ──

    #[allow(dead_code)]
    pub fn board(&self) -> &Board { &self.board }
    #[allow(dead_code)]
    pub fn state(&self) -> GameState { self.machine.state() }
    #[allow(dead_code)]
    pub fn can_act(&self) -> bool { self.machine.can_act() }
    pub fn score(&self) -> u32 { self.tracker.score() }
    pub fn best(&self) -> u32 { self.tracker.best() }
    #[allow(dead_code)]
    pub fn top_tile(&self) -> u32 { self.tracker.top_tile() }
    #[allow(dead_code)]
    pub fn powers(&self) -> &PowerInventory { &self.powers }
    #[allow(dead_code)]
    pub fn leaderboard(&self) -> &[LeaderboardEntry] { self.leaderboard.entries() }

    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    /// The host persists its own preferences (theme) through the same store.
    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        &mut *self.store
    }

    // ══════════════════════════════════════════════════════════════
    // Actions
    // ══════════════════════════════════════════════════════════════

    pub fn handle(&mut self, action: Action) -> Vec<GameEvent> {
        match action {
            Action::Slide(dir) => self.slide(dir),
            Action::Power(kind) => self.use_power(kind),
            Action::Restart => self.restart(),
        }
    }

    pub fn restart(&mut self) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::Restarted];
        events.extend(self.start_game());
        events
    }

    pub fn slide(&mut self, dir: Direction) -> Vec<GameEvent> {
        if !self.machine.can_act() {
            log::debug!("slide {dir:?} rejected in state {}", self.machine.state().label());
            return Vec::new();
        }

        let mut next = self.board.clone();
        let outcome = step::apply_move(&mut next, dir);
        if !outcome.moved {
            log::debug!("slide {dir:?} moved nothing");
            return Vec::new();
        }
        self.board = next;
        self.begin_action();

        let mut events: Vec<GameEvent> = outcome.events.iter().copied().map(GameEvent::Move).collect();
        self.last_moves = outcome.events;

        let before = self.tracker.score();
        self.tracker.add_gain(outcome.gained);
        self.tracker.refresh_top(&self.board);

        if let Some(tile) = self.factory.spawn(&mut self.board, self.tracker.peak_tile(), None, &mut *self.rng) {
            self.last_spawned = Some(tile.id);
            events.push(GameEvent::Spawned { id: tile.id, pos: tile.pos(), value: tile.value, variant: tile.variant });
            self.tracker.refresh_top(&self.board);
        }

        self.settle(before, &mut events);
        events
    }

    pub fn use_power(&mut self, kind: PowerKind) -> Vec<GameEvent> {
        if !self.machine.can_act() {
            log::debug!("{kind} rejected in state {}", self.machine.state().label());
            return Vec::new();
        }
        if self.powers.remaining(kind) == 0 {
            log::debug!("{kind} has no uses left");
            return Vec::new();
        }

        let peak = self.tracker.peak_tile();
        let mut spawned = None;
        let effect = match kind {
            PowerKind::Wild => power::spawn_wild(&mut self.board, &mut self.factory, peak, &mut *self.rng).map(|t| {
                spawned = Some(t.id);
                GameEvent::Spawned { id: t.id, pos: t.pos(), value: t.value, variant: t.variant }
            }),
            PowerKind::Bomb => power::bomb_highest(&mut self.board)
                .map(|(center, removed)| GameEvent::Bombed { center, removed }),
            PowerKind::Shuffle => power::shuffle(&mut self.board, &mut *self.rng)
                .map(|tiles| GameEvent::Shuffled { tiles }),
        };
        let Some(effect) = effect else {
            log::debug!("{kind} had nothing to act on");
            return Vec::new();
        };

        self.begin_action();
        self.board.clear_merged_flags();
        self.last_spawned = spawned;
        self.powers.consume(kind);
        let remaining = self.powers.remaining(kind);
        log::info!("power {kind} used, {remaining} left");

        let mut events = vec![effect, GameEvent::PowerUsed { kind, remaining }];
        let before = self.tracker.score();
        self.tracker.refresh_top(&self.board);
        self.settle(before, &mut events);
        events
    }

    // ── Snapshot ──

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tiles: self.board.tiles().map(TileView::from).collect(),
            moves: self.last_moves.clone(),
            spawned: self.last_spawned,
            score: self.tracker.score(),
            best: self.tracker.best(),
            top_tile: self.tracker.top_tile(),
            state: self.machine.state(),
            powers: self.powers.counts(),
            notice: self.notice,
            leaderboard: self.leaderboard.entries().to_vec(),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Internals
    // ══════════════════════════════════════════════════════════════

    fn start_game(&mut self) -> Vec<GameEvent> {
        self.board = Board::new();
        self.machine = GameStateMachine::new();
        self.tracker.reset();
        self.powers = PowerInventory::new(self.power_defaults);
        self.win_announced = false;
        self.last_moves.clear();
        self.last_spawned = None;
        self.notice = None;

        let mut events = Vec::with_capacity(2);
        for _ in 0..2 {
            if let Some(t) = self.factory.spawn(&mut self.board, 0, None, &mut *self.rng) {
                events.push(GameEvent::Spawned { id: t.id, pos: t.pos(), value: t.value, variant: t.variant });
            }
        }
        self.tracker.refresh_top(&self.board);
        log::info!("new game (best {})", self.tracker.best());
        events
    }

    fn begin_action(&mut self) {
        self.machine.transition(GameState::Animating);
        self.last_moves.clear();
        self.last_spawned = None;
        self.notice = None;
    }

    /// Score bookkeeping shared by slides and powers, then evaluation.
    fn settle(&mut self, score_before: u32, events: &mut Vec<GameEvent>) {
        let score = self.tracker.score();
        if score > score_before {
            events.push(GameEvent::ScoreGained(score - score_before));
        }
        if let Some(best) = self.tracker.update_best(&mut *self.store) {
            log::info!("new best score {best}");
            events.push(GameEvent::NewBest(best));
        }
        self.evaluate(events);
    }

    /// Win beats over; otherwise back to idle.
    fn evaluate(&mut self, events: &mut Vec<GameEvent>) {
        let score = self.tracker.score();
        let top_tile = self.tracker.top_tile();

        if top_tile >= self.rules.win_tile && !self.win_announced {
            self.win_announced = true;
            self.machine.transition(GameState::Won);
            self.notice = Some(Notice::Won { score, top_tile });
            log::info!("won: score {score}, top tile {top_tile}");
            events.push(GameEvent::Won { score, top_tile });
            self.record(RunLabel::Win, events);
        } else if rules::is_game_over(&self.board) {
            self.machine.transition(GameState::Over);
            self.notice = Some(Notice::Over { score, top_tile });
            log::info!("game over: score {score}, top tile {top_tile}");
            events.push(GameEvent::GameOver { score, top_tile });
            self.record(RunLabel::Over, events);
        } else {
            self.machine.transition(GameState::Idle);
        }
    }

    fn record(&mut self, label: RunLabel, events: &mut Vec<GameEvent>) {
        let rank = score::record_run(
            &mut self.tracker,
            &mut self.leaderboard,
            &mut *self.store,
            label,
            score::unix_now(),
        );
        events.push(GameEvent::RunRecorded { label, rank });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreMode;
    use crate::domain::tile::{Pos, Variant};
    use crate::sim::save::{MemoryStore, KEY_BEST, KEY_LEADERBOARD};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_config() -> GameConfig {
        let mut cfg = GameConfig::default();
        cfg.spawn.wild_chance = 0.0;
        cfg.spawn.doubler_chance = 0.0;
        cfg
    }

    fn session_with(cfg: &GameConfig, store: MemoryStore) -> GameSession {
        GameSession::new(cfg, Box::new(store), Box::new(StdRng::seed_from_u64(7)))
    }

    fn session() -> GameSession {
        session_with(&quiet_config(), MemoryStore::new())
    }

    impl GameSession {
        fn install(&mut self, diagram: &[&str]) {
            self.board = Board::from_diagram(diagram);
            let max_id = self.board.tiles().map(|t| t.id).max().unwrap_or(0);
            self.factory.reserve_through(max_id);
            self.tracker.refresh_top(&self.board);
        }

        fn force_state(&mut self, state: GameState) {
            self.machine = GameStateMachine::new();
            if state != GameState::Idle {
                assert!(self.machine.transition(state));
            }
        }
    }

    fn has(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> bool {
        events.iter().any(pred)
    }

    /// Sliding Right fills (0,0) with a fresh 2 or 4 and nothing can merge.
    const ONE_MOVE_FROM_OVER: [&str; 4] = [
        "8 16 32 .",
        "64 128 256 512",
        "2 4 2 4",
        "4 2 4 2",
    ];

    // ── Start / restart ──

    #[test]
    fn new_game_has_two_tiles_and_default_powers() {
        let s = session();
        assert_eq!(s.board().tile_count(), 2);
        assert_eq!(s.state(), GameState::Idle);
        assert_eq!(s.score(), 0);
        assert_eq!(s.powers().counts(), [(PowerKind::Wild, 2), (PowerKind::Bomb, 1), (PowerKind::Shuffle, 1)]);
    }

    #[test]
    fn best_and_leaderboard_load_from_store() {
        let mut store = MemoryStore::new();
        store.set(KEY_BEST, "500").unwrap();
        store
            .set(KEY_LEADERBOARD, "[[entries]]\nscore = 500\ntop_tile = 64\nlabel = \"over\"\ntimestamp = 1\n")
            .unwrap();
        let s = session_with(&quiet_config(), store);
        assert_eq!(s.best(), 500);
        assert_eq!(s.leaderboard().len(), 1);
    }

    #[test]
    fn restart_resets_game_but_never_reuses_ids() {
        let mut s = session();
        s.install(&["2 2 . .", ". . . .", ". . . .", ". . . ."]);
        s.slide(Direction::Left);
        s.use_power(PowerKind::Bomb);
        let next_id = s.factory.peek_id();

        let events = s.handle(Action::Restart);
        assert_eq!(events.first(), Some(&GameEvent::Restarted));
        assert_eq!(s.board().tile_count(), 2);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best(), 4);
        assert_eq!(s.powers().remaining(PowerKind::Bomb), 1);
        assert!(s.board().tiles().all(|t| t.id >= next_id));
    }

    // ── Slides ──

    #[test]
    fn ineffective_slide_changes_nothing() {
        let mut s = session();
        s.install(&["2 4 . .", "8 . . .", ". . . .", ". . . ."]);
        let before = s.board().clone();
        assert!(s.slide(Direction::Left).is_empty());
        assert!(s.slide(Direction::Up).is_empty());
        assert_eq!(s.board(), &before);
        assert_eq!(s.state(), GameState::Idle);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn effective_slide_scores_spawns_and_returns_to_idle() {
        let mut s = session();
        s.install(&["2 2 . .", ". . . .", ". . . .", ". . . ."]);
        let events = s.handle(Action::Slide(Direction::Left));

        assert_eq!(s.board().tile_count(), 2);
        assert_eq!(s.board().get(Pos::new(0, 0)).map(|t| t.value), Some(4));
        assert_eq!(s.score(), 4);
        assert_eq!(s.best(), 4);
        assert_eq!(s.store().get(KEY_BEST).as_deref(), Some("4"));
        assert_eq!(s.state(), GameState::Idle);
        assert!(has(&events, |e| matches!(e, GameEvent::Move(MoveEvent::Merged { value: 4, .. }))));
        assert!(has(&events, |e| matches!(e, GameEvent::Spawned { .. })));
        assert!(has(&events, |e| *e == GameEvent::ScoreGained(4)));
        assert!(has(&events, |e| *e == GameEvent::NewBest(4)));
    }

    #[test]
    fn slide_rejected_while_animating_or_over() {
        let mut s = session();
        s.install(&["2 2 . .", ". . . .", ". . . .", ". . . ."]);
        let before = s.board().clone();
        s.force_state(GameState::Animating);
        assert!(s.slide(Direction::Left).is_empty());
        s.force_state(GameState::Over);
        assert!(s.slide(Direction::Left).is_empty());
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn filling_the_board_ends_the_game_once() {
        let mut s = session();
        s.install(&ONE_MOVE_FROM_OVER);
        let events = s.slide(Direction::Right);

        assert_eq!(s.state(), GameState::Over);
        assert!(!s.can_act());
        assert!(has(&events, |e| matches!(e, GameEvent::GameOver { top_tile: 512, .. })));
        assert!(has(&events, |e| *e == GameEvent::RunRecorded { label: RunLabel::Over, rank: Some(0) }));
        assert_eq!(s.leaderboard().len(), 1);
        assert_eq!(s.leaderboard()[0].label, RunLabel::Over);
        assert!(matches!(s.snapshot().notice, Some(Notice::Over { .. })));

        // Nothing is accepted until restart.
        assert!(s.slide(Direction::Left).is_empty());
        assert!(s.use_power(PowerKind::Bomb).is_empty());
        assert_eq!(s.powers().remaining(PowerKind::Bomb), 1);
        assert_eq!(s.leaderboard().len(), 1);

        s.restart();
        assert_eq!(s.state(), GameState::Idle);
        assert_eq!(s.leaderboard().len(), 1);
    }

    #[test]
    fn win_is_announced_once_and_play_continues() {
        let mut cfg = quiet_config();
        cfg.rules.win_tile = 16;
        let mut s = session_with(&cfg, MemoryStore::new());
        s.install(&["8 8 . .", ". . . .", ". . . .", ". . . ."]);

        let events = s.slide(Direction::Left);
        assert_eq!(s.state(), GameState::Won);
        assert!(s.can_act());
        assert!(has(&events, |e| matches!(e, GameEvent::Won { top_tile: 16, .. })));
        assert!(has(&events, |e| *e == GameEvent::RunRecorded { label: RunLabel::Win, rank: Some(0) }));
        assert!(matches!(s.snapshot().notice, Some(Notice::Won { .. })));

        let events = s.slide(Direction::Right);
        assert!(!events.is_empty());
        assert!(!has(&events, |e| matches!(e, GameEvent::Won { .. })));
        assert_eq!(s.state(), GameState::Idle);
        assert_eq!(s.snapshot().notice, None);
        assert_eq!(s.leaderboard().len(), 1);
    }

    #[test]
    fn stuck_board_after_a_win_still_ends_the_game() {
        let mut cfg = quiet_config();
        cfg.rules.win_tile = 16;
        let mut s = session_with(&cfg, MemoryStore::new());
        s.install(&["8 8 . .", ". . . .", ". . . .", ". . . ."]);
        s.slide(Direction::Left);
        assert_eq!(s.state(), GameState::Won);

        s.install(&ONE_MOVE_FROM_OVER);
        let events = s.slide(Direction::Right);
        assert_eq!(s.state(), GameState::Over);
        assert!(!has(&events, |e| matches!(e, GameEvent::Won { .. })));
        assert!(has(&events, |e| matches!(e, GameEvent::GameOver { top_tile: 512, .. })));
        assert_eq!(s.leaderboard().len(), 2);
        assert!(s.leaderboard().iter().any(|e| e.label == RunLabel::Win));
        assert!(s.leaderboard().iter().any(|e| e.label == RunLabel::Over));
    }

    #[test]
    fn win_takes_priority_over_game_over() {
        let mut cfg = quiet_config();
        cfg.rules.win_tile = 512;
        let mut s = session_with(&cfg, MemoryStore::new());
        s.install(&ONE_MOVE_FROM_OVER);
        let events = s.slide(Direction::Right);
        assert_eq!(s.state(), GameState::Won);
        assert!(!has(&events, |e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn highest_tile_mode_scores_the_top_tile() {
        let mut cfg = quiet_config();
        cfg.rules.score_mode = ScoreMode::HighestTile;
        let mut s = session_with(&cfg, MemoryStore::new());
        s.install(&["32 32 . .", ". . . .", ". . . .", ". . . ."]);
        s.slide(Direction::Left);
        assert_eq!(s.score(), 64);
        assert_eq!(s.best(), 64);
    }

    // ── Powers ──

    #[test]
    fn bomb_consumes_a_use_and_then_refuses() {
        let mut s = session();
        s.install(&["2 . . .", ". 64 . .", ". . . .", ". . . 4"]);
        let events = s.use_power(PowerKind::Bomb);
        assert!(has(&events, |e| *e == GameEvent::PowerUsed { kind: PowerKind::Bomb, remaining: 0 }));
        assert!(has(&events, |e| matches!(e, GameEvent::Bombed { center, removed } if *center == Pos::new(1, 1) && removed.len() == 2)));
        assert_eq!(s.board().tile_count(), 1);
        assert_eq!(s.top_tile(), 4);
        assert_eq!(s.state(), GameState::Idle);

        let before = s.board().clone();
        assert!(s.use_power(PowerKind::Bomb).is_empty());
        assert_eq!(s.board(), &before);
        assert_eq!(s.powers().remaining(PowerKind::Bomb), 0);
    }

    #[test]
    fn powers_never_add_score() {
        let mut s = session();
        s.install(&["2 2 . .", ". . . .", ". . . .", ". . . ."]);
        s.slide(Direction::Left);
        let score = s.score();
        s.use_power(PowerKind::Shuffle);
        s.use_power(PowerKind::Wild);
        s.use_power(PowerKind::Bomb);
        assert_eq!(s.score(), score);
    }

    #[test]
    fn wild_power_places_a_wild_tile() {
        let mut s = session();
        let count = s.board().tile_count();
        let events = s.handle(Action::Power(PowerKind::Wild));
        assert_eq!(s.board().tile_count(), count + 1);
        assert_eq!(s.powers().remaining(PowerKind::Wild), 1);
        let snap = s.snapshot();
        let spawned = snap.spawned.and_then(|id| snap.tiles.iter().find(|t| t.id == id));
        assert_eq!(spawned.map(|t| t.variant), Some(Variant::Wild));
        assert!(has(&events, |e| matches!(e, GameEvent::Spawned { variant: Variant::Wild, .. })));
    }

    #[test]
    fn wild_power_on_full_board_keeps_its_use() {
        let mut s = session();
        s.install(&["2 4 2 4", "4 2 4 2", "2 4 2 4", "4 2 4 2"]);
        assert!(s.use_power(PowerKind::Wild).is_empty());
        assert_eq!(s.powers().remaining(PowerKind::Wild), 2);
        assert_eq!(s.state(), GameState::Idle);
    }

    #[test]
    fn shuffle_keeps_every_tile() {
        let mut s = session();
        s.install(&["2 4 8 .", ". . . 16", ". w2 . .", ". . . ."]);
        let mut ids: Vec<TileId> = s.board().tiles().map(|t| t.id).collect();
        let events = s.use_power(PowerKind::Shuffle);
        assert!(has(&events, |e| *e == GameEvent::Shuffled { tiles: 5 }));
        let mut after: Vec<TileId> = s.board().tiles().map(|t| t.id).collect();
        ids.sort_unstable();
        after.sort_unstable();
        assert_eq!(ids, after);
    }

    #[test]
    fn shuffle_that_separates_the_last_pair_ends_the_game() {
        // Full board whose only merge is the pair of 2s.
        const LAST_PAIR: [&str; 4] = [
            "2 2 4 8",
            "16 32 64 128",
            "256 512 1024 2048",
            "4096 8192 16384 32768",
        ];
        let mut cfg = quiet_config();
        cfg.rules.win_tile = 65536;

        let mut overs = 0;
        for seed in 0..32 {
            let mut s = GameSession::new(&cfg, Box::new(MemoryStore::new()), Box::new(StdRng::seed_from_u64(seed)));
            s.install(&LAST_PAIR);
            assert!(!rules::is_game_over(s.board()));

            let events = s.use_power(PowerKind::Shuffle);
            assert!(has(&events, |e| *e == GameEvent::Shuffled { tiles: 16 }));
            if rules::is_game_over(s.board()) {
                overs += 1;
                assert_eq!(s.state(), GameState::Over);
                assert!(has(&events, |e| matches!(e, GameEvent::GameOver { top_tile: 32768, .. })));
                assert!(has(&events, |e| *e == GameEvent::RunRecorded { label: RunLabel::Over, rank: Some(0) }));
                assert_eq!(s.leaderboard()[0].label, RunLabel::Over);
            } else {
                assert_eq!(s.state(), GameState::Idle);
                assert!(s.leaderboard().is_empty());
            }
        }
        assert!(overs > 0);
    }

    #[test]
    fn spawn_policy_follows_the_peak_after_a_bomb() {
        let mut cfg = quiet_config();
        cfg.spawn.wild_chance = 1.0;
        let mut s = session_with(&cfg, MemoryStore::new());
        s.install(&["64 . . .", ". . . .", ". . . .", ". . . 2"]);
        s.use_power(PowerKind::Bomb);
        assert_eq!(s.top_tile(), 2);

        let events = s.slide(Direction::Left);
        assert!(has(&events, |e| matches!(e, GameEvent::Spawned { variant: Variant::Wild, .. })));

        s.restart();
        s.install(&[". . . .", ". . . .", ". . . .", ". . . 2"]);
        let events = s.slide(Direction::Left);
        assert!(has(&events, |e| matches!(e, GameEvent::Spawned { variant: Variant::Normal, .. })));
    }

    #[test]
    fn powers_rejected_when_acting_is_disallowed() {
        let mut s = session();
        s.force_state(GameState::Animating);
        for kind in PowerKind::ALL {
            assert!(s.use_power(kind).is_empty());
        }
        assert_eq!(s.powers().counts(), PowerInventory::new(PowerConfig::default()).counts());
    }

    #[test]
    fn zero_configured_uses_is_a_no_op() {
        let mut cfg = quiet_config();
        cfg.powers = PowerConfig { wild: 0, bomb: 0, shuffle: 0 };
        let mut s = session_with(&cfg, MemoryStore::new());
        for kind in PowerKind::ALL {
            assert!(s.use_power(kind).is_empty());
        }
        assert_eq!(s.state(), GameState::Idle);
    }

    // ── Snapshot ──

    #[test]
    fn snapshot_mirrors_the_session() {
        let mut s = session();
        s.install(&["2 2 . .", ". . . .", ". . . .", ". . . 8"]);
        s.slide(Direction::Left);
        let snap = s.snapshot();
        assert_eq!(snap.tiles.len(), s.board().tile_count());
        assert_eq!(snap.score, 4);
        assert_eq!(snap.top_tile, 8);
        assert_eq!(snap.state, GameState::Idle);
        assert!(!snap.moves.is_empty());
        assert!(snap.spawned.is_some());
        assert!(snap.tile_at(Pos::new(0, 0)).map_or(false, |t| t.merged && t.value == 4));

        // A power clears the slide view.
        s.use_power(PowerKind::Shuffle);
        assert!(s.snapshot().moves.is_empty());
        assert!(s.snapshot().tiles.iter().all(|t| !t.merged));
    }
}
