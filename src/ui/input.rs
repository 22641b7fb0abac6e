/// Keyboard input: edge-triggered key presses mapped to commands.
///
/// A slide fires once per physical press. Holding a key does not repeat:
/// a key counts as held until a Release event arrives (when the terminal
/// reports them) or until HOLD_TIMEOUT passes without a Press/Repeat.
///
/// Default bindings:
///   ←→↑↓ / WASD / HJKL   slide
///   1 2 3                wild, bomb, shuffle
///   R                    restart
///   T                    toggle theme
///   Q / Esc / Ctrl-C     quit
///
/// `[keys]` in config.toml adds or overrides bindings: `"x" = "bomb"`.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::action::Action;
use crate::sim::power::PowerKind;
use crate::sim::step::Direction;

/// After this long without a Press/Repeat event, the key counts as released.
/// Only used when the terminal does not report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Anything a key can trigger: a game action or a host command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Play(Action),
    ToggleTheme,
    Quit,
}

impl Command {
    /// Parse a binding target: any action token, plus `theme` and `quit`.
    pub fn parse(token: &str) -> Option<Command> {
        match token.trim().to_ascii_lowercase().as_str() {
            "theme" => Some(Command::ToggleTheme),
            "quit" => Some(Command::Quit),
            other => other.parse::<Action>().ok().map(Command::Play),
        }
    }
}

// ── Key map ──

pub struct KeyMap {
    bindings: HashMap<KeyCode, Command>,
}

impl KeyMap {
    pub fn new(extra: &BTreeMap<String, String>) -> Self {
        let mut bindings = HashMap::with_capacity(32);
        let slide = |d| Command::Play(Action::Slide(d));

        for (code, dir) in [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Down, Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::Right, Direction::Right),
        ] {
            bindings.insert(code, slide(dir));
        }
        for (keys, dir) in [
            (['w', 'k'], Direction::Up),
            (['s', 'j'], Direction::Down),
            (['a', 'h'], Direction::Left),
            (['d', 'l'], Direction::Right),
        ] {
            for c in keys {
                bind_char(&mut bindings, c, slide(dir));
            }
        }
        bind_char(&mut bindings, '1', Command::Play(Action::Power(PowerKind::Wild)));
        bind_char(&mut bindings, '2', Command::Play(Action::Power(PowerKind::Bomb)));
        bind_char(&mut bindings, '3', Command::Play(Action::Power(PowerKind::Shuffle)));
        bind_char(&mut bindings, 'r', Command::Play(Action::Restart));
        bind_char(&mut bindings, 't', Command::ToggleTheme);
        bind_char(&mut bindings, 'q', Command::Quit);
        bindings.insert(KeyCode::Esc, Command::Quit);

        for (key, target) in extra {
            match (parse_key_name(key), Command::parse(target)) {
                (Some(code), Some(cmd)) => {
                    bindings.insert(code, cmd);
                }
                _ => log::warn!("config: ignoring key binding {key:?} = {target:?}"),
            }
        }

        KeyMap { bindings }
    }

    pub fn lookup(&self, code: KeyCode) -> Option<Command> {
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        self.bindings.get(&code).copied()
    }
}

/// Letters bind case-insensitively (lookup lowercases).
fn bind_char(bindings: &mut HashMap<KeyCode, Command>, c: char, cmd: Command) {
    bindings.insert(KeyCode::Char(c.to_ascii_lowercase()), cmd);
}

/// Key names accepted in `[keys]`: a single character, or one of
/// up/down/left/right/enter/space/tab/backspace/esc/f1..f12.
fn parse_key_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }
    let lower = name.trim().to_ascii_lowercase();
    let code = match lower.as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "esc" | "escape" => KeyCode::Esc,
        f if f.starts_with('f') => {
            let n: u8 = f[1..].parse().ok()?;
            if !(1..=12).contains(&n) { return None; }
            KeyCode::F(n)
        }
        _ => return None,
    };
    Some(code)
}

// ── Input state ──

pub struct InputState {
    /// Timestamp of the last Press/Repeat for each held key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,
    /// Raw key events from the last drain, for Ctrl-C.
    raw_events: Vec<KeyEvent>,
    /// Honor Release events. Only true when keyboard enhancement is confirmed.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Without enhancement, rely on the timeout instead.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self
                    .last_active
                    .get(&key.code)
                    .map_or(false, |t| now.duration_since(*t) < HOLD_TIMEOUT);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Commands freshly triggered this frame, in press order.
    pub fn commands(&self, keymap: &KeyMap) -> Vec<Command> {
        let mut out: Vec<Command> = self.fresh_presses.iter().filter_map(|&c| keymap.lookup(c)).collect();
        if self.ctrl_c_pressed() {
            out.push(Command::Quit);
        }
        out
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}
