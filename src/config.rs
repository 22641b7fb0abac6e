/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub spawn: SpawnConfig,
    pub powers: PowerConfig,
    pub display: DisplayConfig,
    /// Extra keyboard bindings: key name → action token.
    pub keys: BTreeMap<String, String>,
    pub gamepad: GamepadConfig,
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// Score is the sum of merge gains since game start.
    #[default]
    Cumulative,
    /// Score is the highest tile value currently on the board.
    HighestTile,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(s: &str) -> Option<Theme> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub win_tile: u32,
    pub score_mode: ScoreMode,
}

#[derive(Clone, Debug)]
pub struct SpawnConfig {
    pub four_chance: f64,
    pub wild_threshold: u32,
    pub wild_chance: f64,     // rolled only when top tile ≥ wild_threshold
    pub doubler_threshold: u32,
    pub doubler_chance: f64,  // rolled only below wild_threshold
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerConfig {
    pub wild: u32,
    pub bomb: u32,
    pub shuffle: u32,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub animation_ms: u64,
    pub theme: Theme,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub wild: Vec<String>,
    pub bomb: Vec<String>,
    pub shuffle: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    spawn: TomlSpawn,
    #[serde(default)]
    powers: TomlPowers,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    keys: BTreeMap<String, String>,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_win_tile")]
    win_tile: u32,
    #[serde(default)]
    score_mode: ScoreMode,
}

#[derive(Deserialize, Debug)]
struct TomlSpawn {
    #[serde(default = "default_four_chance")]
    four_chance: f64,
    #[serde(default = "default_wild_threshold")]
    wild_threshold: u32,
    #[serde(default = "default_wild_chance")]
    wild_chance: f64,
    #[serde(default = "default_doubler_threshold")]
    doubler_threshold: u32,
    #[serde(default = "default_doubler_chance")]
    doubler_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlPowers {
    #[serde(default = "default_wild_uses")]
    wild: u32,
    #[serde(default = "default_bomb_uses")]
    bomb: u32,
    #[serde(default = "default_shuffle_uses")]
    shuffle: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_animation_ms")]
    animation_ms: u64,
    #[serde(default)]
    theme: Theme,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_wild")]
    wild: Vec<String>,
    #[serde(default = "default_pad_bomb")]
    bomb: Vec<String>,
    #[serde(default = "default_pad_shuffle")]
    shuffle: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    data_dir: Option<String>,
}

// ── Defaults ──

fn default_win_tile() -> u32 { 2048 }
fn default_four_chance() -> f64 { 0.1 }
fn default_wild_threshold() -> u32 { 64 }
fn default_wild_chance() -> f64 { 0.12 }
fn default_doubler_threshold() -> u32 { 32 }
fn default_doubler_chance() -> f64 { 0.1 }
fn default_wild_uses() -> u32 { 2 }
fn default_bomb_uses() -> u32 { 1 }
fn default_shuffle_uses() -> u32 { 1 }
fn default_animation_ms() -> u64 { 160 }

fn default_pad_wild() -> Vec<String> { vec!["X".into()] }
fn default_pad_bomb() -> Vec<String> { vec!["Y".into()] }
fn default_pad_shuffle() -> Vec<String> { vec!["B".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules { win_tile: default_win_tile(), score_mode: ScoreMode::default() }
    }
}

impl Default for TomlSpawn {
    fn default() -> Self {
        TomlSpawn {
            four_chance: default_four_chance(),
            wild_threshold: default_wild_threshold(),
            wild_chance: default_wild_chance(),
            doubler_threshold: default_doubler_threshold(),
            doubler_chance: default_doubler_chance(),
        }
    }
}

impl Default for TomlPowers {
    fn default() -> Self {
        TomlPowers {
            wild: default_wild_uses(),
            bomb: default_bomb_uses(),
            shuffle: default_shuffle_uses(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { animation_ms: default_animation_ms(), theme: Theme::default() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            wild: default_pad_wild(),
            bomb: default_pad_bomb(),
            shuffle: default_pad_shuffle(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        TomlSpawn::default().into()
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        TomlPowers::default().into()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl From<TomlSpawn> for SpawnConfig {
    fn from(t: TomlSpawn) -> Self {
        SpawnConfig {
            four_chance: clamp_chance("spawn.four_chance", t.four_chance),
            wild_threshold: t.wild_threshold,
            wild_chance: clamp_chance("spawn.wild_chance", t.wild_chance),
            doubler_threshold: t.doubler_threshold,
            doubler_chance: clamp_chance("spawn.doubler_chance", t.doubler_chance),
        }
    }
}

impl From<TomlPowers> for PowerConfig {
    fn from(t: TomlPowers) -> Self {
        PowerConfig { wild: t.wild, bomb: t.bomb, shuffle: t.shuffle }
    }
}

/// Probabilities outside [0, 1] (or NaN) would panic the sampler.
fn clamp_chance(name: &str, p: f64) -> f64 {
    if (0.0..=1.0).contains(&p) {
        p
    } else {
        log::warn!("config: {name} = {p} is not a probability, clamping");
        if p > 1.0 { 1.0 } else { 0.0 }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        GameConfig::from_toml(load_toml(&candidate_dirs()))
    }

    /// Parse config text directly. Errors fall back to defaults.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                log::warn!("config.toml parse error: {e}; using default settings");
                GameConfig::default()
            }
        }
    }

    fn from_toml(t: TomlConfig) -> Self {
        let win_tile = if t.rules.win_tile == 0 {
            log::warn!("config: rules.win_tile = 0 is invalid, using {}", default_win_tile());
            default_win_tile()
        } else {
            t.rules.win_tile
        };

        GameConfig {
            rules: RulesConfig { win_tile, score_mode: t.rules.score_mode },
            spawn: t.spawn.into(),
            powers: t.powers.into(),
            display: DisplayConfig {
                animation_ms: t.display.animation_ms,
                theme: t.display.theme,
            },
            keys: t.keys,
            gamepad: GamepadConfig {
                wild: t.gamepad.wild,
                bomb: t.gamepad.bomb,
                shuffle: t.gamepad.shuffle,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
            },
            seed: t.general.seed,
            data_dir: t.general.data_dir.map(PathBuf::from),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds the real binary's dir.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                return match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("config loaded from {}", path.display());
                        cfg
                    }
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        TomlConfig::default()
                    }
                };
            }
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}
