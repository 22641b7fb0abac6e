/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use config::{GameConfig, Theme};
use sim::save::{self, FileStore, KeyValueStore, MemoryStore, KEY_THEME};
use sim::session::GameSession;
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState, KeyMap};
use ui::renderer::Renderer;
use ui::sound::{cues, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(16);
const LOG_FILE: &str = "wild2048.log";

fn main() -> Result<()> {
    init_logging(&save::data_dir(None));

    let config = GameConfig::load();
    let dir = save::data_dir(config.data_dir.as_deref());
    let store: Box<dyn KeyValueStore> = match FileStore::open(&dir) {
        Ok(s) => {
            log::info!("persisting to {}", s.path().display());
            Box::new(s)
        }
        Err(e) => {
            log::warn!("{e}; scores will not be saved this session");
            Box::new(MemoryStore::new())
        }
    };
    let rng: Box<dyn RngCore> = match config.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    };

    let mut session = GameSession::new(&config, store, rng);
    let mut theme = session
        .store()
        .get(KEY_THEME)
        .and_then(|s| Theme::parse(&s))
        .unwrap_or(config.display.theme);

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let sound = SoundEngine::new();
    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config, &mut theme);

    let cleanup = renderer.cleanup().context("terminal cleanup failed");
    result?;
    cleanup?;

    println!();
    println!("Thanks for playing Wild 2048!");
    println!("Score: {}   Best: {}", session.score(), session.best());
    Ok(())
}

/// Log to a file: stderr would tear the alternate screen.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(dir: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)) {
        Ok(f) => f,
        Err(_) => return,
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    theme: &mut Theme,
) -> Result<()> {
    let keymap = KeyMap::new(&config.keys);
    let mut kb = InputState::new();
    kb.honor_release = renderer.enable_key_release();
    let mut gp = GamepadState::new(&config.gamepad);

    let highlight_for = Duration::from_millis(config.display.animation_ms);
    let mut last_action: Option<Instant> = None;

    loop {
        kb.drain_events();
        gp.update();

        for cmd in kb.commands(&keymap).into_iter().chain(gp.commands()) {
            match cmd {
                Command::Quit => return Ok(()),
                Command::ToggleTheme => {
                    *theme = theme.toggled();
                    if let Err(e) = session.store_mut().set(KEY_THEME, theme.as_str()) {
                        log::warn!("could not persist theme: {e}");
                    }
                }
                Command::Play(action) => {
                    let events = session.handle(action);
                    if events.is_empty() {
                        continue;
                    }
                    last_action = Some(Instant::now());
                    if let Some(sfx) = sound {
                        for cue in cues(&events) {
                            sfx.play(cue);
                        }
                    }
                }
            }
        }

        let highlight = last_action.map_or(false, |t| t.elapsed() < highlight_for);
        renderer.render(&session.snapshot(), *theme, highlight)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}
