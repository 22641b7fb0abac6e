/// Gamepad input tracker using gilrs (feature "gamepad").
///
/// Everything here is edge-triggered: one press, one command.
/// Default mapping (overridable in `[gamepad]`):
///   D-pad / Left Stick  →  Slide
///   X                   →  Wild
///   Y                   →  Bomb
///   B                   →  Shuffle
///   Start               →  Restart
///   Select              →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::action::Action;
use crate::sim::power::PowerKind;
use crate::sim::step::Direction;
use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Which buttons trigger which command, in priority order.
struct ButtonMap {
    entries: Vec<(Command, Vec<Btn>)>,
}

impl ButtonMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        ButtonMap {
            entries: vec![
                (Command::Play(Action::Power(PowerKind::Wild)), parse_list(&cfg.wild)),
                (Command::Play(Action::Power(PowerKind::Bomb)), parse_list(&cfg.bomb)),
                (Command::Play(Action::Power(PowerKind::Shuffle)), parse_list(&cfg.shuffle)),
                (Command::Play(Action::Restart), parse_list(&cfg.restart)),
                (Command::Quit, parse_list(&cfg.quit)),
            ],
        }
    }
}

fn dir_index(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    map: ButtonMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            map: ButtonMap::from_config(cfg),
            connected,
        }
    }

    /// Call once per frame, before `commands()`.
    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => {
                    self.connected = true;
                    log::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.derive_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let dir = match btn {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.dpad[dir_index(dir)].set(held);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.buttons[b as usize].set(held);
        }
    }

    /// Stick → four digital directions. Only the dominant axis counts,
    /// so a diagonal push slides one way.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn derive_stick(&mut self) {
        let (x, y) = (self.stick_x, self.stick_y);
        let active = if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
            None
        } else if x.abs() >= y.abs() {
            Some(if x < 0.0 { Direction::Left } else { Direction::Right })
        } else {
            // gilrs: positive Y is up.
            Some(if y > 0.0 { Direction::Up } else { Direction::Down })
        };
        for dir in Direction::ALL {
            self.stick[dir_index(dir)].set(active == Some(dir));
        }
    }

    /// Commands freshly triggered this frame.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = Vec::new();
        for dir in Direction::ALL {
            let i = dir_index(dir);
            if self.dpad[i].just_pressed || self.stick[i].just_pressed {
                out.push(Command::Play(Action::Slide(dir)));
            }
        }
        for (cmd, btns) in &self.map.entries {
            if btns.iter().any(|&b| self.buttons[b as usize].just_pressed) {
                out.push(*cmd);
            }
        }
        out
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for s in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            s.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for s in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *s = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
