/// Logical input tokens. Devices map raw events onto these;
/// the session only ever sees an `Action`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::power::PowerKind;
use super::step::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Slide(Direction),
    Power(PowerKind),
    Restart,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized action token {0:?}")]
pub struct UnknownAction(pub String);

impl Direction {
    pub fn token(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl Action {
    pub fn token(self) -> &'static str {
        match self {
            Action::Slide(d) => d.token(),
            Action::Power(k) => k.token(),
            Action::Restart => "restart",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tok = s.trim();
        if let Some(dir) = Direction::ALL.into_iter().find(|d| d.token().eq_ignore_ascii_case(tok)) {
            return Ok(Action::Slide(dir));
        }
        if let Ok(kind) = tok.parse::<PowerKind>() {
            return Ok(Action::Power(kind));
        }
        if tok.eq_ignore_ascii_case("restart") {
            return Ok(Action::Restart);
        }
        Err(UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_parses() {
        let cases = [
            ("up", Action::Slide(Direction::Up)),
            ("down", Action::Slide(Direction::Down)),
            ("left", Action::Slide(Direction::Left)),
            ("right", Action::Slide(Direction::Right)),
            ("wild", Action::Power(PowerKind::Wild)),
            ("bomb", Action::Power(PowerKind::Bomb)),
            ("shuffle", Action::Power(PowerKind::Shuffle)),
            ("restart", Action::Restart),
        ];
        for (tok, action) in cases {
            assert_eq!(tok.parse::<Action>(), Ok(action));
            assert_eq!(action.to_string(), tok);
        }
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!("  LEFT ".parse::<Action>(), Ok(Action::Slide(Direction::Left)));
        assert_eq!("Restart".parse::<Action>(), Ok(Action::Restart));
    }

    #[test]
    fn unknown_tokens_are_errors() {
        assert_eq!("jump".parse::<Action>(), Err(UnknownAction("jump".into())));
        assert!("".parse::<Action>().is_err());
    }
}
