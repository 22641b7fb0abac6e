/// Game lifecycle state machine.
///
/// ## Transition Table
/// ┌────────────┬──────────────────────────────┐
/// │ From        │ Allowed next                  │
/// ├────────────┼──────────────────────────────┤
/// │ Idle        │ Animating, Over, Won          │
/// │ Animating   │ Idle, Over, Won               │
/// │ Over        │ Idle  (restart only)          │
/// │ Won         │ Idle, Animating               │
/// └────────────┴──────────────────────────────┘
///
/// Any other request is ignored: no error, no state change.
/// Won is a one-time alert, not a terminal; play continues from it.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GameState {
    #[default]
    Idle,
    Animating,
    Over,
    Won,
}

impl GameState {
    pub fn allowed_next(self) -> &'static [GameState] {
        use GameState::*;
        match self {
            Idle      => &[Animating, Over, Won],
            Animating => &[Idle, Over, Won],
            Over      => &[Idle],
            Won       => &[Idle, Animating],
        }
    }

    pub fn can_transition_to(self, next: GameState) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn label(self) -> &'static str {
        match self {
            GameState::Idle => "idle",
            GameState::Animating => "animating",
            GameState::Over => "over",
            GameState::Won => "won",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GameStateMachine {
    state: GameState,
}

impl GameStateMachine {
    pub fn new() -> Self {
        GameStateMachine { state: GameState::Idle }
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Move and slide entry points must check this before touching the board.
    #[inline]
    pub fn can_act(&self) -> bool {
        matches!(self.state, GameState::Idle | GameState::Won)
    }

    /// Request a transition. Returns whether it happened.
    pub fn transition(&mut self, next: GameState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            log::debug!("ignored transition {} -> {}", self.state.label(), next.label());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameState::*;

    fn at(state: GameState) -> GameStateMachine {
        GameStateMachine { state }
    }

    #[test]
    fn starts_idle_and_can_act() {
        let m = GameStateMachine::new();
        assert_eq!(m.state(), Idle);
        assert!(m.can_act());
    }

    #[test]
    fn can_act_only_in_idle_or_won() {
        assert!(at(Idle).can_act());
        assert!(at(Won).can_act());
        assert!(!at(Animating).can_act());
        assert!(!at(Over).can_act());
    }

    #[test]
    fn table_transitions_succeed() {
        let all = [Idle, Animating, Over, Won];
        for from in all {
            for &to in from.allowed_next() {
                let mut m = at(from);
                assert!(m.transition(to), "{from:?} -> {to:?}");
                assert_eq!(m.state(), to);
            }
        }
    }

    #[test]
    fn illegal_transitions_are_ignored() {
        let cases = [
            (Idle, Idle),
            (Animating, Animating),
            (Over, Animating),
            (Over, Won),
            (Over, Over),
            (Won, Over),
            (Won, Won),
        ];
        for (from, to) in cases {
            let mut m = at(from);
            assert!(!m.transition(to), "{from:?} -> {to:?}");
            assert_eq!(m.state(), from);
        }
    }

    #[test]
    fn over_is_left_only_by_restart() {
        let mut m = at(Over);
        assert!(!m.can_act());
        assert!(m.transition(Idle));
        assert!(m.can_act());
    }
}
