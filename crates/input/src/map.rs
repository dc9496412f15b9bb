//! Key mapping from terminal events to game actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One player's requests, before any legality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuyoAction {
    MoveLeft,
    MoveRight,
    Flip,
    Fall,
    Pause,
}

/// A per-player key layout. Two layouts ship by default so both players can
/// share one keyboard.
#[derive(Debug, Clone, Copy)]
pub struct KeyBindings {
    pub left: KeyCode,
    pub right: KeyCode,
    pub flip: KeyCode,
    pub fall: KeyCode,
    pub pause: KeyCode,
}

impl KeyBindings {
    /// Left-hand layout: WASD plus `p` for pause.
    pub fn wasd() -> Self {
        Self {
            left: KeyCode::Char('a'),
            right: KeyCode::Char('d'),
            flip: KeyCode::Char('w'),
            fall: KeyCode::Char('s'),
            pause: KeyCode::Char('p'),
        }
    }

    /// Right-hand layout: arrow keys plus `p` for pause.
    pub fn arrows() -> Self {
        Self {
            left: KeyCode::Left,
            right: KeyCode::Right,
            flip: KeyCode::Up,
            fall: KeyCode::Down,
            pause: KeyCode::Char('p'),
        }
    }

    /// Map a key event to this layout's action, ignoring letter case.
    pub fn action(&self, key: KeyEvent) -> Option<PuyoAction> {
        let code = normalize(key.code);
        if code == normalize(self.left) {
            Some(PuyoAction::MoveLeft)
        } else if code == normalize(self.right) {
            Some(PuyoAction::MoveRight)
        } else if code == normalize(self.flip) {
            Some(PuyoAction::Flip)
        } else if code == normalize(self.fall) {
            Some(PuyoAction::Fall)
        } else if code == normalize(self.pause) {
            Some(PuyoAction::Pause)
        } else {
            None
        }
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
