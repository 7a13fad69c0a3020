//! Key mappings and key sources.
//!
//! This module converts key events into review [`Action`]s and defines the
//! [`KeySource`] the review loop reads from.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::terminal::{self, TerminalError};

/// What the user asked for at the review prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Reject the repository for good.
    Zap,
    /// Hide the repository for the snooze duration.
    Snooze,
    /// Show the README in the pager.
    Readme,
    /// Open the repository page.
    OpenUrl,
    /// Open the project homepage.
    OpenHomepage,
    /// Leave the repository pending and move on.
    Skip,
    /// Stop reviewing.
    Quit,
}

/// Converts a key event to a review action.
///
/// Returns `None` for unbound keys, and for `h` when the repository has no
/// homepage.
///
/// # Key Bindings
///
/// | Key | Action |
/// |-----|--------|
/// | `z` | Zap |
/// | `s` | Snooze |
/// | `r` | README |
/// | `c` | Open repository page |
/// | `h` | Open homepage |
/// | `Space` | Skip |
/// | `q` or `Ctrl+C` | Quit |
///
/// # Examples
///
/// ```
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
/// use ghwatch_review::{Action, key_to_action};
///
/// let key = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
/// assert_eq!(key_to_action(key, false), Some(Action::Zap));
///
/// let key = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE);
/// assert_eq!(key_to_action(key, false), None);
/// ```
#[must_use]
pub fn key_to_action(key: KeyEvent, has_homepage: bool) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (key.code == KeyCode::Char('c')).then_some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('z') => Some(Action::Zap),
        KeyCode::Char('s') => Some(Action::Snooze),
        KeyCode::Char('r') => Some(Action::Readme),
        KeyCode::Char('c') => Some(Action::OpenUrl),
        KeyCode::Char('h') if has_homepage => Some(Action::OpenHomepage),
        KeyCode::Char(' ') => Some(Action::Skip),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Supplies key presses to the review loop.
pub trait KeySource {
    /// Blocks until the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if no key can be read.
    fn next_key(&mut self) -> Result<KeyEvent, TerminalError>;
}

/// Reads keys from the terminal in raw mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<KeyEvent, TerminalError> {
        terminal::read_key()
    }
}

/// Replays a fixed sequence of keys.
///
/// Once the keys run out, [`TerminalError::Closed`] is returned.
///
/// # Examples
///
/// ```
/// use ghwatch_review::{KeySource, ScriptedKeys};
///
/// let mut keys = ScriptedKeys::from_chars("zq");
/// assert!(keys.next_key().is_ok());
/// assert!(keys.next_key().is_ok());
/// assert!(keys.next_key().is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    /// Scripts one plain key press per character.
    #[must_use]
    pub fn from_chars(chars: &str) -> Self {
        Self {
            keys: chars
                .chars()
                .map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<KeyEvent, TerminalError> {
        self.keys.pop_front().ok_or(TerminalError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn letter_bindings() {
        assert_eq!(key_to_action(key('z'), false), Some(Action::Zap));
        assert_eq!(key_to_action(key('s'), false), Some(Action::Snooze));
        assert_eq!(key_to_action(key('r'), false), Some(Action::Readme));
        assert_eq!(key_to_action(key('c'), false), Some(Action::OpenUrl));
        assert_eq!(key_to_action(key(' '), false), Some(Action::Skip));
        assert_eq!(key_to_action(key('q'), false), Some(Action::Quit));
    }

    #[test]
    fn homepage_only_when_present() {
        assert_eq!(key_to_action(key('h'), true), Some(Action::OpenHomepage));
        assert_eq!(key_to_action(key('h'), false), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c, false), Some(Action::Quit));
        let ctrl_z = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_z, false), None);
    }

    #[test]
    fn unbound_keys() {
        assert_eq!(key_to_action(key('x'), true), None);
        assert_eq!(key_to_action(key('Z'), true), None);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(key_to_action(enter, true), None);
    }

    #[test]
    fn scripted_keys_run_out() {
        let mut keys = ScriptedKeys::from_chars("ab");
        assert_eq!(keys.next_key().unwrap(), key('a'));
        assert_eq!(keys.next_key().unwrap(), key('b'));
        assert!(matches!(keys.next_key(), Err(TerminalError::Closed)));
    }
}
