//! Keyboard helpers shared by every front end.
//!
//! Arrow keys double as item navigation in the sequential session, but only
//! when they would not move the caret inside a text field. Digits 1 to 4 type
//! the German special characters.

/// Keys the exercise reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Enter,
    Tab,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    #[must_use]
    pub fn any_command(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }
}

/// Caret position in a text control, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

impl Caret {
    #[must_use]
    pub fn at_start(self) -> bool {
        self.start == 0 && self.end == 0
    }

    #[must_use]
    pub fn at_end(self) -> bool {
        self.start == self.len && self.end == self.len
    }
}

/// What currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Nothing,
    TextEntry(Caret),
    /// Free-form editable region; arrows always belong to it.
    RichText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl KeyEvent {
    /// Item navigation requested by this key, if it would not hijack text editing.
    #[must_use]
    pub fn navigation(&self, focus: Focus) -> Option<Direction> {
        if self.modifiers.any_command() {
            return None;
        }
        let direction = match self.key {
            Key::ArrowLeft => Direction::Previous,
            Key::ArrowRight => Direction::Next,
            _ => return None,
        };
        match (focus, direction) {
            (Focus::RichText, _) => None,
            (Focus::TextEntry(caret), Direction::Previous) if !caret.at_start() => None,
            (Focus::TextEntry(caret), Direction::Next) if !caret.at_end() => None,
            _ => Some(direction),
        }
    }

    /// Enter, or Tab without Shift, pressed inside an answer field.
    #[must_use]
    pub fn is_forward(&self) -> bool {
        match self.key {
            Key::Enter => true,
            Key::Tab => !self.modifiers.shift,
            _ => false,
        }
    }

    /// Special character typed by the digit shortcuts.
    #[must_use]
    pub fn special_char(&self) -> Option<char> {
        if self.modifiers.any_command() {
            return None;
        }
        match self.key {
            Key::Char('1') => Some('ä'),
            Key::Char('2') => Some('ö'),
            Key::Char('3') => Some('ü'),
            Key::Char('4') => Some('ß'),
            _ => None,
        }
    }
}

/// Replace the selection `start..end` (character offsets) with `ch`.
///
/// Returns the new value and the caret position right after the inserted character.
/// Out-of-range offsets are clamped to the end of the value.
#[must_use]
pub fn insert_at_caret(value: &str, start: usize, end: usize, ch: char) -> (String, usize) {
    let chars: Vec<char> = value.chars().collect();
    let start = start.min(chars.len());
    let end = end.clamp(start, chars.len());
    let mut out: String = chars[..start].iter().collect();
    out.push(ch);
    out.extend(&chars[end..]);
    (out, start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret(start: usize, end: usize, len: usize) -> Focus {
        Focus::TextEntry(Caret { start, end, len })
    }

    #[test]
    fn arrows_navigate_without_text_focus() {
        let left = KeyEvent::plain(Key::ArrowLeft);
        let right = KeyEvent::plain(Key::ArrowRight);
        assert_eq!(left.navigation(Focus::Nothing), Some(Direction::Previous));
        assert_eq!(right.navigation(Focus::Nothing), Some(Direction::Next));
        assert_eq!(KeyEvent::plain(Key::Enter).navigation(Focus::Nothing), None);
    }

    #[test]
    fn arrows_respect_caret_boundaries() {
        let left = KeyEvent::plain(Key::ArrowLeft);
        let right = KeyEvent::plain(Key::ArrowRight);
        assert_eq!(left.navigation(caret(2, 2, 4)), None);
        assert_eq!(right.navigation(caret(2, 2, 4)), None);
        assert_eq!(left.navigation(caret(0, 0, 4)), Some(Direction::Previous));
        assert_eq!(right.navigation(caret(0, 0, 4)), None);
        assert_eq!(right.navigation(caret(4, 4, 4)), Some(Direction::Next));
        // A selection reaching the boundary still edits text.
        assert_eq!(left.navigation(caret(0, 3, 4)), None);
        assert_eq!(left.navigation(caret(0, 0, 0)), Some(Direction::Previous));
        assert_eq!(right.navigation(caret(0, 0, 0)), Some(Direction::Next));
    }

    #[test]
    fn arrows_never_leave_rich_text_or_fire_with_modifiers() {
        assert_eq!(KeyEvent::plain(Key::ArrowRight).navigation(Focus::RichText), None);
        let ctrl = KeyEvent {
            key: Key::ArrowRight,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        };
        assert_eq!(ctrl.navigation(Focus::Nothing), None);
    }

    #[test]
    fn forward_keys() {
        assert!(KeyEvent::plain(Key::Enter).is_forward());
        assert!(KeyEvent::plain(Key::Tab).is_forward());
        let back_tab = KeyEvent {
            key: Key::Tab,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        };
        assert!(!back_tab.is_forward());
    }

    #[test]
    fn digit_shortcuts_map_to_special_characters() {
        let typed: Vec<_> = ['1', '2', '3', '4', '5']
            .into_iter()
            .map(|c| KeyEvent::plain(Key::Char(c)).special_char())
            .collect();
        assert_eq!(typed, vec![Some('ä'), Some('ö'), Some('ü'), Some('ß'), None]);
        let alt = KeyEvent {
            key: Key::Char('1'),
            modifiers: Modifiers {
                alt: true,
                ..Modifiers::default()
            },
        };
        assert_eq!(alt.special_char(), None);
    }

    #[test]
    fn insert_replaces_selection() {
        assert_eq!(insert_at_caret("schn", 4, 4, 'ö'), ("schnö".to_owned(), 5));
        assert_eq!(insert_at_caret("Strasse", 4, 6, 'ß'), ("Straße".to_owned(), 5));
        assert_eq!(insert_at_caret("für", 1, 1, 'ü'), ("füür".to_owned(), 2));
        assert_eq!(insert_at_caret("ab", 9, 12, 'ä'), ("abä".to_owned(), 3));
    }
}
