use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use papercards_core::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Command(Command),
    MoveCursor { delta: isize },
    SelectHighlighted,
    Scroll { delta: isize },
    Reload,
    Resize,
    Quit,
    None,
}

/// Maps key events to viewer actions, keeping a numeric prefix between keys.
#[derive(Debug, Default)]
pub struct EventMapper {
    pending_count: Option<usize>,
    pending_digits: String,
}

impl EventMapper {
    pub const SCROLL_STEP: isize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_event(&mut self, event: Event) -> UiEvent {
        match event {
            Event::Key(KeyEvent {
                code, modifiers, ..
            }) => self.map_key(code, modifiers),
            Event::Resize(..) => UiEvent::Resize,
            _ => UiEvent::None,
        }
    }

    fn map_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> UiEvent {
        match (code, modifiers) {
            (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_count();
                UiEvent::Quit
            }
            (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll(Self::SCROLL_STEP)
            }
            (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll(-Self::SCROLL_STEP)
            }
            (KeyCode::PageDown, _) => self.scroll(Self::SCROLL_STEP),
            (KeyCode::PageUp, _) => self.scroll(-Self::SCROLL_STEP),
            (KeyCode::Char(c), KeyModifiers::NONE) if c.is_ascii_digit() => {
                if let Some(digit) = c.to_digit(10) {
                    self.push_digit(digit as usize);
                }
                UiEvent::None
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, KeyModifiers::NONE) => {
                let count = self.take_count() as isize;
                UiEvent::MoveCursor { delta: count }
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, KeyModifiers::NONE) => {
                let count = self.take_count() as isize;
                UiEvent::MoveCursor { delta: -count }
            }
            (KeyCode::Enter, _) | (KeyCode::Char(' '), KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::SelectHighlighted
            }
            (KeyCode::Char('l'), KeyModifiers::NONE)
            | (KeyCode::Char('n'), KeyModifiers::NONE)
            | (KeyCode::Right, KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::Command(Command::NextPage)
            }
            (KeyCode::Char('h'), KeyModifiers::NONE)
            | (KeyCode::Char('p'), KeyModifiers::NONE)
            | (KeyCode::Left, KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::Command(Command::PrevPage)
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.reset_count();
                UiEvent::Command(Command::FirstPage)
            }
            (KeyCode::Char('G'), modifiers)
                if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
            {
                self.reset_count();
                UiEvent::Command(Command::LastPage)
            }
            (KeyCode::End, _) => {
                self.reset_count();
                UiEvent::Command(Command::LastPage)
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => {
                self.reset_count();
                UiEvent::Reload
            }
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                self.reset_count();
                UiEvent::Quit
            }
            _ => {
                self.reset_count();
                UiEvent::None
            }
        }
    }

    fn push_digit(&mut self, digit: usize) {
        let current = self.pending_count.unwrap_or(0);
        let next = current.saturating_mul(10).saturating_add(digit);
        self.pending_count = Some(next);
        if let Some(c) = char::from_digit(digit as u32, 10) {
            self.pending_digits.push(c);
        }
    }

    fn take_count(&mut self) -> usize {
        let count = self
            .pending_count
            .take()
            .filter(|&count| count > 0)
            .unwrap_or(1);
        self.pending_digits.clear();
        count
    }

    fn reset_count(&mut self) {
        self.pending_count = None;
        self.pending_digits.clear();
    }

    fn scroll(&mut self, step: isize) -> UiEvent {
        let multiplier = self.take_count() as isize;
        UiEvent::Scroll {
            delta: step.saturating_mul(multiplier),
        }
    }

    pub fn pending_input(&self) -> Option<String> {
        if self.pending_digits.is_empty() {
            None
        } else {
            Some(self.pending_digits.clone())
        }
    }
}
