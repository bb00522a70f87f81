//! Terminal presentation layer for the paper card viewer.

pub mod input;
pub mod layout;
pub mod screen;

pub use input::{EventMapper, UiEvent};
pub use layout::{layout, LayoutParams, Line, Span, Tone, Viewport};
pub use screen::Screen;
