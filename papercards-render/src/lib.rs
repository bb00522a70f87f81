//! Turns a catalog and a view state into renderable pages.

pub mod card;
pub mod html;
pub mod page;

pub use card::{format_date, resolve_link, truncate_description, Card, CardLinks};
pub use html::render_document;
pub use page::{compose, CategoryEntry, Navigation, PageBody, PageView, GRID_COLUMNS};
