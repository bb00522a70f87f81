use papercards_core::{paginate, Catalog, ViewState};
use serde::Serialize;
use tracing::debug;

use crate::card::Card;

pub const GRID_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub previous: bool,
    pub next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageBody {
    /// Grid rows, each holding up to [`GRID_COLUMNS`] cards.
    Cards { rows: Vec<Vec<Card>> },
    Empty { notice: String },
}

/// Everything a presentation layer needs to draw one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub categories: Vec<CategoryEntry>,
    pub selected_category: String,
    /// Zero-based page index actually shown after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub heading: String,
    pub body: PageBody,
    pub navigation: Navigation,
    pub status: String,
    pub warnings: Vec<String>,
}

impl PageView {
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        let rows: &[Vec<Card>] = match &self.body {
            PageBody::Cards { rows } => rows,
            PageBody::Empty { .. } => &[],
        };
        rows.iter().flatten()
    }

    pub fn notice(&self) -> Option<&str> {
        match &self.body {
            PageBody::Empty { notice } => Some(notice),
            PageBody::Cards { .. } => None,
        }
    }
}

pub fn empty_notice(category: &str) -> String {
    format!("No records found for category: {category}")
}

pub fn status_line(page: usize, total_pages: usize) -> String {
    format!("page {} of {}", page + 1, total_pages)
}

/// Builds the page for `state` without touching any output device.
pub fn compose(catalog: &Catalog, state: &ViewState) -> PageView {
    let slice = paginate(catalog, &state.selected_category, state.current_page);
    debug!(
        category = %slice.category,
        page = slice.page,
        total_pages = slice.total_pages,
        shown = slice.records.len(),
        "composing page"
    );

    let categories = catalog
        .category_counts()
        .into_iter()
        .map(|(name, count)| CategoryEntry {
            selected: name == slice.category,
            name,
            count,
        })
        .collect();

    let body = if slice.is_empty() {
        PageBody::Empty {
            notice: empty_notice(&slice.category),
        }
    } else {
        let cards: Vec<Card> = slice
            .records
            .iter()
            .map(|record| Card::from_record(record))
            .collect();
        PageBody::Cards {
            rows: cards
                .chunks(GRID_COLUMNS)
                .map(|row| row.to_vec())
                .collect(),
        }
    };

    PageView {
        categories,
        heading: format!(
            "Showing results for: {} (Page {} of {})",
            slice.category,
            slice.page + 1,
            slice.total_pages
        ),
        navigation: Navigation {
            previous: slice.has_previous(),
            next: slice.has_next(),
        },
        status: status_line(slice.page, slice.total_pages),
        warnings: catalog.warnings().iter().map(ToString::to_string).collect(),
        selected_category: slice.category,
        page: slice.page,
        total_pages: slice.total_pages,
        total_records: slice.total_records,
        body,
    }
}
