use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

pub mod catalog;
pub mod config;
pub mod query;
pub mod source;

pub use catalog::{
    load_catalog, parse_date, Catalog, LoadError, LoadReport, Notice, PaperDate, Record,
    REQUIRED_COLUMNS,
};
pub use chrono::NaiveDate;
pub use config::{Config, DisplayConfig};
pub use query::{paginate, PageSlice, PAGE_SIZE};
pub use source::CatalogSource;

pub type SessionId = Uuid;

/// The only mutable state of a viewer session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selected_category: String,
    pub current_page: usize,
}

impl ViewState {
    /// First category alphabetically, first page.
    pub fn initial(catalog: &Catalog) -> Self {
        Self {
            selected_category: catalog.default_category().unwrap_or_default(),
            current_page: 0,
        }
    }

    pub fn total_pages(&self, catalog: &Catalog) -> usize {
        query::total_pages_for(catalog, &self.selected_category)
    }

    pub fn clamp(&mut self, catalog: &Catalog) {
        let total = self.total_pages(catalog);
        self.current_page = query::clamp_page(self.current_page, total);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectCategory { name: String },
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CategoryChanged(String),
    CatalogReloaded,
    RedrawNeeded,
}

pub struct Session {
    id: SessionId,
    catalog: Arc<Catalog>,
    state: ViewState,
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = ViewState::initial(&catalog);
        Self::with_state(catalog, state)
    }

    pub fn with_state(catalog: Arc<Catalog>, mut state: ViewState) -> Self {
        state.clamp(&catalog);
        Self {
            id: Uuid::new_v4(),
            catalog,
            state,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn events(&self) -> Arc<Mutex<Vec<SessionEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn drain_events(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn page(&self) -> PageSlice<'_> {
        paginate(
            &self.catalog,
            &self.state.selected_category,
            self.state.current_page,
        )
    }

    #[instrument(skip(self), fields(session = %self.id))]
    pub fn apply(&mut self, command: Command) {
        debug!(?command, "applying command");
        let total = self.state.total_pages(&self.catalog);
        match command {
            Command::SelectCategory { name } => {
                // re-selecting the current category still rewinds to the first page
                self.state.selected_category = name.clone();
                self.state.current_page = 0;
                let mut events = self.events.lock();
                events.push(SessionEvent::CategoryChanged(name));
                events.push(SessionEvent::RedrawNeeded);
            }
            Command::NextPage => {
                if self.state.current_page + 1 < total {
                    self.set_page(self.state.current_page + 1);
                }
            }
            Command::PrevPage => {
                if self.state.current_page > 0 {
                    self.set_page(self.state.current_page - 1);
                }
            }
            Command::FirstPage => self.set_page(0),
            Command::LastPage => self.set_page(total.saturating_sub(1)),
        }
        self.state.clamp(&self.catalog);
    }

    /// Installs a reloaded catalog, keeping the selection and re-clamping the page.
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
        self.state.clamp(&self.catalog);
        let mut events = self.events.lock();
        events.push(SessionEvent::CatalogReloaded);
        events.push(SessionEvent::RedrawNeeded);
    }

    fn set_page(&mut self, page: usize) {
        if page != self.state.current_page {
            self.state.current_page = page;
            self.events.lock().push(SessionEvent::RedrawNeeded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, category: &str, day: u32) -> Record {
        Record {
            title: title.to_string(),
            authors: "Someone".to_string(),
            link: None,
            pdf_link: None,
            html_link: None,
            description: String::new(),
            category: category.to_string(),
            date: PaperDate::Known(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
        }
    }

    /// 45 records in cs.AI, 3 in cs.LG.
    fn catalog() -> Arc<Catalog> {
        let mut records: Vec<Record> = (0..45)
            .map(|i| record(&format!("ai-{i}"), "cs.AI", (i % 28) as u32 + 1))
            .collect();
        records.extend((0..3).map(|i| record(&format!("lg-{i}"), "cs.LG", i + 1)));
        Arc::new(Catalog::from_records("papers.csv", records))
    }

    #[test]
    fn new_session_starts_on_first_category_first_page() {
        let session = Session::new(catalog());
        assert_eq!(session.state().selected_category, "cs.AI");
        assert_eq!(session.state().current_page, 0);
        assert_eq!(session.page().total_pages, 3);
    }

    #[test]
    fn navigation_stays_within_bounds() {
        let mut session = Session::new(catalog());

        session.apply(Command::PrevPage);
        assert_eq!(session.state().current_page, 0);
        assert!(session.drain_events().is_empty());

        session.apply(Command::NextPage);
        session.apply(Command::NextPage);
        assert_eq!(session.state().current_page, 2);
        session.apply(Command::NextPage);
        assert_eq!(session.state().current_page, 2);

        let page = session.page();
        assert_eq!(page.records.len(), 5);
        assert!(page.has_previous());
        assert!(!page.has_next());

        session.apply(Command::PrevPage);
        assert_eq!(session.state().current_page, 1);
        session.apply(Command::FirstPage);
        assert_eq!(session.state().current_page, 0);
        session.apply(Command::LastPage);
        assert_eq!(session.state().current_page, 2);
    }

    #[test]
    fn selecting_a_category_resets_the_page() {
        let mut session = Session::new(catalog());
        session.apply(Command::NextPage);
        session.drain_events();

        session.apply(Command::SelectCategory {
            name: "cs.LG".to_string(),
        });
        assert_eq!(session.state().selected_category, "cs.LG");
        assert_eq!(session.state().current_page, 0);
        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::CategoryChanged("cs.LG".to_string()),
                SessionEvent::RedrawNeeded
            ]
        );
    }

    #[test]
    fn reselecting_the_current_category_rewinds_to_first_page() {
        let mut session = Session::new(catalog());
        session.apply(Command::LastPage);
        session.apply(Command::SelectCategory {
            name: "cs.AI".to_string(),
        });
        assert_eq!(session.state().current_page, 0);
    }

    #[test]
    fn unknown_category_gives_empty_page() {
        let mut session = Session::new(catalog());
        session.apply(Command::SelectCategory {
            name: "cs.XX".to_string(),
        });
        let page = session.page();
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        session.apply(Command::NextPage);
        assert_eq!(session.state().current_page, 0);
    }

    #[test]
    fn with_state_clamps_requested_page() {
        let session = Session::with_state(
            catalog(),
            ViewState {
                selected_category: "cs.LG".to_string(),
                current_page: 7,
            },
        );
        assert_eq!(session.state().current_page, 0);
    }

    #[test]
    fn replacing_the_catalog_reclamps_the_page() {
        let mut session = Session::new(catalog());
        session.apply(Command::LastPage);
        session.drain_events();

        let smaller = Arc::new(Catalog::from_records(
            "papers.csv",
            (0..25).map(|i| record("ai", "cs.AI", i % 28 + 1)).collect(),
        ));
        session.replace_catalog(smaller);
        assert_eq!(session.state().current_page, 1);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::CatalogReloaded, SessionEvent::RedrawNeeded]
        );
    }

    #[test]
    fn sessions_sharing_a_catalog_are_independent() {
        let shared = catalog();
        let mut first = Session::new(Arc::clone(&shared));
        let second = Session::new(Arc::clone(&shared));

        first.apply(Command::NextPage);
        assert_eq!(first.state().current_page, 1);
        assert_eq!(second.state().current_page, 0);
        assert_ne!(first.id(), second.id());
    }
}
