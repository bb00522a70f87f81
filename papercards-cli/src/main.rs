use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use directories::ProjectDirs;
use papercards_core::{
    CatalogSource, Command, Config, DisplayConfig, Session, SessionEvent, ViewState,
};
use papercards_render::{compose, render_document, PageView};
use papercards_tty::{layout, EventMapper, LayoutParams, Screen, UiEvent, Viewport};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
#[command(
    name = "papercards",
    version,
    about = "Browse research paper metadata as paged, filterable cards"
)]
struct Args {
    /// Configuration file (defaults to config.toml in the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV file to browse, overriding `data_file` from the configuration
    #[arg(long = "data-file")]
    data_file: Option<PathBuf>,

    /// Category to open on (defaults to the first one alphabetically)
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Page to open on (1-based)
    #[arg(short = 'p', long = "page")]
    page: Option<usize>,

    /// Write the page as a standalone HTML document and exit
    #[arg(long = "export-html", conflicts_with = "json")]
    export_html: Option<PathBuf>,

    /// Print the page description as JSON and exit
    #[arg(long)]
    json: bool,
}

impl Args {
    fn interactive(&self) -> bool {
        self.export_html.is_none() && !self.json
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let project_dirs = ProjectDirs::from("org", "papercards", "papercards")
        .ok_or_else(|| anyhow!("unable to resolve platform data directories"))?;
    let _log_guard = init_logging(&project_dirs, !args.interactive())?;
    let config = load_config(&args, &project_dirs)?;

    let source = match CatalogSource::open(&config.data_file) {
        Ok(source) => source,
        Err(err) => {
            error!(%err, path = %config.data_file.display(), "failed to load catalog");
            return Err(err.into());
        }
    };

    let catalog = source.catalog();
    let mut state = ViewState::initial(&catalog);
    if let Some(category) = &args.category {
        state.selected_category = category.clone();
    }
    if let Some(page) = args.page {
        state.current_page = page.saturating_sub(1);
    }
    let mut session = Session::with_state(catalog, state);
    info!(session = %session.id(), "session started");

    if args.json {
        let view = compose(session.catalog(), session.state());
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &view)?;
        writeln!(stdout)?;
        return Ok(());
    }

    if let Some(path) = &args.export_html {
        let view = compose(session.catalog(), session.state());
        fs::write(path, render_document(&view))
            .with_context(|| format!("failed to write {:?}", path))?;
        info!(path = %path.display(), status = %view.status, "exported page");
        return Ok(());
    }

    run_interactive(&mut session, &source, &config.display)
}

fn load_config(args: &Args, project_dirs: &ProjectDirs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&project_dirs.config_dir().join("config.toml"))?,
    };
    if let Some(data_file) = &args.data_file {
        config.data_file = data_file.clone();
    }
    Ok(config)
}

#[derive(Debug, PartialEq, Eq)]
enum LoopAction {
    Continue,
    ContinueRedraw,
    ClearAndRedraw,
    Quit,
}

fn run_interactive(
    session: &mut Session,
    source: &CatalogSource,
    display: &DisplayConfig,
) -> Result<()> {
    let _raw = RawModeGuard::new()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let mut screen = Screen::new(stdout);
    let mut mapper = EventMapper::new();
    let mut viewport = Viewport::default();
    let mut message: Option<String> = None;

    let mut view = compose(session.catalog(), session.state());
    viewport.sync_cursor(&view);
    let mut dirty = true;
    let mut needs_clear = true;
    let mut last_refresh = Instant::now();

    loop {
        if dirty {
            if needs_clear {
                screen.clear_all()?;
                needs_clear = false;
            }
            let status = combine_status(message.clone(), mapper.pending_input().as_deref());
            redraw(&mut screen, &view, &mut viewport, display, status.as_deref())?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(250))? {
            let pending_before = mapper.pending_input();
            let ui_event = mapper.map_event(event::read()?);
            match handle_event(ui_event, session, &view, &mut viewport, source, &mut message) {
                LoopAction::Continue => {}
                LoopAction::ContinueRedraw => dirty = true,
                LoopAction::ClearAndRedraw => {
                    needs_clear = true;
                    dirty = true;
                }
                LoopAction::Quit => break,
            }
            if mapper.pending_input() != pending_before {
                dirty = true;
            }
        }

        if last_refresh.elapsed() >= REFRESH_INTERVAL {
            last_refresh = Instant::now();
            if refresh_catalog(session, source, &mut message) {
                dirty = true;
            }
        }

        let mut resync_cursor = false;
        for event in session.drain_events() {
            match event {
                SessionEvent::CategoryChanged(_) => resync_cursor = true,
                SessionEvent::CatalogReloaded => {
                    message = Some(format!(
                        "catalog reloaded ({} rows)",
                        session.catalog().len()
                    ));
                    resync_cursor = true;
                }
                SessionEvent::RedrawNeeded => {}
            }
            viewport.reset_scroll();
            view = compose(session.catalog(), session.state());
            dirty = true;
        }
        if resync_cursor {
            viewport.sync_cursor(&view);
        }
    }

    screen.clear_all()?;
    Ok(())
}

fn handle_event(
    event: UiEvent,
    session: &mut Session,
    view: &PageView,
    viewport: &mut Viewport,
    source: &CatalogSource,
    message: &mut Option<String>,
) -> LoopAction {
    match event {
        UiEvent::Command(cmd) => {
            let cleared = message.take().is_some();
            session.apply(cmd);
            redraw_if(cleared)
        }
        UiEvent::MoveCursor { delta } => {
            redraw_if(viewport.move_cursor(delta, view.categories.len()))
        }
        UiEvent::SelectHighlighted => match viewport.highlighted(view) {
            Some(name) => {
                let cleared = message.take().is_some();
                session.apply(Command::SelectCategory {
                    name: name.to_string(),
                });
                redraw_if(cleared)
            }
            None => LoopAction::Continue,
        },
        UiEvent::Scroll { delta } => {
            viewport.scroll_by(delta);
            LoopAction::ContinueRedraw
        }
        UiEvent::Reload => {
            if !refresh_catalog(session, source, message) {
                *message = Some("data file unchanged".to_string());
            }
            LoopAction::ContinueRedraw
        }
        UiEvent::Resize => LoopAction::ClearAndRedraw,
        UiEvent::Quit => LoopAction::Quit,
        UiEvent::None => LoopAction::Continue,
    }
}

fn redraw_if(changed: bool) -> LoopAction {
    if changed {
        LoopAction::ContinueRedraw
    } else {
        LoopAction::Continue
    }
}

/// Picks up a changed data file. Returns false when nothing changed.
fn refresh_catalog(
    session: &mut Session,
    source: &CatalogSource,
    message: &mut Option<String>,
) -> bool {
    match source.refresh() {
        Ok(Some(catalog)) => {
            session.replace_catalog(catalog);
            true
        }
        Ok(None) => false,
        Err(err) => {
            warn!(%err, path = %source.path().display(), "reload failed, keeping previous catalog");
            *message = Some(format!("reload failed: {err}"));
            true
        }
    }
}

fn redraw(
    screen: &mut Screen<io::Stdout>,
    view: &PageView,
    viewport: &mut Viewport,
    display: &DisplayConfig,
    status: Option<&str>,
) -> Result<()> {
    let (columns, rows) = terminal::size()?;
    let params = LayoutParams {
        width: columns,
        height: rows,
        sidebar_width: display.sidebar_width,
        description_lines: display.description_lines,
    };
    let lines = layout(view, viewport, &params, status);
    screen.draw(&lines)
}

fn combine_status(base: Option<String>, pending_input: Option<&str>) -> Option<String> {
    match (base, pending_input.filter(|s| !s.is_empty())) {
        (Some(mut base), Some(pending)) => {
            base.push_str(" | ");
            base.push_str(pending);
            Some(base)
        }
        (Some(base), None) => Some(base),
        (None, Some(pending)) => Some(pending.to_string()),
        (None, None) => None,
    }
}

fn init_logging(project_dirs: &ProjectDirs, console: bool) -> Result<WorkerGuard> {
    let log_dir = project_dirs.data_local_dir().join("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "papercards.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);
    // the terminal UI owns stdout/stderr while it runs
    let console_layer = console.then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use tempfile::tempdir;

    const HEADER: &str = "Title,Authors,Link,Description,PDF Link,HTML Link,Category,Date\n";

    fn write_csv(path: &Path, rows: &[&str]) {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        fs::write(path, text).unwrap();
    }

    fn open_session(path: &Path) -> (CatalogSource, Session) {
        let source = CatalogSource::open(path).unwrap();
        let session = Session::new(source.catalog());
        (source, session)
    }

    #[test]
    fn select_highlighted_applies_category_under_cursor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.csv");
        write_csv(
            &path,
            &["A,X,,D,,,cs.AI,2024-01-01", "B,Y,,D,,,cs.LG,2024-01-02"],
        );
        let (source, mut session) = open_session(&path);
        let view = compose(session.catalog(), session.state());
        let mut viewport = Viewport::default();
        viewport.sync_cursor(&view);
        let mut message = Some("catalog reloaded (2 rows)".to_string());

        assert_eq!(
            handle_event(
                UiEvent::MoveCursor { delta: 1 },
                &mut session,
                &view,
                &mut viewport,
                &source,
                &mut message,
            ),
            LoopAction::ContinueRedraw
        );
        let action = handle_event(
            UiEvent::SelectHighlighted,
            &mut session,
            &view,
            &mut viewport,
            &source,
            &mut message,
        );

        assert_eq!(action, LoopAction::ContinueRedraw);
        assert!(message.is_none());
        assert_eq!(session.state().selected_category, "cs.LG");
        assert!(session
            .drain_events()
            .contains(&SessionEvent::CategoryChanged("cs.LG".to_string())));
    }

    #[test]
    fn no_op_command_still_redraws_when_message_is_cleared() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.csv");
        write_csv(&path, &["A,X,,D,,,cs.AI,2024-01-01"]);
        let (source, mut session) = open_session(&path);
        let view = compose(session.catalog(), session.state());
        let mut viewport = Viewport::default();
        let mut message = Some("data file unchanged".to_string());

        let action = handle_event(
            UiEvent::Command(Command::NextPage),
            &mut session,
            &view,
            &mut viewport,
            &source,
            &mut message,
        );
        assert_eq!(action, LoopAction::ContinueRedraw);
        assert!(message.is_none());
        assert!(session.drain_events().is_empty());

        let action = handle_event(
            UiEvent::Command(Command::NextPage),
            &mut session,
            &view,
            &mut viewport,
            &source,
            &mut message,
        );
        assert_eq!(action, LoopAction::Continue);
    }

    #[test]
    fn failed_reload_sets_message_and_keeps_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.csv");
        write_csv(&path, &["A,X,,D,,,cs.AI,2024-01-01"]);
        let (source, mut session) = open_session(&path);
        let mut message = None;

        assert!(!refresh_catalog(&mut session, &source, &mut message));
        assert!(message.is_none());

        fs::write(&path, "Title,Authors\nA,X\n").unwrap();
        assert!(refresh_catalog(&mut session, &source, &mut message));
        let shown = message.unwrap();
        assert!(shown.starts_with("reload failed: "));
        assert!(shown.contains("missing columns"));
        assert_eq!(session.catalog().len(), 1);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn successful_reload_installs_new_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.csv");
        write_csv(&path, &["A,X,,D,,,cs.AI,2024-01-01"]);
        let (source, mut session) = open_session(&path);
        let mut message = None;

        write_csv(
            &path,
            &["A,X,,D,,,cs.AI,2024-01-01", "B,Y,,D,,,cs.AI,2024-02-01"],
        );
        assert!(refresh_catalog(&mut session, &source, &mut message));
        assert_eq!(session.catalog().len(), 2);
        assert!(session
            .drain_events()
            .contains(&SessionEvent::CatalogReloaded));
    }

    #[test]
    fn combine_status_joins_message_and_pending_digits() {
        assert_eq!(
            combine_status(Some("catalog reloaded".to_string()), Some("12")).as_deref(),
            Some("catalog reloaded | 12")
        );
        assert_eq!(combine_status(None, Some("")), None);
        assert_eq!(combine_status(None, Some("3")).as_deref(), Some("3"));
    }

    #[test]
    fn export_flags_conflict() {
        let parsed = Args::try_parse_from(["papercards", "--json", "--export-html", "out.html"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn page_and_category_flags_parse() {
        let args = Args::try_parse_from(["papercards", "-c", "cs.AI", "--page", "3", "--json"])
            .unwrap();
        assert_eq!(args.category.as_deref(), Some("cs.AI"));
        assert_eq!(args.page, Some(3));
        assert!(!args.interactive());
    }
}
