use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Columns every source file must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Title",
    "Authors",
    "Link",
    "Description",
    "PDF Link",
    "HTML Link",
    "Category",
    "Date",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %B, %Y",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaperDate {
    Unknown,
    Known(NaiveDate),
}

impl PaperDate {
    pub fn is_known(&self) -> bool {
        matches!(self, PaperDate::Known(_))
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            PaperDate::Known(date) => Some(*date),
            PaperDate::Unknown => None,
        }
    }
}

impl From<NaiveDate> for PaperDate {
    fn from(date: NaiveDate) -> Self {
        PaperDate::Known(date)
    }
}

/// Leniently parses a calendar date, keeping only the date part of date-times.
pub fn parse_date(raw: &str) -> PaperDate {
    let value = raw.trim();
    if value.is_empty() {
        return PaperDate::Unknown;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return PaperDate::Known(parsed.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return PaperDate::Known(parsed.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return PaperDate::Known(parsed);
        }
    }
    PaperDate::Unknown
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub authors: String,
    pub link: Option<String>,
    pub pdf_link: Option<String>,
    pub html_link: Option<String>,
    pub description: String,
    pub category: String,
    pub date: PaperDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub unknown_dates: usize,
}

/// The full set of records read from one version of the source file.
#[derive(Debug, Clone)]
pub struct Catalog {
    source: PathBuf,
    records: Vec<Record>,
    report: LoadReport,
}

impl Catalog {
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<Record>) -> Self {
        let report = LoadReport {
            rows: records.len(),
            unknown_dates: records.iter().filter(|r| !r.date.is_known()).count(),
        };
        Self {
            source: source.into(),
            records,
            report,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        self.category_counts()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Distinct categories in alphabetical order with their row counts.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.category.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect()
    }

    pub fn default_category(&self) -> Option<String> {
        self.records
            .iter()
            .map(|r| r.category.as_str())
            .min()
            .map(str::to_string)
    }

    pub fn warnings(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if self.report.unknown_dates > 0 {
            notices.push(Notice::UnparsedDates {
                count: self.report.unknown_dates,
            });
        }
        notices
    }
}

/// Non-fatal conditions surfaced to the user next to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    UnparsedDates { count: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::UnparsedDates { count } => write!(
                f,
                "Some dates could not be parsed and are shown as N/A ({} {})",
                count,
                if *count == 1 { "row" } else { "rows" }
            ),
        }
    }
}

struct ColumnIndex {
    title: usize,
    authors: usize,
    link: usize,
    description: usize,
    pdf_link: usize,
    html_link: usize,
    category: usize,
    date: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::ByteRecord) -> Result<Self, LoadError> {
        let names: Vec<String> = headers
            .iter()
            .map(|raw| {
                String::from_utf8_lossy(raw)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_string()
            })
            .collect();
        let position = |column: &str| names.iter().position(|name| name == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| position(**column).is_none())
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let index = |column: &str| position(column).unwrap_or_default();
        Ok(Self {
            title: index("Title"),
            authors: index("Authors"),
            link: index("Link"),
            description: index("Description"),
            pdf_link: index("PDF Link"),
            html_link: index("HTML Link"),
            category: index("Category"),
            date: index("Date"),
        })
    }

    fn record(&self, row: &csv::ByteRecord) -> Record {
        let text = |idx: usize| {
            row.get(idx)
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
                .unwrap_or_default()
        };
        let link = |idx: usize| {
            let value = text(idx);
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        Record {
            title: text(self.title).trim().to_string(),
            authors: text(self.authors).trim().to_string(),
            link: link(self.link),
            pdf_link: link(self.pdf_link),
            html_link: link(self.html_link),
            description: text(self.description),
            category: text(self.category),
            date: parse_date(&text(self.date)),
        }
    }
}

/// Reads the whole source file into a catalog.
#[instrument]
pub fn load_catalog(path: &Path) -> Result<Catalog, LoadError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    read_catalog(path, file)
}

pub(crate) fn read_catalog<R: io::Read>(path: &Path, reader: R) -> Result<Catalog, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.byte_headers().map_err(csv_error)?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut row = csv::ByteRecord::new();
    while reader.read_byte_record(&mut row).map_err(csv_error)? {
        records.push(columns.record(&row));
    }

    let catalog = Catalog::from_records(path, records);
    let report = catalog.report();
    if report.unknown_dates > 0 {
        warn!(
            path = %path.display(),
            count = report.unknown_dates,
            "some dates could not be parsed"
        );
    }
    info!(path = %path.display(), rows = report.rows, "catalog loaded");
    Ok(catalog)
}
