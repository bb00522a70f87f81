use papercards_core::{PaperDate, Record};
use serde::Serialize;

pub const DESCRIPTION_WORD_LIMIT: usize = 200;
pub const PLACEHOLDER_LINK: &str = "#";
pub const UNKNOWN_DATE: &str = "N/A";
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLinks {
    pub link: String,
    pub pdf: String,
    pub html: String,
}

/// Display-ready form of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub authors: String,
    pub date: String,
    pub description: String,
    pub links: CardLinks,
}

impl Card {
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            authors: record.authors.clone(),
            date: format_date(record.date),
            description: truncate_description(&record.description, DESCRIPTION_WORD_LIMIT),
            links: CardLinks {
                link: resolve_link(record.link.as_deref()),
                pdf: resolve_link(record.pdf_link.as_deref()),
                html: resolve_link(record.html_link.as_deref()),
            },
        }
    }
}

pub fn format_date(date: PaperDate) -> String {
    match date {
        PaperDate::Known(date) => date.format("%Y-%m-%d").to_string(),
        PaperDate::Unknown => UNKNOWN_DATE.to_string(),
    }
}

/// Cuts `text` at a word boundary. Text within the limit comes back untouched.
pub fn truncate_description(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    let mut truncated = words[..max_words].join(" ");
    truncated.push_str(ELLIPSIS);
    truncated
}

pub fn resolve_link(link: Option<&str>) -> String {
    match link.map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => PLACEHOLDER_LINK.to_string(),
    }
}
