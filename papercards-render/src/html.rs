//! Standalone HTML rendering of a [`PageView`].

use std::fmt::Write;

use crate::card::Card;
use crate::page::{PageBody, PageView};

pub const CSS: &str = r#"
body {
    margin: 0;
    display: flex;
    font-family: system-ui, sans-serif;
    color: #222;
}
.sidebar {
    width: 16rem;
    padding: 1rem;
    background: #f0f2f6;
    min-height: 100vh;
}
.sidebar ul {
    list-style: none;
    padding: 0;
}
.sidebar li {
    padding: 0.4rem 0.6rem;
    margin-bottom: 5px;
    border-radius: 6px;
    background: #fff;
}
.sidebar li.selected {
    background: #1e90ff;
    color: #fff;
}
.sidebar .count {
    float: right;
    opacity: 0.7;
}
main {
    flex: 1;
    padding: 1rem 2rem;
}
.warning {
    background: #fff4d6;
    border-left: 4px solid #f0ad00;
    padding: 0.5rem 1rem;
}
.notice {
    background: #eef4ff;
    padding: 0.5rem 1rem;
}
.card-grid {
    display: grid;
    grid-template-columns: repeat(2, 1fr);
    gap: 15px;
}
.card-container {
    background-color: #f9f9f9;
    padding: 20px;
    border-radius: 10px;
    box-shadow: 0 4px 8px rgba(0, 0, 0, 0.1);
    transition: transform 0.2s;
    display: flex;
    flex-direction: column;
    justify-content: space-between;
}
.card-container:hover {
    transform: scale(1.02);
}
.card-title {
    font-size: 1.5em;
    font-weight: bold;
}
.card-authors {
    font-size: 1em;
    color: #333;
    margin-top: 5px;
}
.card-date {
    font-size: 0.9em;
    color: #555;
    margin-top: 5px;
}
.card-description {
    margin-top: 10px;
    flex-grow: 1;
}
.card-links a {
    text-decoration: none;
    color: #1e90ff;
    margin-right: 10px;
}
.card-links a:hover {
    text-decoration: underline;
}
.pagination {
    display: flex;
    justify-content: space-between;
    margin-top: 1.5rem;
}
"#;

pub fn render_document(view: &PageView) -> String {
    let mut sidebar = String::new();
    for entry in &view.categories {
        let _ = write!(
            sidebar,
            r#"<li class="{}">{}<span class="count">{}</span></li>"#,
            if entry.selected { "selected" } else { "category" },
            html_escape(&entry.name),
            entry.count
        );
    }

    let mut warnings = String::new();
    for warning in &view.warnings {
        let _ = write!(
            warnings,
            r#"<p class="warning">{}</p>"#,
            html_escape(warning)
        );
    }

    let body = match &view.body {
        PageBody::Cards { rows } => {
            let mut grid = String::from(r#"<div class="card-grid">"#);
            for card in rows.iter().flatten() {
                grid.push_str(&render_card(card));
            }
            grid.push_str("</div>");
            grid
        }
        PageBody::Empty { notice } => {
            format!(r#"<p class="notice">{}</p>"#, html_escape(notice))
        }
    };

    let previous = if view.navigation.previous {
        r#"<span class="nav-previous">&larr; Previous</span>"#
    } else {
        "<span></span>"
    };
    let next = if view.navigation.next {
        r#"<span class="nav-next">Next &rarr;</span>"#
    } else {
        "<span></span>"
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Paper Cards - {category}</title>
    <style>{css}</style>
</head>
<body>
    <aside class="sidebar">
        <h2>Categories</h2>
        <ul>{sidebar}</ul>
    </aside>
    <main>
        <h1>Paper Cards</h1>
        {warnings}
        <h3>{heading}</h3>
        {body}
        <nav class="pagination">{previous}<span class="status">{status}</span>{next}</nav>
    </main>
</body>
</html>
"#,
        category = html_escape(&view.selected_category),
        css = CSS,
        heading = html_escape(&view.heading),
        status = html_escape(&view.status),
    )
}

pub fn render_card(card: &Card) -> String {
    format!(
        r#"<div class="card-container">
    <div>
        <div class="card-title">{title}</div>
        <div class="card-authors"><strong>Authors:</strong> {authors}</div>
        <div class="card-date"><strong>Date:</strong> {date}</div>
        <div class="card-description">{description}</div>
    </div>
    <div class="card-links">
        <a href="{link}" target="_blank" rel="noopener">Visit Link</a>
        <a href="{pdf}" target="_blank" rel="noopener">PDF</a>
        <a href="{html}" target="_blank" rel="noopener">HTML</a>
    </div>
</div>"#,
        title = html_escape(&card.title),
        authors = html_escape(&card.authors),
        date = html_escape(&card.date),
        description = html_escape(&card.description),
        link = html_escape(&card.links.link),
        pdf = html_escape(&card.links.pdf),
        html = html_escape(&card.links.html),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardLinks;
    use crate::page::{CategoryEntry, Navigation};

    fn card(title: &str) -> Card {
        Card {
            title: title.to_string(),
            authors: "Ada & Bob".to_string(),
            date: "2024-01-02".to_string(),
            description: "About <things>".to_string(),
            links: CardLinks {
                link: "https://arxiv.org/abs/1?a=1&b=2".to_string(),
                pdf: "#".to_string(),
                html: "#".to_string(),
            },
        }
    }

    fn view(body: PageBody, navigation: Navigation) -> PageView {
        PageView {
            categories: vec![
                CategoryEntry {
                    name: "cs.AI".to_string(),
                    count: 3,
                    selected: true,
                },
                CategoryEntry {
                    name: "cs.LG".to_string(),
                    count: 1,
                    selected: false,
                },
            ],
            selected_category: "cs.AI".to_string(),
            page: 0,
            total_pages: 2,
            total_records: 3,
            heading: "Showing results for: cs.AI (Page 1 of 2)".to_string(),
            body,
            navigation,
            status: "page 1 of 2".to_string(),
            warnings: vec![],
        }
    }

    #[test]
    fn card_markup_escapes_text_and_urls() {
        let html = render_card(&card("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Ada &amp; Bob"));
        assert!(html.contains(r#"href="https://arxiv.org/abs/1?a=1&amp;b=2""#));
        assert!(html.contains(r##"href="#" target="_blank""##));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn document_lists_categories_cards_and_status() {
        let html = render_document(&view(
            PageBody::Cards {
                rows: vec![vec![card("One"), card("Two")], vec![card("Three")]],
            },
            Navigation {
                previous: false,
                next: true,
            },
        ));
        assert!(html.contains(r#"<li class="selected">cs.AI"#));
        assert!(html.contains(r#"<li class="category">cs.LG"#));
        assert_eq!(html.matches(r#"class="card-container""#).count(), 3);
        assert!(html.contains("page 1 of 2"));
        assert!(html.contains("Next &rarr;"));
        assert!(!html.contains("Previous"));
    }

    #[test]
    fn empty_body_renders_notice_instead_of_grid() {
        let html = render_document(&view(
            PageBody::Empty {
                notice: "No records found for category: cs.XX".to_string(),
            },
            Navigation {
                previous: false,
                next: false,
            },
        ));
        assert!(html.contains("No records found for category: cs.XX"));
        assert!(!html.contains("card-grid"));
        assert!(html.contains("<h2>Categories</h2>"));
    }
}
