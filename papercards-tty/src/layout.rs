use papercards_render::{Card, PageBody, PageView};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const MIN_WIDTH: usize = 40;
const HEADER_ROWS: usize = 2;
const FOOTER_ROWS: usize = 2;
const TITLE_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Bold,
    Dim,
    Reverse,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Tone::Plain)
    }

    pub fn styled(text: impl Into<String>, tone: Tone) -> Self {
        let mut line = Self::default();
        line.push(text, tone);
        line
    }

    pub fn push(&mut self, text: impl Into<String>, tone: Tone) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span { text, tone });
        }
    }

    pub fn append(&mut self, other: Line) {
        self.spans.extend(other.spans);
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.width()).sum()
    }

    /// Cuts or pads the line to exactly `width` display columns.
    pub fn fit(self, width: usize) -> Self {
        let mut fitted = Line::default();
        let mut used = 0;
        for span in self.spans {
            if used >= width {
                break;
            }
            let text = take_width(&span.text, width - used);
            used += text.width();
            fitted.push(text, span.tone);
        }
        if used < width {
            fitted.push(" ".repeat(width - used), Tone::Plain);
        }
        fitted
    }
}

/// Presentation-local cursor and scroll state; never part of the view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub cursor: usize,
    pub sidebar_offset: usize,
    pub scroll: usize,
}

impl Viewport {
    pub fn move_cursor(&mut self, delta: isize, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        let last = len as isize - 1;
        let next = (self.cursor as isize).saturating_add(delta).clamp(0, last) as usize;
        if next != self.cursor {
            self.cursor = next;
            true
        } else {
            false
        }
    }

    /// Puts the cursor on the selected category.
    pub fn sync_cursor(&mut self, view: &PageView) {
        if let Some(idx) = view.categories.iter().position(|entry| entry.selected) {
            self.cursor = idx;
        } else {
            self.cursor = self.cursor.min(view.categories.len().saturating_sub(1));
        }
    }

    pub fn highlighted<'a>(&self, view: &'a PageView) -> Option<&'a str> {
        view.categories
            .get(self.cursor)
            .map(|entry| entry.name.as_str())
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize)
        };
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    fn ensure_cursor_visible(&mut self, viewport_height: usize, len: usize) {
        if viewport_height == 0 || len == 0 {
            self.sidebar_offset = 0;
            return;
        }
        let max_offset = len.saturating_sub(viewport_height);
        if self.sidebar_offset > max_offset {
            self.sidebar_offset = max_offset;
        }
        if self.cursor < self.sidebar_offset {
            self.sidebar_offset = self.cursor;
            return;
        }
        let bottom = self.sidebar_offset + viewport_height;
        if self.cursor >= bottom {
            self.sidebar_offset = self.cursor + 1 - viewport_height;
        }
    }

    fn clamp_scroll(&mut self, content_height: usize, viewport_height: usize) {
        let max_scroll = content_height.saturating_sub(viewport_height);
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub width: u16,
    pub height: u16,
    pub sidebar_width: u16,
    pub description_lines: usize,
}

/// Lays out a full screen: sidebar, separator, then heading, cards and footer.
///
/// Always returns exactly `height` lines of exactly `width` columns.
pub fn layout(
    view: &PageView,
    viewport: &mut Viewport,
    params: &LayoutParams,
    message: Option<&str>,
) -> Vec<Line> {
    let width = usize::from(params.width).max(MIN_WIDTH);
    let height = usize::from(params.height).max(1);
    let sidebar_width = usize::from(params.sidebar_width).min(width / 3);
    let main_width = width - sidebar_width - 1;

    let sidebar = sidebar_lines(view, viewport, sidebar_width, height);
    let main = main_lines(view, viewport, params, main_width, height, message);

    sidebar
        .into_iter()
        .zip(main)
        .map(|(left, right)| {
            let mut line = left.fit(sidebar_width);
            line.push("│", Tone::Dim);
            line.append(right.fit(main_width));
            line
        })
        .collect()
}

fn sidebar_lines(
    view: &PageView,
    viewport: &mut Viewport,
    width: usize,
    height: usize,
) -> Vec<Line> {
    let mut lines = vec![
        Line::styled("Categories", Tone::Bold),
        Line::styled("─".repeat(width), Tone::Dim),
    ];
    let visible = height.saturating_sub(lines.len());
    viewport.ensure_cursor_visible(visible, view.categories.len());

    for (idx, entry) in view
        .categories
        .iter()
        .enumerate()
        .skip(viewport.sidebar_offset)
        .take(visible)
    {
        let marker = if entry.selected { "*" } else { " " };
        let count = format!(" {}", entry.count);
        let name = if entry.name.is_empty() {
            "(blank)"
        } else {
            entry.name.as_str()
        };
        let name_width = width.saturating_sub(count.width() + 2);
        let text = format!(
            "{} {}{}",
            marker,
            pad_to_width(&truncate_with_ellipsis(name, name_width), name_width),
            count
        );
        let tone = if idx == viewport.cursor {
            Tone::Reverse
        } else if entry.selected {
            Tone::Bold
        } else {
            Tone::Plain
        };
        lines.push(Line::styled(text, tone));
    }

    lines.resize(height, Line::default());
    lines
}

fn main_lines(
    view: &PageView,
    viewport: &mut Viewport,
    params: &LayoutParams,
    width: usize,
    height: usize,
    message: Option<&str>,
) -> Vec<Line> {
    let mut lines = vec![Line::styled(view.heading.as_str(), Tone::Bold)];
    match view.warnings.first() {
        Some(warning) => lines.push(Line::styled(warning.as_str(), Tone::Warning)),
        None => lines.push(Line::default()),
    }
    debug_assert_eq!(lines.len(), HEADER_ROWS);

    let region = height.saturating_sub(HEADER_ROWS + FOOTER_ROWS);
    let body = match &view.body {
        PageBody::Cards { rows } => grid_lines(rows, width, params.description_lines),
        PageBody::Empty { notice } => vec![Line::default(), Line::styled(notice.as_str(), Tone::Warning)],
    };
    viewport.clamp_scroll(body.len(), region);
    let shown = body.len().min(viewport.scroll + region) - viewport.scroll;
    lines.extend(body.iter().skip(viewport.scroll).take(region).cloned());
    lines.extend(std::iter::repeat(Line::default()).take(region - shown));

    lines.push(navigation_line(view, width));
    let mut hints = String::from("j/k move  enter select  h/l page  r reload  q quit");
    if body.len() > region {
        hints.push_str(&format!(
            "  [lines {}-{} of {}]",
            viewport.scroll + 1,
            viewport.scroll + shown,
            body.len()
        ));
    }
    let mut hint_line = Line::styled(hints, Tone::Dim);
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        hint_line.push(" | ", Tone::Dim);
        hint_line.push(message, Tone::Warning);
    }
    lines.push(hint_line);

    lines.truncate(height);
    lines.resize(height, Line::default());
    lines
}

fn navigation_line(view: &PageView, width: usize) -> Line {
    let left = if view.navigation.previous {
        "< Previous (h)"
    } else {
        ""
    };
    let right = if view.navigation.next {
        "(l) Next >"
    } else {
        ""
    };
    let status = view.status.as_str();

    let side = left.width().max(right.width());
    let middle = width.saturating_sub(side * 2);
    let mut line = Line::default();
    line.push(pad_to_width(left, side), Tone::Bold);
    line.push(center(status, middle), Tone::Plain);
    line.push(pad_left(right, side), Tone::Bold);
    line
}

/// Two cards per row, side by side, every card the same height.
pub fn grid_lines(rows: &[Vec<Card>], width: usize, description_lines: usize) -> Vec<Line> {
    let card_width = width.saturating_sub(1) / 2;
    let mut lines = Vec::new();
    for row in rows {
        let left = row
            .first()
            .map(|card| card_lines(card, card_width, description_lines))
            .unwrap_or_default();
        let right = row
            .get(1)
            .map(|card| card_lines(card, card_width, description_lines))
            .unwrap_or_else(|| vec![Line::default(); left.len()]);
        for (l, r) in left.into_iter().zip(right) {
            let mut line = l.fit(card_width);
            line.push(" ", Tone::Plain);
            line.append(r.fit(card_width));
            lines.push(line);
        }
    }
    lines
}

pub fn card_height(description_lines: usize) -> usize {
    // borders, title, authors, date, description, three links
    2 + TITLE_LINES + 1 + 1 + description_lines + 3
}

pub fn card_lines(card: &Card, width: usize, description_lines: usize) -> Vec<Line> {
    let inner = width.saturating_sub(4);
    let mut content: Vec<Line> = Vec::with_capacity(card_height(description_lines));

    let mut title = wrap(&card.title, inner, TITLE_LINES);
    title.resize(TITLE_LINES, String::new());
    content.extend(title.into_iter().map(|line| Line::styled(line, Tone::Bold)));

    content.push(Line::plain(truncate_with_ellipsis(
        &format!("Authors: {}", card.authors),
        inner,
    )));
    content.push(Line::styled(format!("Date: {}", card.date), Tone::Dim));

    let mut description = wrap(&card.description, inner, description_lines);
    description.resize(description_lines, String::new());
    content.extend(description.into_iter().map(Line::plain));

    for (label, target) in [
        ("Link", &card.links.link),
        ("PDF ", &card.links.pdf),
        ("HTML", &card.links.html),
    ] {
        content.push(Line::styled(
            truncate_with_ellipsis(&format!("{label}: {target}"), inner),
            Tone::Dim,
        ));
    }

    let horizontal = "─".repeat(width.saturating_sub(2));
    let mut lines = Vec::with_capacity(content.len() + 2);
    lines.push(Line::styled(format!("┌{horizontal}┐"), Tone::Dim));
    for line in content {
        let mut boxed = Line::styled("│ ", Tone::Dim);
        boxed.append(line.fit(inner));
        boxed.push(" │", Tone::Dim);
        lines.push(boxed);
    }
    lines.push(Line::styled(format!("└{horizontal}┘"), Tone::Dim));
    lines
}

/// Greedy word wrap. Words wider than `width` are broken; text past
/// `max_lines` is dropped and the last kept line ends with an ellipsis.
pub fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word;
        loop {
            let sep = usize::from(!current.is_empty());
            if current.width() + sep + word.width() <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                break;
            }
            if current.is_empty() {
                let mut head = take_width(word, width);
                if head.is_empty() {
                    // glyph wider than the whole column
                    let first = word.chars().next().map_or(0, char::len_utf8);
                    head = &word[..first];
                }
                let rest = &word[head.len()..];
                lines.push(head.to_string());
                word = rest;
                if word.is_empty() {
                    break;
                }
            } else {
                lines.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let room = width.saturating_sub(ELLIPSIS.len());
            let mut cut = take_width(last, room).trim_end().to_string();
            cut.push_str(ELLIPSIS);
            *last = cut;
        }
    }
    lines
}

pub fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width <= ELLIPSIS.len() {
        return take_width(text, width).to_string();
    }
    let mut truncated = take_width(text, width - ELLIPSIS.len()).to_string();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Longest prefix of `text` that fits in `width` columns.
fn take_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

fn pad_to_width(text: &str, width: usize) -> String {
    let mut padded = text.to_string();
    let w = text.width();
    if w < width {
        padded.push_str(&" ".repeat(width - w));
    }
    padded
}

fn pad_left(text: &str, width: usize) -> String {
    let w = text.width();
    if w >= width {
        text.to_string()
    } else {
        format!("{}{}", " ".repeat(width - w), text)
    }
}

fn center(text: &str, width: usize) -> String {
    let text = truncate_with_ellipsis(text, width);
    let w = text.width();
    let left = (width.saturating_sub(w)) / 2;
    let right = width.saturating_sub(w + left);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
