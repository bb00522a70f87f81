use std::cmp::Reverse;

use crate::catalog::{Catalog, Record};

pub const PAGE_SIZE: usize = 20;

/// One page of the filtered, date-sorted records for a category.
#[derive(Debug, Clone)]
pub struct PageSlice<'a> {
    pub category: String,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub records: Vec<&'a Record>,
}

impl<'a> PageSlice<'a> {
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// True when the category matched nothing at all, not merely this page.
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    /// Offset of the first record on this page within the sorted result set.
    pub fn offset(&self) -> usize {
        self.page * PAGE_SIZE
    }
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages.saturating_sub(1))
}

pub fn total_pages_for(catalog: &Catalog, category: &str) -> usize {
    total_pages(
        catalog
            .records()
            .iter()
            .filter(|record| record.category == category)
            .count(),
    )
}

/// Records of `category`, newest first. Equal dates keep file order and unknown
/// dates trail every known one.
pub fn filter_sorted<'a>(catalog: &'a Catalog, category: &str) -> Vec<&'a Record> {
    let mut matches: Vec<&Record> = catalog
        .records()
        .iter()
        .filter(|record| record.category == category)
        .collect();
    matches.sort_by_key(|record| Reverse(record.date));
    matches
}

pub fn paginate<'a>(catalog: &'a Catalog, category: &str, page: usize) -> PageSlice<'a> {
    let sorted = filter_sorted(catalog, category);
    let total_records = sorted.len();
    let total_pages = total_pages(total_records);
    let page = clamp_page(page, total_pages);
    let records = sorted
        .into_iter()
        .skip(page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    PageSlice {
        category: category.to_string(),
        page,
        total_pages,
        total_records,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PaperDate;
    use chrono::NaiveDate;

    fn record(title: &str, category: &str, date: PaperDate) -> Record {
        Record {
            title: title.to_string(),
            authors: String::new(),
            link: None,
            pdf_link: None,
            html_link: None,
            description: String::new(),
            category: category.to_string(),
            date,
        }
    }

    fn day(n: u32) -> PaperDate {
        PaperDate::Known(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n as u64))
    }

    fn catalog_with(count: usize, category: &str) -> Catalog {
        let records = (0..count)
            .map(|i| record(&format!("paper-{i}"), category, day(i as u32)))
            .collect();
        Catalog::from_records("papers.csv", records)
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(20), 1);
        assert_eq!(total_pages(21), 2);
        assert_eq!(total_pages(45), 3);
    }

    #[test]
    fn last_page_of_45_holds_five_records() {
        let catalog = catalog_with(45, "cs.AI");
        let slice = paginate(&catalog, "cs.AI", 2);

        assert_eq!(slice.total_pages, 3);
        assert_eq!(slice.page, 2);
        assert_eq!(slice.records.len(), 5);
        assert!(slice.has_previous());
        assert!(!slice.has_next());
        // newest first, so the last page holds the five oldest papers
        let titles: Vec<&str> = slice.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["paper-4", "paper-3", "paper-2", "paper-1", "paper-0"]
        );
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let catalog = catalog_with(45, "cs.AI");
        let slice = paginate(&catalog, "cs.AI", 99);
        assert_eq!(slice.page, 2);
        assert_eq!(slice.offset(), 40);
    }

    #[test]
    fn filter_is_exact_and_case_sensitive() {
        let catalog = Catalog::from_records(
            "papers.csv",
            vec![
                record("a", "cs.AI", day(1)),
                record("b", "CS.AI", day(2)),
                record("c", "cs.AI ", day(3)),
                record("d", "cs.AI", day(4)),
            ],
        );
        let slice = paginate(&catalog, "cs.AI", 0);
        let titles: Vec<&str> = slice.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["d", "a"]);
    }

    #[test]
    fn empty_category_yields_single_empty_page() {
        let catalog = catalog_with(3, "cs.AI");
        let slice = paginate(&catalog, "cs.XX", 4);
        assert!(slice.is_empty());
        assert_eq!(slice.total_pages, 1);
        assert_eq!(slice.page, 0);
        assert!(!slice.has_previous());
        assert!(!slice.has_next());
    }

    #[test]
    fn sort_is_stable_and_puts_unknown_dates_last() {
        let catalog = Catalog::from_records(
            "papers.csv",
            vec![
                record("unknown-1", "x", PaperDate::Unknown),
                record("old", "x", day(1)),
                record("same-1", "x", day(5)),
                record("unknown-2", "x", PaperDate::Unknown),
                record("same-2", "x", day(5)),
                record("new", "x", day(9)),
            ],
        );
        let titles: Vec<&str> = filter_sorted(&catalog, "x")
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["new", "same-1", "same-2", "old", "unknown-1", "unknown-2"]
        );
    }

    #[test]
    fn total_pages_for_counts_only_the_category() {
        let mut records: Vec<Record> = (0..21).map(|i| record("a", "big", day(i))).collect();
        records.push(record("b", "small", day(1)));
        let catalog = Catalog::from_records("papers.csv", records);
        assert_eq!(total_pages_for(&catalog, "big"), 2);
        assert_eq!(total_pages_for(&catalog, "small"), 1);
        assert_eq!(total_pages_for(&catalog, "none"), 1);
    }
}
