//! Client-side pagination of an already loaded list.

use serde::Serialize;
use std::ops::Range;

/// Products shown per page unless configured otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Current page of a list, 1-based.
///
/// `total_pages` is never below 1, so an empty list still has page 1. Every
/// method that knows the list length keeps `page` inside `1..=total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: usize,
    per_page: usize,
}

impl Pagination {
    /// Start at page 1. A `per_page` of zero is treated as 1.
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Jump to `page`, clamped into range. Returns the page now shown.
    pub fn set_page(&mut self, page: usize, total: usize) -> usize {
        self.page = page.clamp(1, self.total_pages(total));
        self.page
    }

    /// Re-clamp after the list changed size.
    pub fn clamp(&mut self, total: usize) -> usize {
        self.set_page(self.page, total)
    }

    /// Returns `false` when already on the last page.
    pub fn next(&mut self, total: usize) -> bool {
        let before = self.page;
        self.set_page(before + 1, total) != before
    }

    /// Returns `false` when already on page 1.
    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Index range of the current page within a list of `total` items.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page - 1).saturating_mul(self.per_page).min(total);
        let end = start.saturating_add(self.per_page).min(total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_one_page() {
        let p = Pagination::default();
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.range(0), 0..0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination::new(10);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
        assert_eq!(p.total_pages(25), 3);
    }

    #[test]
    fn set_page_clamps() {
        let mut p = Pagination::new(10);
        assert_eq!(p.set_page(7, 25), 3);
        assert_eq!(p.set_page(0, 25), 1);
    }

    #[test]
    fn shrinking_list_moves_to_last_page() {
        let mut p = Pagination::new(10);
        p.set_page(2, 11);
        assert_eq!(p.page(), 2);

        // The only item on page 2 was deleted.
        assert_eq!(p.clamp(10), 1);
    }

    #[test]
    fn next_and_prev_stop_at_bounds() {
        let mut p = Pagination::new(10);
        assert!(!p.prev());
        assert!(p.next(15));
        assert!(!p.next(15));
        assert_eq!(p.page(), 2);
        assert!(p.prev());
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn slice_returns_current_page() {
        let items: Vec<u32> = (1..=12).collect();
        let mut p = Pagination::new(5);
        p.set_page(3, items.len());
        assert_eq!(p.slice(&items), &[11, 12]);
    }

    #[test]
    fn zero_per_page_is_one() {
        assert_eq!(Pagination::new(0).per_page(), 1);
    }
}
