//! Page-number pagination over ordered sequences.
//!
//! Out-of-range page numbers are clamped to the last page: anything past the
//! end, and anything below 1, resolves to the final page. An empty sequence
//! still has one (empty) page.

use serde::{Deserialize, Serialize};

/// A requested page number, as parsed from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageNumber(i64);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Absent or non-numeric input means the first page.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or(Self::FIRST)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Slices ordered sequences into fixed-size pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn num_pages(&self, total: usize) -> usize {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.page_size)
        }
    }

    /// Locate the requested page inside a sequence of `total` items.
    pub fn window(&self, total: usize, requested: PageNumber) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = match usize::try_from(requested.get()) {
            Ok(n) if (1..=num_pages).contains(&n) => n,
            _ => num_pages,
        };
        let offset = (number - 1) * self.page_size;
        let limit = self.page_size.min(total.saturating_sub(offset));

        PageWindow {
            number,
            num_pages,
            total,
            offset,
            limit,
        }
    }

    /// Paginate an in-memory sequence.
    pub fn paginate<T>(&self, items: Vec<T>, requested: PageNumber) -> Page<T> {
        let window = self.window(items.len(), requested);
        let slice = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        window.into_page(slice)
    }
}

/// The position of one page, computed before its items are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_next: self.number < self.num_pages,
            has_previous: self.number > 1,
        }
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next.then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous.then(|| self.number - 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
