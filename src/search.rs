//! Debounced search over the review feed plus client-side pagination.
//!
//! Raw input updates immediately; the settled term only commits after the
//! debounce delay passes with no further keystroke, and committing resets
//! the page to 1. Pagination slices the full result set for the settled term
//! and renders page numbers with the fixed ellipsis compression scheme the
//! feed UI relies on.

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

#[cfg(not(target_arch = "wasm32"))]
use tokio::time::sleep;

#[cfg(target_arch = "wasm32")]
use gloo_timers::future::sleep;

/// Feed view page size.
pub const PAGE_SIZE_FEED: usize = 8;
/// Featured-preview page size on the landing view.
pub const PAGE_SIZE_FEATURED: usize = 4;
/// Quiet period a keystroke must survive before the term settles.
pub const DEBOUNCE: Duration = Duration::from_millis(1000);

/// Above this many pages the page list is compressed with ellipses.
const MAX_VISIBLE_PAGES: usize = 5;

/// One slot in the rendered page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMark {
    Page(usize),
    Gap,
}

impl fmt::Display for PageMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMark::Page(page) => write!(f, "{page}"),
            PageMark::Gap => f.write_str("..."),
        }
    }
}

struct SearchState {
    raw: String,
    settled: String,
    page: usize,
    epoch: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            raw: String::new(),
            settled: String::new(),
            page: 1,
            epoch: 0,
        }
    }
}

/// Search and paging state for one review listing view.
pub struct SearchPaginator {
    page_size: usize,
    state: Mutex<SearchState>,
    page_hook: Option<Box<dyn Fn(usize)>>,
}

impl SearchPaginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            state: Mutex::new(SearchState::default()),
            page_hook: None,
        }
    }

    /// Registers the scroll-to-top (or any other) side effect fired when the
    /// page changes.
    pub fn on_page_change(mut self, hook: impl Fn(usize) + 'static) -> Self {
        self.page_hook = Some(Box::new(hook));
        self
    }

    /// Records a keystroke. The raw value is visible immediately; the
    /// settled term is untouched until a [`Self::settle`] call survives the
    /// debounce window.
    pub fn input_changed(&self, text: &str) {
        let mut state = self.state();
        state.raw = text.to_string();
        state.epoch += 1;
        debug!(raw = %state.raw, epoch = state.epoch, "search input changed");
    }

    /// Starts the debounce timer for the input as it stands right now.
    /// Resolves to the committed term, or `None` when another keystroke
    /// superseded this one. Call once per keystroke, like a restarted timer.
    pub fn settle(&self) -> impl Future<Output = Option<String>> + '_ {
        let (epoch, raw) = {
            let state = self.state();
            (state.epoch, state.raw.clone())
        };
        async move {
            sleep(DEBOUNCE).await;
            let mut state = self.state();
            if state.epoch != epoch {
                debug!(stale = %raw, "debounce superseded");
                return None;
            }
            state.settled = raw.clone();
            state.page = 1;
            debug!(term = %raw, "search term settled");
            Some(raw)
        }
    }

    pub fn raw(&self) -> String {
        self.state().raw.clone()
    }

    pub fn settled_term(&self) -> String {
        self.state().settled.clone()
    }

    pub fn page(&self) -> usize {
        self.state().page
    }

    /// Jumps to `page` and fires the page-change side effect.
    pub fn set_page(&self, page: usize) {
        {
            let mut state = self.state();
            state.page = page;
        }
        debug!(page, "page changed");
        if let Some(hook) = &self.page_hook {
            hook(page);
        }
    }

    pub fn total_pages(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.page_size)
    }

    /// The slice of `items` belonging to the current page. Pages past the
    /// end are empty rather than an error.
    pub fn page_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page().saturating_sub(1)) * self.page_size;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    /// Page list for the current page, ellipsis-compressed.
    pub fn page_marks(&self, total_pages: usize) -> Vec<PageMark> {
        page_numbers(self.page(), total_pages)
    }
}

/// Page-number display algorithm. With five or fewer pages everything is
/// shown; otherwise the window compresses around the current page:
/// `[1 2 3 4 … N]` near the start, `[1 … N-3 N-2 N-1 N]` near the end, and
/// `[1 … c-1 c c+1 … N]` in the middle.
pub fn page_numbers(current: usize, total: usize) -> Vec<PageMark> {
    let mut marks = Vec::new();
    if total <= MAX_VISIBLE_PAGES {
        for page in 1..=total {
            marks.push(PageMark::Page(page));
        }
    } else if current <= 3 {
        for page in 1..=4 {
            marks.push(PageMark::Page(page));
        }
        marks.push(PageMark::Gap);
        marks.push(PageMark::Page(total));
    } else if current >= total - 2 {
        marks.push(PageMark::Page(1));
        marks.push(PageMark::Gap);
        for page in (total - 3)..=total {
            marks.push(PageMark::Page(page));
        }
    } else {
        marks.push(PageMark::Page(1));
        marks.push(PageMark::Gap);
        for page in (current - 1)..=(current + 1) {
            marks.push(PageMark::Page(page));
        }
        marks.push(PageMark::Gap);
        marks.push(PageMark::Page(total));
    }
    marks
}

impl SearchPaginator {
    fn state(&self) -> MutexGuard<'_, SearchState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
