//! Offset pagination shared by every client.
//!
//! A [`Pager`] asks its fetch closure for one page at a time and stops on
//! the first of:
//! - an empty page,
//! - `limit == 0` (a single page at the server's default size),
//! - the advanced offset reaching the total reported by the latest page.
//!
//! The total is re-read from every page rather than snapshotted from the
//! first, so a shrinking or growing listing ends on whatever the server
//! last said. The throttle sleeps between pages only, never before the
//! first or after the last.

use std::thread;

use catalink_config::PageSettings;

use crate::error::ClientError;

/// One request's position in the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    /// `None` leaves the page size to the server.
    pub limit: Option<u32>,
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items kept after client-side filtering.
    pub items: Vec<T>,
    /// Raw number of results the server returned, before filtering.
    pub returned: usize,
    /// Server-reported size of the whole listing, if any.
    pub total: Option<u64>,
}

type FetchFn<'a, T> = Box<dyn FnMut(PageRequest) -> Result<Page<T>, ClientError> + 'a>;

/// Lazy, finite, non-restartable sequence of pages.
pub struct Pager<'a, T> {
    service: &'static str,
    settings: PageSettings,
    offset: u64,
    fetched: u32,
    done: bool,
    fetch: FetchFn<'a, T>,
}

impl<'a, T> Pager<'a, T> {
    pub fn new(
        service: &'static str,
        settings: PageSettings,
        fetch: impl FnMut(PageRequest) -> Result<Page<T>, ClientError> + 'a,
    ) -> Self {
        Self {
            service,
            settings,
            offset: 0,
            fetched: 0,
            done: false,
            fetch: Box::new(fetch),
        }
    }

    /// Drain every page into one flat list, stopping at the first error.
    pub fn collect_all(self) -> Result<Vec<T>, ClientError> {
        let mut all = Vec::new();
        for page in self {
            all.extend(page?);
        }
        Ok(all)
    }
}

impl<T> Iterator for Pager<'_, T> {
    type Item = Result<Vec<T>, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.fetched > 0 && !self.settings.throttle.is_zero() {
            thread::sleep(self.settings.throttle);
        }

        let limit = self.settings.limit;
        let request = PageRequest {
            offset: self.offset,
            limit: (limit > 0).then_some(limit),
        };

        let page = match (self.fetch)(request) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.fetched += 1;

        tracing::debug!(
            service = self.service,
            page = self.fetched,
            offset = self.offset,
            returned = page.returned,
            kept = page.items.len(),
            total = ?page.total,
            "page fetched"
        );

        if page.returned == 0 {
            self.done = true;
            return None;
        }

        if limit == 0 {
            self.done = true;
        } else {
            self.offset += u64::from(limit);
            if page.total.is_some_and(|total| self.offset >= total) {
                self.done = true;
            }
        }

        Some(Ok(page.items))
    }
}
