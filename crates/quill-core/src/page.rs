//! Offset pagination.
//!
//! A [`PagePlan`] derives the two statements a page needs from one caller
//! query: a COUNT over the same rows and the original query with a row
//! window appended. Once the total is known, [`PageWindow::compute`] works
//! out the page-link window and navigation flags.
//!
//! Page numbers are 1-based. Values below 1 are not clamped: the OFFSET
//! and `numbering` use the literal arithmetic, only the display window
//! starts at 1.

use serde::Serialize;

use crate::builder::Statement;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::fields::Params;
use crate::rewrite::{count_query, trim_terminator};

/// Number of page links shown before and after the current page.
pub const WINDOW_SPAN: i64 = 9;

/// Page size used when the caller has no preference.
pub const DEFAULT_ITEMS_PER_PAGE: i64 = 10;

/// Name of the row-window offset parameter.
pub const OFFSET_PARAM: &str = "offset";

/// Name of the row-window size parameter.
pub const LIMIT_PARAM: &str = "limit";

/// Page metadata derived from the page number, page size and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Page size.
    pub items_per_page: i64,
    /// Requested page number.
    pub current_page: i64,
    /// Rows matched by the query.
    pub total_items: i64,
    /// Number of pages.
    pub total_pages: i64,
    /// First page number in the link window.
    pub start: i64,
    /// Last page number in the link window.
    pub page_displayed: i64,
    /// Whether a previous page is inside the window.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Zero-based ordinal of the first item on the page.
    pub numbering: i64,
}

impl PageWindow {
    /// Computes the window for `page` of `total_items` rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `items_per_page` is below 1 or
    /// the arithmetic overflows.
    pub fn compute(page: i64, items_per_page: i64, total_items: i64) -> Result<Self> {
        check_items_per_page(items_per_page)?;
        let mut total_pages = total_items / items_per_page;
        if total_items % items_per_page != 0 {
            total_pages += 1;
        }
        let start = page.saturating_sub(WINDOW_SPAN).max(1);
        let page_displayed = page.saturating_add(WINDOW_SPAN).min(total_pages);

        Ok(Self {
            items_per_page,
            current_page: page,
            total_items,
            total_pages,
            start,
            page_displayed,
            has_previous: page.saturating_sub(1) >= start,
            has_next: page.saturating_add(1) <= total_pages,
            numbering: offset(page, items_per_page)?,
        })
    }
}

fn check_items_per_page(items_per_page: i64) -> Result<()> {
    if items_per_page < 1 {
        return Err(Error::invalid(format!(
            "items per page must be at least 1, got {items_per_page}"
        )));
    }
    Ok(())
}

fn offset(page: i64, items_per_page: i64) -> Result<i64> {
    page.checked_sub(1)
        .and_then(|p| p.checked_mul(items_per_page))
        .ok_or_else(|| Error::invalid(format!("page {page} is out of range")))
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Page size.
    pub items_per_page: i64,
    /// Requested page number.
    pub current_page: i64,
    /// Rows matched by the query.
    pub total_items: i64,
    /// Number of pages.
    pub total_pages: i64,
    /// First page number in the link window.
    pub start: i64,
    /// Last page number in the link window.
    pub page_displayed: i64,
    /// Whether a previous page is inside the window.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Zero-based ordinal of the first item on the page.
    pub numbering: i64,
    /// Items on this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Assembles a page from its window and items.
    #[must_use]
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items_per_page: window.items_per_page,
            current_page: window.current_page,
            total_items: window.total_items,
            total_pages: window.total_pages,
            start: window.start,
            page_displayed: window.page_displayed,
            has_previous: window.has_previous,
            has_next: window.has_next,
            numbering: window.numbering,
            items,
        }
    }

    /// Converts the items, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items_per_page: self.items_per_page,
            current_page: self.current_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            start: self.start,
            page_displayed: self.page_displayed,
            has_previous: self.has_previous,
            has_next: self.has_next,
            numbering: self.numbering,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// The statements needed to read one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// COUNT over the caller's rows, bound to the caller's parameters.
    pub count: Statement,
    /// The caller's query with the dialect row window appended, bound to the
    /// caller's parameters plus `offset` and `limit`.
    pub window: Statement,
    /// Requested page number.
    pub page: i64,
    /// Page size.
    pub items_per_page: i64,
}

impl PagePlan {
    /// Plans `page` of `sql`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuery`] if `sql` cannot be counted and
    /// [`Error::InvalidArgument`] for a page size below 1 or caller
    /// parameters named `offset` or `limit`.
    pub fn new(
        dialect: &dyn Dialect,
        sql: &str,
        page: i64,
        params: &dyn Params,
        items_per_page: i64,
    ) -> Result<Self> {
        check_items_per_page(items_per_page)?;
        let sql = trim_terminator(sql);
        let caller = params.to_param_set();

        for reserved in [OFFSET_PARAM, LIMIT_PARAM] {
            if caller.iter().any(|(name, _)| name.eq_ignore_ascii_case(reserved)) {
                return Err(Error::invalid(format!(
                    "parameter '@{reserved}' is reserved for pagination"
                )));
            }
        }

        let count = Statement::new(count_query(sql, dialect)?, caller.clone());

        let mut window_params = caller;
        window_params.add(OFFSET_PARAM, offset(page, items_per_page)?)?;
        window_params.add(LIMIT_PARAM, items_per_page)?;
        let window = Statement::new(
            format!("{sql}\n{}", dialect.limit_offset_clause()),
            window_params,
        );

        Ok(Self {
            count,
            window,
            page,
            items_per_page,
        })
    }

    /// Assembles the page once the total and the items are known.
    ///
    /// # Errors
    ///
    /// See [`PageWindow::compute`].
    pub fn finish<T>(&self, total_items: i64, items: Vec<T>) -> Result<Page<T>> {
        let window = PageWindow::compute(self.page, self.items_per_page, total_items)?;
        Ok(Page::new(window, items))
    }
}
