//! Page slicing with clamping.

use serde::Serialize;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    #[must_use]
    pub fn first(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }
}

/// One page of rows plus the numbers a pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// `ceil(count / page_size)`, never less than 1.
#[must_use]
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp `page` into `1..=total_pages`.
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice `items` for `request`, clamping an out-of-range page back into
/// range instead of returning an empty page.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let page_size = request.page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let current_page = clamp_page(request.page, total_pages);

    let start = (current_page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Page {
        rows: items[start..end].to_vec(),
        current_page,
        total_pages,
        total_items: items.len(),
    }
}
