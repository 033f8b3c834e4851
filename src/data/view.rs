use super::filter::{FilterSet, filtered_indices};
use super::model::Dataset;
use super::page::{PAGE_SIZE, clamp_page, page_slice, total_pages};
use super::sort::{SortSpec, sorted_indices};

/// The derived, read-only view over a dataset: filtered, sorted, paged.
///
/// Holds row indices only; the dataset itself is never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    rows: Vec<usize>,
    page: usize,
    total_pages: usize,
}

impl TableView {
    /// Run filter → sort → paginate. `page` is clamped into range.
    pub fn compute(
        dataset: &Dataset,
        filters: &FilterSet,
        sort: Option<&SortSpec>,
        page: usize,
    ) -> Self {
        let filtered = filtered_indices(dataset, filters);
        let rows = match sort {
            Some(spec) => sorted_indices(dataset, &filtered, spec),
            None => filtered,
        };
        TableView {
            page: clamp_page(page, rows.len(), PAGE_SIZE),
            total_pages: total_pages(rows.len(), PAGE_SIZE),
            rows,
        }
    }

    /// Every matching row index in display order.
    #[cfg(test)]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Row indices on the current page.
    pub fn page_rows(&self) -> &[usize] {
        page_slice(&self.rows, self.page, PAGE_SIZE)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
