use serde::{Deserialize, Serialize};

use crate::query::FindOptions;

/// Pagination parameters, e.g. deserialized from query params.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pageable {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
    /// Raw `order by` expression.
    #[serde(default)]
    pub sort: Option<String>,
}

fn default_page_size() -> u64 {
    20
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
            sort: None,
        }
    }
}

impl Pageable {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    /// Rows skipped before this page. Saturates instead of overflowing.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Find options selecting this page: `order by <sort> limit ? offset ?`.
    pub fn find_options(&self) -> FindOptions {
        let options = FindOptions::new().range(self.offset(), self.size);
        match &self.sort {
            Some(sort) => options.order_by(sort.as_str()),
            None => options,
        }
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let total_pages = if pageable.size == 0 {
            0
        } else {
            total_elements.div_ceil(pageable.size)
        };
        Self {
            content,
            page: pageable.page,
            size: pageable.size,
            total_elements,
            total_pages,
        }
    }
}
