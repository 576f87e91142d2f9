//! Paginated list types shared by the resource endpoints.

use serde::{Deserialize, Serialize};

use crate::request::ApiRequest;

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of a paginated listing.
///
/// The API answers with `page`/`total`/`pageCount`; older deployments use
/// `currentPage`/`totalElements`/`totalPages`. Both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct Page<T> {
    /// Entries on this page.
    #[serde(default)]
    pub content: Vec<T>,
    /// Zero-based page index.
    #[serde(default, alias = "currentPage")]
    pub page: u32,
    /// Requested page size.
    #[serde(default)]
    pub size: u32,
    /// Total number of entries across all pages.
    #[serde(default, alias = "totalElements")]
    pub total: u64,
    /// Number of pages.
    #[serde(default, rename = "pageCount", alias = "totalPages")]
    pub page_count: u32,
}

impl<T> Page<T> {
    /// Returns true if a page after this one exists.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page.saturating_add(1) < self.page_count
    }
}

/// Pagination and name filter for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Entries per page.
    pub size: u32,
    /// Optional name filter.
    pub nome: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            nome: None,
        }
    }
}

impl PageRequest {
    /// First page with the default size and no filter.
    #[must_use]
    pub fn first() -> Self {
        Self::default()
    }

    /// Sets the name filter.
    #[must_use]
    pub fn with_name(mut self, nome: impl Into<String>) -> Self {
        self.nome = Some(nome.into());
        self
    }

    /// Returns the request for the following page.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }

    /// Adds `page`, `size` and, when non-blank, `nome` to `request`.
    #[must_use]
    pub fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = request
            .with_query("page", self.page.to_string())
            .with_query("size", self.size.to_string());

        match self.nome.as_deref().map(str::trim) {
            Some(nome) if !nome.is_empty() => request.with_query("nome", nome),
            _ => request,
        }
    }
}
